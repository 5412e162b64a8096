use tracing::debug;

use super::DocumentError;

/// Extracts the plain text of every page, trimmed.
///
/// A PDF without a text layer yields an empty string, not an error.
pub fn extract_text(pdf: &[u8]) -> Result<String, DocumentError> {
    let raw = pdf_extract::extract_text_from_mem(pdf)
        .map_err(|e| DocumentError::Unreadable(e.to_string()))?;

    let text = normalize(&raw);
    debug!("Extracted {} chars of resume text", text.len());
    Ok(text)
}

/// Drops form feeds between pages and trailing whitespace on each line.
fn normalize(raw: &str) -> String {
    raw.replace('\u{c}', "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
