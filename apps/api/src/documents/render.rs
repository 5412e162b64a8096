use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use pdfium_render::prelude::*;
use tracing::debug;

use super::{DocumentError, PageImage};

/// Roughly the width of a 72 DPI US-letter page at 1.25x, enough for an LLM to read.
const TARGET_WIDTH: i32 = 765;
const MAX_HEIGHT: i32 = 2000;

/// Binds to libpdfium, looking in the working directory first, then system paths.
fn create_pdfium() -> Result<Pdfium, DocumentError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| DocumentError::RendererUnavailable(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// Renders page one of the PDF and returns it PNG-encoded plus base64.
pub fn render_first_page(pdf: &[u8]) -> Result<PageImage, DocumentError> {
    let pdfium = create_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| DocumentError::Unreadable(format!("{e:?}")))?;

    let page = document
        .pages()
        .first()
        .map_err(|_| DocumentError::Unreadable("PDF has no pages".to_string()))?;

    let config = PdfRenderConfig::new()
        .set_target_width(TARGET_WIDTH)
        .set_maximum_height(MAX_HEIGHT);

    let rendered = page
        .render_with_config(&config)
        .map_err(|e| DocumentError::Unreadable(format!("render failed: {e:?}")))?
        .as_image();

    let mut png = Vec::new();
    rendered
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| DocumentError::Unreadable(format!("PNG encoding failed: {e}")))?;

    debug!(
        "Rendered page one at {}x{} ({} PNG bytes)",
        rendered.width(),
        rendered.height(),
        png.len()
    );

    Ok(PageImage {
        encoded: STANDARD.encode(&png),
        width: rendered.width(),
        height: rendered.height(),
    })
}
