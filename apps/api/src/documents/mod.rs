//! Résumé document handling — text extraction and first-page rendering.
//!
//! Both operations are CPU-bound library calls and run on the blocking pool.
//! `AppState` holds an `Arc<dyn DocumentExtractor>`; the default backend is
//! `PdfExtractor` (pdf-extract for text, PDFium for rendering).

pub mod render;
pub mod text;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("No document uploaded")]
    NoDocument,

    #[error("Could not read PDF: {0}")]
    Unreadable(String),

    #[error("PDF renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("Document task failed: {0}")]
    Task(String),
}

/// First page of a résumé rendered to PNG.
#[derive(Debug, Clone, Serialize)]
pub struct PageImage {
    /// Standard base64 of the PNG bytes.
    pub encoded: String,
    pub width: u32,
    pub height: u32,
}

impl PageImage {
    pub fn data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.encoded)
    }
}

/// Everything derived from one uploaded résumé. Built once per request.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub text: String,
    /// Only rendered when the action needs it.
    pub page_one: Option<PageImage>,
}

/// Backend seam for PDF text extraction and rendering.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, DocumentError>;

    async fn render_first_page(&self, pdf: Bytes) -> Result<PageImage, DocumentError>;
}

/// Default extractor backed by `pdf-extract` and `pdfium-render`.
pub struct PdfExtractor;

#[async_trait]
impl DocumentExtractor for PdfExtractor {
    async fn extract_text(&self, pdf: Bytes) -> Result<String, DocumentError> {
        ensure_present(&pdf)?;
        tokio::task::spawn_blocking(move || text::extract_text(&pdf))
            .await
            .map_err(|e| DocumentError::Task(e.to_string()))?
    }

    async fn render_first_page(&self, pdf: Bytes) -> Result<PageImage, DocumentError> {
        ensure_present(&pdf)?;
        tokio::task::spawn_blocking(move || render::render_first_page(&pdf))
            .await
            .map_err(|e| DocumentError::Task(e.to_string()))?
    }
}

fn ensure_present(pdf: &[u8]) -> Result<(), DocumentError> {
    if pdf.is_empty() {
        return Err(DocumentError::NoDocument);
    }
    Ok(())
}
