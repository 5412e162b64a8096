use std::sync::Arc;

use crate::config::Config;
use crate::documents::DocumentExtractor;
use crate::llm_client::Assistant;

/// Shared application state injected into all route handlers via Axum extractors.
/// Read-only after startup; requests share nothing else.
#[derive(Clone)]
pub struct AppState {
    /// Remote model. Default: `LlmClient` (OpenRouter).
    pub assistant: Arc<dyn Assistant>,
    /// PDF backend. Default: `PdfExtractor`.
    pub documents: Arc<dyn DocumentExtractor>,
    pub config: Config,
}
