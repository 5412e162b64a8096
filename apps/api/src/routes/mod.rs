pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assist::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Resume analyzer
        .route("/api/v1/resume/analyze", post(handlers::handle_analyze))
        .route("/api/v1/resume/improve", post(handlers::handle_improve))
        .route("/api/v1/resume/match", post(handlers::handle_match))
        // Cold email generator
        .route("/api/v1/cold-email", post(handlers::handle_cold_email))
        .route(
            "/api/v1/cold-email/download",
            post(handlers::handle_email_download),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use bytes::Bytes;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, ResumeMode};
    use crate::documents::{DocumentError, DocumentExtractor, PageImage};
    use crate::llm_client::{prompts, Assistant, ResumeRepresentation, ERROR_MARKER};

    const BOUNDARY: &str = "assist-test-boundary";

    /// Replies with a canned string and records what it was asked.
    struct StubAssistant {
        reply: String,
        calls: Mutex<Vec<(String, bool)>>,
    }

    impl StubAssistant {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, bool)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Assistant for StubAssistant {
        async fn send(
            &self,
            instructions: &str,
            _job_description: &str,
            resume: ResumeRepresentation<'_>,
        ) -> String {
            let as_image = matches!(resume, ResumeRepresentation::Image(_));
            self.calls
                .lock()
                .unwrap()
                .push((instructions.to_string(), as_image));
            self.reply.clone()
        }
    }

    struct StubDocuments {
        can_render: bool,
    }

    #[async_trait]
    impl DocumentExtractor for StubDocuments {
        async fn extract_text(&self, _pdf: Bytes) -> Result<String, DocumentError> {
            Ok("Jane Doe\nSenior Rust Engineer".to_string())
        }

        async fn render_first_page(&self, _pdf: Bytes) -> Result<PageImage, DocumentError> {
            if self.can_render {
                Ok(PageImage {
                    encoded: "UE5H".to_string(),
                    width: 612,
                    height: 792,
                })
            } else {
                Err(DocumentError::RendererUnavailable("no libpdfium".to_string()))
            }
        }
    }

    fn test_config(resume_mode: ResumeMode) -> Config {
        Config {
            openrouter_api_key: "test-key".to_string(),
            openrouter_url: "http://localhost/unused".to_string(),
            model: "test/model".to_string(),
            assistant_timeout_secs: 5,
            resume_mode,
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app(assistant: Arc<StubAssistant>, can_render: bool, mode: ResumeMode) -> Router {
        build_router(AppState {
            assistant,
            documents: Arc::new(StubDocuments { can_render }),
            config: test_config(mode),
        })
    }

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    body.extend_from_slice(value.as_bytes());
                }
                Part::File(name, file_name, bytes) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: application/pdf\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(bytes);
                }
            }
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    const PDF: &[u8] = b"%PDF-1.4 stub";

    #[tokio::test]
    async fn test_health() {
        let response = app(StubAssistant::replying(""), true, ResumeMode::Text)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_match_without_resume_is_rejected() {
        let assistant = StubAssistant::replying("Match Percentage: 90%");
        let response = app(assistant.clone(), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/resume/match",
                &[Part::Text("job_description", "Rust engineer")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "NO_DOCUMENT");
        assert!(assistant.calls().is_empty(), "no partial processing");
    }

    #[tokio::test]
    async fn test_match_returns_interpreted_report() {
        let assistant = StubAssistant::replying(
            "Match Percentage: 82%\nMissing Keywords: Kafka\nFinal Thoughts: solid",
        );
        let response = app(assistant.clone(), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/resume/match",
                &[
                    Part::Text("job_description", "Rust engineer"),
                    Part::File("resume", "cv.pdf", PDF),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["report"]["percentage"], 82);
        assert_eq!(body["report"]["verdict"], "excellent");
        assert_eq!(body["report"]["source"], "labeled");
        assert_eq!(body["report"]["proportions"]["match_share"], 82);
        assert_eq!(body["report"]["proportions"]["gap_share"], 18);
        assert_eq!(body["verdict_label"], "Excellent Match ✅");
        assert!(body["chart_svg"].as_str().unwrap().contains("<svg"));
        assert_eq!(body["resume_page_png"], "UE5H");

        let calls = assistant.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, prompts::MATCH);
        assert!(!calls[0].1, "text mode sends extracted text");
    }

    #[tokio::test]
    async fn test_match_survives_missing_renderer() {
        let response = app(
            StubAssistant::replying("Match Percentage: 35%"),
            false,
            ResumeMode::Text,
        )
        .oneshot(multipart_request(
            "/api/v1/resume/match",
            &[Part::File("resume", "cv.pdf", PDF)],
        ))
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["report"]["verdict"], "weak");
        assert!(body["resume_page_png"].is_null());
    }

    #[tokio::test]
    async fn test_match_with_assistant_failure_degrades_to_fifty() {
        let reply = format!("{ERROR_MARKER} API error (status 402): Insufficient credits");
        let response = app(StubAssistant::replying(&reply), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/resume/match",
                &[Part::File("resume", "cv.pdf", PDF)],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["report"]["percentage"], 50);
        assert_eq!(body["report"]["source"], "fallback");
        assert_eq!(body["report"]["verdict"], "good");
        assert_eq!(body["report"]["raw_text"], reply);
    }

    #[tokio::test]
    async fn test_image_mode_sends_rendered_page() {
        let assistant = StubAssistant::replying("Match Percentage: 70%");
        let response = app(assistant.clone(), true, ResumeMode::Image)
            .oneshot(multipart_request(
                "/api/v1/resume/analyze",
                &[Part::File("resume", "cv.pdf", PDF)],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(assistant.calls()[0].1, "image mode sends the page image");
    }

    #[tokio::test]
    async fn test_image_mode_without_renderer_fails() {
        let response = app(StubAssistant::replying("ok"), false, ResumeMode::Image)
            .oneshot(multipart_request(
                "/api/v1/resume/analyze",
                &[Part::File("resume", "cv.pdf", PDF)],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_analyze_returns_feedback_verbatim() {
        let assistant = StubAssistant::replying("Lead with your Rust projects.");
        let response = app(assistant.clone(), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/resume/analyze",
                &[
                    Part::File("resume", "cv.pdf", PDF),
                    Part::Text("job_description", "Systems engineer"),
                    Part::Text("unrelated", "ignored"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["action"], "analyze");
        assert_eq!(body["feedback"], "Lead with your Rust projects.");
        assert_eq!(assistant.calls()[0].0, prompts::ANALYZE);
    }

    #[tokio::test]
    async fn test_improve_uses_improve_prompt() {
        let assistant = StubAssistant::replying("Get a Kubernetes certification.");
        let response = app(assistant.clone(), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/resume/improve",
                &[Part::File("resume", "cv.pdf", PDF)],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["action"], "improve");
        assert_eq!(assistant.calls()[0].0, prompts::IMPROVE);
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected() {
        let response = app(StubAssistant::replying("ok"), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/resume/analyze",
                &[Part::File("resume", "cv.docx", b"PK\x03\x04")],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_cold_email_requires_job_description() {
        let assistant = StubAssistant::replying("Dear hiring manager");
        let response = app(assistant.clone(), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/cold-email",
                &[
                    Part::File("resume", "cv.pdf", PDF),
                    Part::Text("job_description", "   "),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(assistant.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cold_email_builds_prompt_with_tone_and_linkedin() {
        let assistant = StubAssistant::replying("Hi Acme team, ...");
        let response = app(assistant.clone(), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/cold-email",
                &[
                    Part::File("resume", "cv.pdf", PDF),
                    Part::Text("job_description", "Backend engineer at Acme"),
                    Part::Text("linkedin", "https://linkedin.com/in/janedoe"),
                    Part::Text("tone", "Casual"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["action"], "cold_email");
        assert_eq!(body["email"], "Hi Acme team, ...");
        assert_eq!(body["tone"], "Casual");
        assert_eq!(body["filename"], "cold_email.txt");

        let prompt = &assistant.calls()[0].0;
        assert!(prompt.contains("Tone: Casual"));
        assert!(prompt.contains("LinkedIn: https://linkedin.com/in/janedoe"));
        assert!(prompt.contains("Jane Doe\nSenior Rust Engineer"));
    }

    #[tokio::test]
    async fn test_cold_email_rejects_unknown_tone() {
        let response = app(StubAssistant::replying("x"), true, ResumeMode::Text)
            .oneshot(multipart_request(
                "/api/v1/cold-email",
                &[
                    Part::File("resume", "cv.pdf", PDF),
                    Part::Text("job_description", "Backend engineer"),
                    Part::Text("tone", "Sarcastic"),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_email_download_is_text_attachment() {
        let request = Request::post("/api/v1/cold-email/download")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email": "Dear hiring manager,\nThanks!"}"#))
            .unwrap();
        let response = app(StubAssistant::replying(""), true, ResumeMode::Text)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cold_email.txt\""
        );
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"Dear hiring manager,\nThanks!");
    }

    #[tokio::test]
    async fn test_email_download_rejects_blank_email() {
        let request = Request::post("/api/v1/cold-email/download")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email": "  "}"#))
            .unwrap();
        let response = app(StubAssistant::replying(""), true, ResumeMode::Text)
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
