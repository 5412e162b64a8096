//! LLM Client — the single point of entry for all language-model calls.
//!
//! Talks to the OpenRouter chat-completions API (OpenAI-compatible schema).
//! Callers go through the `Assistant` trait, whose `send` never fails: any
//! transport, auth, quota or parse problem comes back as text prefixed with
//! `ERROR_MARKER`, rendered on the same path as a normal answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::documents::PageImage;

pub mod prompts;

const MAX_ATTEMPTS: u32 = 3;

/// Prefix of every in-band failure message returned by `Assistant::send`.
pub const ERROR_MARKER: &str = "⚠️ Error:";

pub fn is_error_response(text: &str) -> bool {
    text.trim_start().starts_with(ERROR_MARKER)
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("No response within {secs}s")]
    Timeout { secs: u64 },
}

/// How the résumé travels in the request.
#[derive(Debug, Clone, Copy)]
pub enum ResumeRepresentation<'a> {
    Text(&'a str),
    Image(&'a PageImage),
}

/// Seam between handlers and the remote model. `AppState` carries an
/// `Arc<dyn Assistant>`.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Always returns a string; failures are `ERROR_MARKER`-prefixed.
    async fn send(
        &self,
        instructions: &str,
        job_description: &str,
        resume: ResumeRepresentation<'_>,
    ) -> String;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// OpenRouter-backed assistant with bounded timeout and retry.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    url: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.assistant_timeout_secs);
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: config.openrouter_api_key.clone(),
            url: config.openrouter_url.clone(),
            model: config.model.clone(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Makes the raw call and returns the first choice's text.
    ///
    /// The configured timeout bounds the whole call, retries and backoff included.
    pub async fn call(
        &self,
        instructions: &str,
        job_description: &str,
        resume: ResumeRepresentation<'_>,
    ) -> Result<String, LlmError> {
        tokio::time::timeout(
            self.timeout,
            self.call_with_retries(instructions, job_description, resume),
        )
        .await
        .map_err(|_| LlmError::Timeout {
            secs: self.timeout.as_secs(),
        })?
    }

    /// Retries on 429, 5xx and connection errors with exponential backoff.
    /// A timed-out attempt is not retried.
    async fn call_with_retries(
        &self,
        instructions: &str,
        job_description: &str,
        resume: ResumeRepresentation<'_>,
    ) -> Result<String, LlmError> {
        let request_body = build_request(&self.model, instructions, job_description, resume);

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => return Err(LlmError::Http(e)),
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: provider_message(body),
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: provider_message(body),
                });
            }

            let chat: ChatResponse = response.json().await?;

            if let Some(usage) = &chat.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return first_choice_text(chat);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        }))
    }
}

#[async_trait]
impl Assistant for LlmClient {
    async fn send(
        &self,
        instructions: &str,
        job_description: &str,
        resume: ResumeRepresentation<'_>,
    ) -> String {
        match self.call(instructions, job_description, resume).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Assistant call failed: {e}");
                format!("{ERROR_MARKER} {e}")
            }
        }
    }
}

fn build_request<'a>(
    model: &'a str,
    instructions: &str,
    job_description: &str,
    resume: ResumeRepresentation<'_>,
) -> ChatRequest<'a> {
    let user_content = match resume {
        ResumeRepresentation::Text(text) => {
            MessageContent::Text(prompts::user_message(job_description, text, instructions))
        }
        ResumeRepresentation::Image(image) => MessageContent::Parts(vec![
            ContentPart::Text {
                text: prompts::user_message(
                    job_description,
                    prompts::RESUME_ATTACHED,
                    instructions,
                ),
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_url(),
                },
            },
        ]),
    };

    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(prompts::SYSTEM.to_string()),
            },
            ChatMessage {
                role: "user",
                content: user_content,
            },
        ],
    }
}

fn first_choice_text(chat: ChatResponse) -> Result<String, LlmError> {
    chat.choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LlmError::EmptyContent)
}

/// Pulls `error.message` out of a provider error body, or returns the body as-is.
fn provider_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
