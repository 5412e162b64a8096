use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// How the résumé is handed to the assistant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResumeMode {
    /// Extracted plain text of every page.
    #[default]
    Text,
    /// Base64 PNG of the first page, sent as an image part.
    Image,
}

impl FromStr for ResumeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(ResumeMode::Text),
            "image" => Ok(ResumeMode::Image),
            other => Err(anyhow!("RESUME_MODE must be 'text' or 'image', got '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if `OPENROUTER_API_KEY` is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: String,
    pub openrouter_url: String,
    pub model: String,
    pub assistant_timeout_secs: u64,
    pub resume_mode: ResumeMode,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a fixed map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            openrouter_api_key: require("OPENROUTER_API_KEY")?,
            openrouter_url: or_default("OPENROUTER_URL", DEFAULT_OPENROUTER_URL),
            model: or_default("OPENROUTER_MODEL", DEFAULT_MODEL),
            assistant_timeout_secs: or_default("ASSISTANT_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("ASSISTANT_TIMEOUT_SECS must be a whole number of seconds")?,
            resume_mode: or_default("RESUME_MODE", "text").parse()?,
            max_upload_bytes: or_default("MAX_UPLOAD_BYTES", "10485760")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}
