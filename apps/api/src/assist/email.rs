//! Cold email generation — tone selection and prompt assembly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::COLD_EMAIL_TEMPLATE;

/// Filename offered for the downloadable email.
pub const COLD_EMAIL_FILENAME: &str = "cold_email.txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Formal,
    Casual,
}

impl FromStr for Tone {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "formal" => Ok(Tone::Formal),
            "casual" => Ok(Tone::Casual),
            other => Err(AppError::Validation(format!(
                "tone must be 'Formal' or 'Casual', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Formal => f.write_str("Formal"),
            Tone::Casual => f.write_str("Casual"),
        }
    }
}

/// Fills the cold email template. A blank LinkedIn URL becomes "Not Provided".
pub fn build_cold_email_prompt(
    resume_text: &str,
    job_description: &str,
    linkedin: Option<&str>,
    tone: Tone,
) -> String {
    let linkedin = linkedin
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("Not Provided");

    COLD_EMAIL_TEMPLATE
        .replace("{linkedin}", linkedin)
        .replace("{tone}", &tone.to_string())
        .replace("{resume}", resume_text)
        .replace("{job_description}", job_description)
}
