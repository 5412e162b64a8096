// Assistant actions: résumé analysis, skill improvement, job matching, cold email.
// Every request is self-contained: upload → extract → one assistant call → response.
// Nothing is stored between requests.

pub mod email;
pub mod handlers;
pub mod upload;

use std::fmt;

use serde::Serialize;

use crate::llm_client::prompts;

/// The action a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Analyze,
    Improve,
    Match,
    ColdEmail,
}

impl Action {
    /// Fixed instructions for the résumé actions. The cold email prompt is
    /// built per request in `email`.
    pub fn instructions(&self) -> Option<&'static str> {
        match self {
            Action::Analyze => Some(prompts::ANALYZE),
            Action::Improve => Some(prompts::IMPROVE),
            Action::Match => Some(prompts::MATCH),
            Action::ColdEmail => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Analyze => "analyze",
            Action::Improve => "improve",
            Action::Match => "match",
            Action::ColdEmail => "cold_email",
        };
        f.write_str(name)
    }
}
