//! Match-result interpretation — turns free-form assistant output into a
//! score, a verdict, and a match/gap split for the pie chart.
//!
//! The model is asked for a `Match Percentage: XX%` line but is not guaranteed
//! to produce one. Lookup is two-stage:
//! 1. the labeled field, case-insensitive, first occurrence wins;
//! 2. the first bare number in [50, 100];
//! 3. otherwise 50.
//!
//! An unparseable response is not an error. It resolves to 50 and the report
//! records `source: fallback` so callers can tell.

pub mod chart;

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::llm_client::is_error_response;

/// Score used when nothing in the response qualifies.
pub const FALLBACK_PERCENTAGE: u32 = 50;

/// Inclusive range a bare, unlabeled number must fall in to count as the score.
const BARE_NUMBER_MIN: u32 = 50;
const BARE_NUMBER_MAX: u32 = 100;

fn labeled_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)Match\s*Percentage[:\s]*([0-9]+)%").expect("labeled percentage regex")
    })
}

fn bare_number_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[0-9]+\b").expect("bare number regex"))
}

/// Which lookup stage produced the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageSource {
    Labeled,
    BareNumber,
    Fallback,
}

/// Qualitative verdict. Buckets are upper-bound inclusive and cover [0, 100]
/// without gaps; anything above 100 stays Excellent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Excellent,
    Strong,
    Good,
    Weak,
    Poor,
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Excellent => "Excellent Match",
            Verdict::Strong => "Strong Match",
            Verdict::Good => "Good Match",
            Verdict::Weak => "Weak Match",
            Verdict::Poor => "Poor Match",
        }
    }

    pub fn badge(&self) -> &'static str {
        match self {
            Verdict::Excellent => "✅",
            Verdict::Strong => "👍",
            Verdict::Good => "⚡",
            Verdict::Weak => "⚠",
            Verdict::Poor => "❌",
        }
    }
}

/// Pie split. `match_share + gap_share == 100` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proportions {
    pub match_share: u32,
    pub gap_share: u32,
}

/// Interpreted result of one "match" request.
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport {
    pub raw_text: String,
    pub percentage: u32,
    pub source: PercentageSource,
    pub verdict: Verdict,
    pub proportions: Proportions,
}

impl MatchReport {
    pub fn from_response(raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();

        let (percentage, source) = if is_error_response(&raw_text) {
            (FALLBACK_PERCENTAGE, PercentageSource::Fallback)
        } else {
            extract_percentage(&raw_text)
        };

        MatchReport {
            percentage,
            source,
            verdict: classify(percentage),
            proportions: to_proportions(percentage),
            raw_text,
        }
    }
}

/// Extracts the match score from assistant output, along with which rule
/// produced it. Always returns a value.
pub fn extract_percentage(text: &str) -> (u32, PercentageSource) {
    if let Some(caps) = labeled_pattern().captures(text) {
        // Labeled values are clamped; a run too long for u32 saturates.
        let value = caps[1].parse::<u32>().unwrap_or(u32::MAX).min(100);
        return (value, PercentageSource::Labeled);
    }

    let bare = bare_number_pattern()
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .find(|n| (BARE_NUMBER_MIN..=BARE_NUMBER_MAX).contains(n));

    match bare {
        Some(value) => (value, PercentageSource::BareNumber),
        None => (FALLBACK_PERCENTAGE, PercentageSource::Fallback),
    }
}

pub fn classify(percentage: u32) -> Verdict {
    if percentage >= 80 {
        Verdict::Excellent
    } else if percentage >= 60 {
        Verdict::Strong
    } else if percentage >= 40 {
        Verdict::Good
    } else if percentage >= 20 {
        Verdict::Weak
    } else {
        Verdict::Poor
    }
}

/// Clamps to [0, 100] first so the gap share can never underflow.
pub fn to_proportions(percentage: u32) -> Proportions {
    let match_share = percentage.min(100);
    Proportions {
        match_share,
        gap_share: 100 - match_share,
    }
}
