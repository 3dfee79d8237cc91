use anyhow::{Context, Result};
use serde::Deserialize;

use crate::records::Verdict;

pub const FALLBACK_SOURCE: &str = "Analysis pending verification";
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// The verdict fields recovered from a fact-checker reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub verdict: Verdict,
    pub explanation: String,
    pub sources: Vec<String>,
    pub confidence: f64,
}

impl Assessment {
    /// The record used whenever a reply cannot be read as a verdict object.
    pub fn fallback(reply: &str) -> Self {
        Self {
            verdict: Verdict::Unverifiable,
            explanation: reply.to_owned(),
            sources: vec![FALLBACK_SOURCE.to_owned()],
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

#[derive(Deserialize)]
struct RawAssessment {
    verdict: Option<String>,
    explanation: Option<String>,
    sources: Option<Vec<String>>,
    confidence: Option<f64>,
}

/// Reads the verdict object embedded in `reply`. Total: malformed replies
/// degrade to [`Assessment::fallback`] instead of failing.
pub fn parse(reply: &str) -> Assessment {
    match try_parse(reply) {
        Ok(assessment) => assessment,
        Err(error) => {
            tracing::warn!("Fact-check reply was not a verdict object, using fallback: {error:#}");
            Assessment::fallback(reply)
        }
    }
}

// Takes everything from the first `{` to the last `}`. Prose after the object
// that itself contains a `}` will break extraction.
fn try_parse(reply: &str) -> Result<Assessment> {
    let start = reply.find('{').context("No opening brace in reply")?;
    let end = reply.rfind('}').context("No closing brace in reply")?;
    anyhow::ensure!(start < end, "Closing brace precedes opening brace");

    let raw: RawAssessment = serde_json::from_str(&reply[start..=end])
        .context("Failed to parse verdict object")?;

    let verdict = match raw.verdict {
        Some(verdict) => verdict
            .trim()
            .parse::<Verdict>()
            .ok()
            .with_context(|| format!("Unrecognised verdict `{verdict}`"))?,
        None => Verdict::Unverifiable,
    };

    Ok(Assessment {
        verdict,
        explanation: raw.explanation.unwrap_or_default(),
        sources: raw.sources.unwrap_or_default(),
        confidence: raw.confidence.unwrap_or(DEFAULT_CONFIDENCE).clamp(0.0, 1.0),
    })
}
