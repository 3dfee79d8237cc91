use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Classification assigned to a fact-checked claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Verdict {
    True,
    False,
    Misleading,
    Unverifiable,
}

/// One user/assistant message pair of a chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub session_id: String,
    pub user_message: String,
    pub assistant_response: String,
    pub sources: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerdictRecord {
    pub claim: String,
    pub source_type: String,
    pub verdict: Verdict,
    pub explanation: String,
    pub sources: Vec<String>,
    pub confidence: f64,
    pub timestamp: String,
}

/// Current UTC time as RFC 3339 with a fixed microsecond precision, so that
/// lexical order of stored timestamps matches chronological order.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
