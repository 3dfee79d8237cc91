use serde::{Deserialize, Serialize};

use crate::records::{Exchange, Verdict, VerdictRecord};

fn default_source_type() -> String {
    "general".to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub role: String,
    pub content: String,
    pub sources: Vec<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FactCheckRequest {
    pub claim: String,
    /// e.g. `tweet`, `statement`, `article`.
    #[serde(default = "default_source_type")]
    pub source_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResponse {
    pub claim: String,
    pub verdict: Verdict,
    pub explanation: String,
    pub sources: Vec<String>,
    pub confidence: f64,
    pub timestamp: String,
}

impl From<VerdictRecord> for FactCheckResponse {
    fn from(record: VerdictRecord) -> Self {
        Self {
            claim: record.claim,
            verdict: record.verdict,
            explanation: record.explanation,
            sources: record.sources,
            confidence: record.confidence,
            timestamp: record.timestamp,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostAnalysisRequest {
    pub post_content: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysisResponse {
    pub analysis: String,
    pub post_content: String,
    pub author: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderUpdatesResponse {
    pub updates: String,
    pub party_filter: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub calendar: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentFactChecksResponse {
    pub fact_checks: Vec<VerdictRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    pub history: Vec<Exchange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}
