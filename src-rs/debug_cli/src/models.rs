use serde::Deserialize;
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub debug: bool,
    pub token: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CycleStats {
    pub cycle: i64,
    pub total_messages: i64,
    pub used_in_cycle: i64,
    pub remaining_in_cycle: i64,
}

#[derive(Debug, Deserialize)]
pub struct RandomResponse {
    pub success: bool,
    pub data: Message,
    pub timestamp: String,
    pub meta: Option<CycleStats>,
}

#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    pub data: CycleStats,
}

#[derive(Debug, Deserialize)]
pub struct ResetResponse {
    pub message: String,
    pub cycle: i64,
}

/// Drawn this session, with the cycle it was served in when known.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub message: Message,
    pub cycle: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

pub type Health = Value;
