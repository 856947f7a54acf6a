use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::enums::ParseStatus;

/// Append-only record of one document import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocumentRecord {
    pub id: Uuid,
    pub client_id: String,
    pub filename: String,
    pub file_size: Option<u64>,
    pub raw_text: String,
    pub structured_json: Value,
    pub parse_status: ParseStatus,
    pub ai_model_used: Option<String>,
    pub upload_date: DateTime<Utc>,
}
