use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Per-stage outcome. `submitted_at` is the immutability sentinel: NULL means
/// the stage has not been completed yet (a voice recording may be attached
/// before submission); once set the row is terminal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StageResult {
    pub id: Uuid,
    pub application_id: Uuid,
    pub stage_name: String,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub passed: bool,
    pub time_spent_seconds: Option<i32>,
    pub feedback: Option<JsonValue>,
    pub recording_link: Option<String>,
    pub recording_file_path: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}
