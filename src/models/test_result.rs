use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only practice result keyed by (user_id, test_id). A user may hold
/// several rows for the same test; history queries order by submitted_at.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub test_id: Uuid,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: i32,
    pub category_breakdown: Option<JsonValue>,
    pub wrong_questions: Option<JsonValue>,
    pub time_spent_seconds: Option<i32>,
    pub submitted_at: Option<DateTime<Utc>>,
}
