use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PracticeTest {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub company: Option<String>,
    pub stage: Option<String>,
    pub questions: JsonValue,
    pub duration_minutes: i32,
    pub shuffle_questions: Option<bool>,
    pub shuffle_options: Option<bool>,
    pub created_by: Option<Uuid>,
    pub is_active: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
