use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One candidate's pipeline at one company. `final_track` and
/// `final_decision` are written exactly once, when the pipeline completes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub status: String,
    pub current_stage: String,
    pub final_track: Option<String>,
    pub final_decision: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_COMPLETED: &str = "completed";
