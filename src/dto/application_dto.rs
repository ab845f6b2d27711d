use crate::models::application::Application;
use crate::models::question::AnswerMap;
use crate::models::stage_result::StageResult;
use crate::services::scoring_service::CategoryStat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 50))]
    pub company: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitStageRequest {
    /// Question id to chosen option text, for objective stages graded
    /// server-side.
    pub answers: Option<AnswerMap>,
    /// Raw score for stages judged outside this service (coding problems
    /// solved, client-side voice assessment).
    #[validate(range(min = 0))]
    pub score: Option<i32>,
    #[validate(range(min = 1))]
    pub total: Option<i32>,
    /// Essay body for the essay stage; graded server-side.
    #[validate(length(max = 20000))]
    pub essay_text: Option<String>,
    #[validate(range(min = 0))]
    pub time_spent_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSubmissionResponse {
    pub application_id: uuid::Uuid,
    pub stage: String,
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub is_passed: bool,
    pub next_stage: String,
    pub status: String,
    pub final_track: Option<String>,
    pub category_breakdown: Option<BTreeMap<String, CategoryStat>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationDetailResponse {
    pub application: Application,
    pub stages: Vec<StageResult>,
}
