use crate::models::question::{AnswerMap, QuestionOption};
use crate::services::scoring_service::{CategoryStat, WrongQuestion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestion {
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    pub options: Vec<QuestionOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(max = 50))]
    pub company: Option<String>,
    #[validate(length(max = 50))]
    pub stage: Option<String>,
    pub questions: Option<Vec<CreateQuestion>>,
    #[validate(range(min = 1, max = 300))]
    pub duration_minutes: i32,
    pub shuffle_questions: Option<bool>,
    pub shuffle_options: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateTestPayload {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<CreateQuestion>>,
    #[validate(range(min = 1, max = 300))]
    pub duration_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

/// Candidate-facing question: option texts only, correct flags stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: i32,
    pub question: String,
    pub category: Option<String>,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub company: Option<String>,
    pub stage: Option<String>,
    pub duration_minutes: i32,
    pub total_questions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTestResponse {
    pub test: TestSummary,
    pub questions: Vec<PublicQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitTestRequest {
    pub answers: AnswerMap,
    #[validate(range(min = 0))]
    pub time_spent_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTestResponse {
    pub result_id: Uuid,
    pub test_id: Uuid,
    pub score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub category_breakdown: BTreeMap<String, CategoryStat>,
    pub wrong_questions: Vec<WrongQuestion>,
}
