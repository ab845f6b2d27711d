use crate::services::scoring_service::{CategoryStat, WrongQuestion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AiSummaryPayload {
    #[validate(length(min = 1, max = 200))]
    pub test_title: String,
    /// Overall percentage, already rounded.
    #[validate(range(max = 100))]
    pub score: u32,
    pub total_questions: u32,
    pub correct: u32,
    pub wrong: u32,
    #[serde(default)]
    pub category_breakdown: BTreeMap<String, CategoryStat>,
    #[serde(default)]
    pub wrong_questions: Vec<WrongQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReportResponse {
    pub report: String,
}
