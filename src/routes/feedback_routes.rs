use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::feedback_dto::{AiReportResponse, AiSummaryPayload, AiSummaryResponse};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/ai/summary",
    responses((status = 200, description = "Coaching summary; deterministic fallback on AI failure"))
)]
#[axum::debug_handler]
pub async fn ai_summary(
    State(state): State<AppState>,
    Json(payload): Json<AiSummaryPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let summary = state.feedback_service.summary_json(&payload).await;
    Ok(Json(AiSummaryResponse { summary }).into_response())
}

#[axum::debug_handler]
pub async fn ai_report(
    State(state): State<AppState>,
    Json(payload): Json<AiSummaryPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let report = state.feedback_service.coaching_report(&payload).await;
    Ok(Json(AiReportResponse { report }).into_response())
}
