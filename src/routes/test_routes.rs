use axum::{
    extract::{Path, State},
    response::{IntoResponse, Json, Response},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::test_dto::{SubmitTestRequest, SubmitTestResponse, TestSummary};
use crate::middleware::auth::Claims;
use crate::services::scoring_service::ScoringService;
use crate::services::test_service::TestService;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_tests(State(state): State<AppState>) -> crate::error::Result<Response> {
    let tests = state.test_service.list_active_tests().await?;
    let summaries: Vec<TestSummary> = tests
        .iter()
        .map(|t| TestService::public_view(t).test)
        .collect();
    Ok(Json(summaries).into_response())
}

#[axum::debug_handler]
pub async fn get_test(
    State(state): State<AppState>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let test = state.test_service.get_test_by_id(test_id).await?;
    if !test.is_active.unwrap_or(true) {
        return Err(crate::error::Error::NotFound(
            "Test is no longer available".to_string(),
        ));
    }
    Ok(Json(TestService::public_view(&test)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/tests/{id}/submit",
    params(
        ("id" = Uuid, Path, description = "Practice test ID")
    ),
    responses(
        (status = 200, description = "Practice test graded and recorded"),
        (status = 404, description = "Test not found or inactive"),
    ),
)]
#[axum::debug_handler]
pub async fn submit_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
    Json(req): Json<SubmitTestRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let user_id = state.user_service.ensure_user(&claims).await?;

    let test = state.test_service.get_test_by_id(test_id).await?;
    if !test.is_active.unwrap_or(true) {
        return Err(crate::error::Error::NotFound(
            "Test is no longer available".to_string(),
        ));
    }

    let questions = TestService::parse_questions(&test);
    let evaluation = ScoringService::evaluate(&questions, &req.answers);
    let result = state
        .result_service
        .record_result(user_id, test.id, &evaluation, req.time_spent_seconds)
        .await?;

    tracing::info!(
        user_id = %user_id,
        test_id = %test.id,
        score = evaluation.total_correct,
        total = evaluation.total_questions,
        "Practice test submitted"
    );

    let _ = state
        .audit_service
        .log(
            Some(user_id),
            "submit_practice_test",
            "test_result",
            result.id,
            Some(serde_json::json!({
                "score": evaluation.total_correct,
                "total": evaluation.total_questions,
                "percentage": result.percentage,
            })),
        )
        .await;

    let response = SubmitTestResponse {
        result_id: result.id,
        test_id: test.id,
        score: evaluation.total_correct,
        total_questions: evaluation.total_questions,
        percentage: result.percentage.max(0) as u32,
        category_breakdown: evaluation.category_breakdown,
        wrong_questions: evaluation.wrong_questions,
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn my_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<Response> {
    let user_id = state.user_service.ensure_user(&claims).await?;
    let results = state.result_service.list_for_owner(user_id, &claims).await?;
    Ok(Json(results).into_response())
}
