use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::dto::test_dto::{CreateTestPayload, UpdateTestPayload};
use crate::middleware::auth::Claims;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTestPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let user_id = state.user_service.ensure_user(&claims).await?;
    let test = state.test_service.create_test(payload, user_id).await?;

    let _ = state
        .audit_service
        .log(
            Some(user_id),
            "create_test",
            "practice_test",
            test.id,
            Some(json!({ "title": test.title })),
        )
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": test.id,
            "title": test.title,
            "company": test.company,
            "stage": test.stage,
            "created_at": test.created_at,
        })),
    )
        .into_response())
}

#[axum::debug_handler]
pub async fn update_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
    Json(payload): Json<UpdateTestPayload>,
) -> crate::error::Result<Response> {
    payload.validate()?;
    let user_id = state.user_service.ensure_user(&claims).await?;
    let test = state.test_service.update_test(test_id, payload).await?;

    let _ = state
        .audit_service
        .log(Some(user_id), "update_test", "practice_test", test.id, None)
        .await;

    Ok(Json(test).into_response())
}

#[axum::debug_handler]
pub async fn delete_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(test_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let user_id = state.user_service.ensure_user(&claims).await?;
    let deleted = state.test_service.delete_test(test_id).await?;
    if !deleted {
        return Err(crate::error::Error::NotFound("Test not found".to_string()));
    }

    let _ = state
        .audit_service
        .log(Some(user_id), "delete_test", "practice_test", test_id, None)
        .await;

    Ok(Json(json!({ "deleted": true })).into_response())
}

#[axum::debug_handler]
pub async fn list_applications(State(state): State<AppState>) -> crate::error::Result<Response> {
    let applications = state.application_service.list_all().await?;
    Ok(Json(applications).into_response())
}
