use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;
use url::Url;
use uuid::Uuid;
use validator::Validate;

use crate::dto::application_dto::{
    ApplicationDetailResponse, CreateApplicationRequest, StageSubmissionResponse,
    SubmitStageRequest,
};
use crate::error::Error;
use crate::middleware::auth::Claims;
use crate::services::application_service::GradedStage;
use crate::services::scoring_service::ScoringService;
use crate::services::test_service::TestService;
use crate::AppState;

#[axum::debug_handler]
pub async fn create_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateApplicationRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let user_id = state.user_service.ensure_user(&claims).await?;
    let application = state
        .application_service
        .create_application(user_id, &req.company)
        .await?;

    tracing::info!(application_id = %application.id, company = %application.company, "Application opened");

    let _ = state
        .audit_service
        .log(
            Some(user_id),
            "create_application",
            "application",
            application.id,
            Some(json!({ "company": application.company })),
        )
        .await;

    Ok((StatusCode::CREATED, Json(application)).into_response())
}

#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<Response> {
    let user_id = state.user_service.ensure_user(&claims).await?;
    let applications = state.application_service.list_for_user(user_id).await?;
    Ok(Json(applications).into_response())
}

#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
) -> crate::error::Result<Response> {
    let application = state
        .application_service
        .get_owned_application(application_id, &claims)
        .await?;
    let stages = state
        .application_service
        .stage_results(application.id)
        .await?;
    Ok(Json(ApplicationDetailResponse {
        application,
        stages,
    })
    .into_response())
}

#[utoipa::path(
    post,
    path = "/api/applications/{id}/stages/{stage}/submit",
    params(
        ("id" = Uuid, Path, description = "Application ID"),
        ("stage" = String, Path, description = "Stage name in the company pipeline")
    ),
    responses(
        (status = 200, description = "Stage graded; pipeline advanced, rejected or completed"),
        (status = 409, description = "Stage was already submitted"),
        (status = 422, description = "Unknown company or stage"),
    ),
)]
#[axum::debug_handler]
pub async fn submit_stage(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((application_id, stage)): Path<(Uuid, String)>,
    Json(req): Json<SubmitStageRequest>,
) -> crate::error::Result<Response> {
    req.validate()?;
    let user_id = state.user_service.ensure_user(&claims).await?;
    let application = state
        .application_service
        .get_owned_application(application_id, &claims)
        .await?;

    let mut breakdown = None;

    let graded = if let Some(answers) = &req.answers {
        let Some(test) = state
            .test_service
            .find_stage_test(&application.company, &stage)
            .await?
        else {
            return Err(Error::BadRequest(format!(
                "No question set is configured for the {} '{}' stage",
                application.company, stage
            )));
        };
        let questions = TestService::parse_questions(&test);
        let evaluation = ScoringService::evaluate(&questions, answers);
        let percentage =
            ScoringService::percentage(evaluation.total_correct, evaluation.total_questions);
        let feedback = json!({
            "category_breakdown": evaluation.category_breakdown,
            "wrong_questions": evaluation.wrong_questions,
        });
        breakdown = Some(evaluation.category_breakdown.clone());
        GradedStage {
            score: evaluation.total_correct as i32,
            total: evaluation.total_questions as i32,
            percentage: percentage as i32,
            time_spent_seconds: req.time_spent_seconds,
            feedback: Some(feedback),
        }
    } else if let Some(essay) = req
        .essay_text
        .as_deref()
        .filter(|e| !e.trim().is_empty() && stage == "essay")
    {
        let topic = state
            .test_service
            .find_stage_test(&application.company, &stage)
            .await?
            .map(|t| t.title)
            .unwrap_or_else(|| format!("{} placement essay", application.company));
        let (percentage, remarks) = state.essay_service.grade(&topic, essay).await;
        GradedStage {
            score: percentage as i32,
            total: 100,
            percentage: percentage as i32,
            time_spent_seconds: req.time_spent_seconds,
            feedback: Some(json!({ "remarks": remarks })),
        }
    } else if let (Some(score), Some(total)) = (req.score, req.total) {
        let percentage = ScoringService::percentage(score.max(0) as u32, total.max(0) as u32);
        GradedStage {
            score,
            total,
            percentage: percentage as i32,
            time_spent_seconds: req.time_spent_seconds,
            feedback: None,
        }
    } else {
        return Err(Error::BadRequest(
            "Submission must include answers, an essay, or a score with a total".to_string(),
        ));
    };

    let outcome = state
        .application_service
        .submit_stage(&application, &stage, graded)
        .await?;

    tracing::info!(
        application_id = %application.id,
        stage = %stage,
        passed = outcome.passed,
        next_stage = %outcome.next_stage,
        "Stage submitted"
    );

    let _ = state
        .audit_service
        .log(
            Some(user_id),
            "submit_stage",
            "application",
            application.id,
            Some(json!({
                "stage": stage,
                "score": outcome.result.score,
                "percentage": outcome.result.percentage,
                "passed": outcome.passed,
            })),
        )
        .await;

    let response = StageSubmissionResponse {
        application_id: application.id,
        stage: outcome.result.stage_name.clone(),
        score: outcome.result.score,
        total: outcome.result.total,
        percentage: outcome.result.percentage,
        is_passed: outcome.passed,
        next_stage: outcome.next_stage,
        status: outcome.status,
        final_track: outcome.final_track,
        category_breakdown: breakdown,
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn upload_voice_recording(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
    mut multipart: axum::extract::Multipart,
) -> crate::error::Result<Response> {
    let application = state
        .application_service
        .get_owned_application(application_id, &claims)
        .await?;

    let mut recording_link: Option<String> = None;
    let mut file_path: Option<String> = None;
    let allowed_extensions = ["mp3", "wav", "m4a", "ogg", "webm"];

    while let Some(field) = multipart.next_field().await.map_err(Error::Multipart)? {
        let name = field.name().unwrap_or("").to_string();
        if name == "recording_link" {
            let data = field.text().await.map_err(Error::Multipart)?;
            let trimmed = data.trim();
            if !trimmed.is_empty() {
                match Url::parse(trimmed) {
                    Ok(url) => {
                        if url.scheme() != "http" && url.scheme() != "https" {
                            return Ok((
                                StatusCode::BAD_REQUEST,
                                Json(json!({
                                    "error": "invalid_url_scheme",
                                    "message": "Only HTTP and HTTPS links are allowed"
                                })),
                            )
                                .into_response());
                        }
                        recording_link = Some(trimmed.to_string());
                    }
                    Err(_) => {
                        return Ok((
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": "invalid_url",
                                "message": "The provided link is not a valid URL"
                            })),
                        )
                            .into_response());
                    }
                }
            }
        } else if name == "file" {
            let filename = field.file_name().unwrap_or("recording").to_string();
            let data = field.bytes().await.map_err(Error::Multipart)?;

            if !data.is_empty() {
                let extension = std::path::Path::new(&filename)
                    .extension()
                    .and_then(|s| s.to_str())
                    .map(|s| s.to_lowercase())
                    .unwrap_or_default();

                if !allowed_extensions.contains(&extension.as_str()) {
                    return Ok((
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "invalid_file_type",
                            "message": format!(
                                "File type not allowed. Allowed: {}",
                                allowed_extensions.join(", ")
                            )
                        })),
                    )
                        .into_response());
                }

                let base = crate::config::get_config()
                    .uploads_dir
                    .clone()
                    .unwrap_or_else(|| "uploads".to_string());
                let upload_dir = format!("{}/recordings", base);
                tokio::fs::create_dir_all(&upload_dir)
                    .await
                    .map_err(Error::Io)?;
                let saved_filename = format!("{}.{}", Uuid::new_v4(), extension);
                let path = format!("{}/{}", upload_dir, saved_filename);
                tokio::fs::write(&path, data).await.map_err(Error::Io)?;
                file_path = Some(path);
            }
        }
    }

    if recording_link.is_none() && file_path.is_none() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_submission",
                "message": "Provide either a link or an audio file for the recording"
            })),
        )
            .into_response());
    }

    let stage = state
        .application_service
        .attach_voice_recording(&application, recording_link, file_path)
        .await?;

    Ok(Json(json!({
        "attached": true,
        "stage": stage.stage_name,
        "recording_link": stage.recording_link,
        "has_file": stage.recording_file_path.is_some(),
    }))
    .into_response())
}
