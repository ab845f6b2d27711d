use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::application::{
    Application, STATUS_COMPLETED, STATUS_IN_PROGRESS, STATUS_REJECTED,
};
use crate::models::stage_result::StageResult;
use crate::services::stage_policy::StagePolicy;
use crate::services::track_service::TrackService;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// A stage submission already graded by the caller (server-side evaluation,
/// essay judge, or client-reported raw score).
#[derive(Debug, Clone)]
pub struct GradedStage {
    pub score: i32,
    pub total: i32,
    pub percentage: i32,
    pub time_spent_seconds: Option<i32>,
    pub feedback: Option<JsonValue>,
}

#[derive(Debug, Clone)]
pub struct StageOutcome {
    pub result: StageResult,
    pub passed: bool,
    pub next_stage: String,
    pub status: String,
    pub final_track: Option<String>,
}

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
}

impl ApplicationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_application(&self, user_id: Uuid, company: &str) -> Result<Application> {
        let Some(order) = StagePolicy::stage_order(company) else {
            return Err(Error::UnknownCompanyOrStage(format!(
                "No pipeline configured for company '{}'",
                company
            )));
        };

        let existing: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM applications
            WHERE user_id = $1 AND company = $2 AND status = $3
            "#,
        )
        .bind(user_id)
        .bind(company.to_lowercase())
        .bind(STATUS_IN_PROGRESS)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(Error::BadRequest(
                "An application for this company is already in progress".to_string(),
            ));
        }

        let application = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (user_id, company, status, current_stage)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(company.to_lowercase())
        .bind(STATUS_IN_PROGRESS)
        .bind(order[0])
        .fetch_one(&self.pool)
        .await?;

        Ok(application)
    }

    pub async fn get_application(&self, application_id: Uuid) -> Result<Application> {
        let application =
            sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
                .bind(application_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(application)
    }

    /// Fetch with the ownership rule: the applicant, or an administrator.
    pub async fn get_owned_application(
        &self,
        application_id: Uuid,
        claims: &Claims,
    ) -> Result<Application> {
        let application = self.get_application(application_id).await?;
        let caller = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("Token subject is not a valid user id".to_string()))?;
        let is_admin = claims
            .role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        if application.user_id != caller && !is_admin {
            return Err(Error::Forbidden(
                "Application belongs to another candidate".to_string(),
            ));
        }
        Ok(application)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Application>> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    pub async fn list_all(&self) -> Result<Vec<Application>> {
        let applications =
            sqlx::query_as::<_, Application>("SELECT * FROM applications ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(applications)
    }

    pub async fn stage_results(&self, application_id: Uuid) -> Result<Vec<StageResult>> {
        let results = sqlx::query_as::<_, StageResult>(
            r#"
            SELECT * FROM stage_results
            WHERE application_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    /// Applies the stage policy to a graded submission and persists the
    /// outcome. The insert is the idempotency gate: a stage that already has
    /// `submitted_at` set can never be written again, including by a
    /// concurrent request racing this one.
    pub async fn submit_stage(
        &self,
        application: &Application,
        stage: &str,
        graded: GradedStage,
    ) -> Result<StageOutcome> {
        if StagePolicy::stage_order(&application.company).is_none() {
            return Err(Error::UnknownCompanyOrStage(format!(
                "No pipeline configured for company '{}'",
                application.company
            )));
        }
        if !StagePolicy::is_known_stage(&application.company, stage) {
            return Err(Error::UnknownCompanyOrStage(format!(
                "Stage '{}' is not part of the {} pipeline",
                stage, application.company
            )));
        }
        if StagePolicy::is_last_stage(stage) {
            return Err(Error::BadRequest(format!(
                "Stage '{}' is not submitted through this operation",
                stage
            )));
        }

        // advisory; the insert below is the authoritative, race-safe gate
        let already_submitted = sqlx::query_scalar::<_, Option<chrono::DateTime<chrono::Utc>>>(
            r#"
            SELECT submitted_at FROM stage_results
            WHERE application_id = $1 AND stage_name = $2
            "#,
        )
        .bind(application.id)
        .bind(stage)
        .fetch_optional(&self.pool)
        .await?
        .flatten();
        if already_submitted.is_some() {
            return Err(Error::AlreadySubmitted(format!(
                "Stage '{}' has already been submitted",
                stage
            )));
        }

        if application.status != STATUS_IN_PROGRESS {
            return Err(Error::BadRequest(format!(
                "Application is {}; no further submissions are accepted",
                application.status
            )));
        }
        if stage != application.current_stage {
            return Err(Error::BadRequest(format!(
                "Expected a submission for stage '{}', got '{}'",
                application.current_stage, stage
            )));
        }

        let passed = StagePolicy::evaluate_pass(
            &application.company,
            stage,
            graded.percentage.max(0) as u32,
            graded.score.max(0) as u32,
        );
        let next_stage = StagePolicy::next_stage(&application.company, stage, passed);

        let inserted = sqlx::query_as::<_, StageResult>(
            r#"
            INSERT INTO stage_results (
                application_id, stage_name, score, total, percentage, passed,
                time_spent_seconds, feedback, submitted_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (application_id, stage_name) DO UPDATE
            SET score = EXCLUDED.score,
                total = EXCLUDED.total,
                percentage = EXCLUDED.percentage,
                passed = EXCLUDED.passed,
                time_spent_seconds = EXCLUDED.time_spent_seconds,
                feedback = EXCLUDED.feedback,
                submitted_at = EXCLUDED.submitted_at
            WHERE stage_results.submitted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(stage)
        .bind(graded.score)
        .bind(graded.total)
        .bind(graded.percentage)
        .bind(passed)
        .bind(graded.time_spent_seconds)
        .bind(&graded.feedback)
        .fetch_optional(&self.pool)
        .await?;

        let Some(result) = inserted else {
            return Err(Error::AlreadySubmitted(format!(
                "Stage '{}' has already been submitted",
                stage
            )));
        };

        let finalize = passed && StagePolicy::is_last_stage(&next_stage);
        let final_track = if finalize {
            let submitted: Vec<StageResult> = self
                .stage_results(application.id)
                .await?
                .into_iter()
                .filter(|r| r.submitted_at.is_some())
                .collect();
            Some(TrackService::assign_track(&application.company, &submitted).to_string())
        } else {
            None
        };

        let status = if !passed {
            STATUS_REJECTED
        } else if finalize {
            STATUS_COMPLETED
        } else {
            STATUS_IN_PROGRESS
        };

        sqlx::query(
            r#"
            UPDATE applications
            SET current_stage = $2,
                status = $3,
                final_track = COALESCE($4, final_track),
                final_decision = COALESCE($5, final_decision),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(application.id)
        .bind(if passed { next_stage.as_str() } else { stage })
        .bind(status)
        .bind(&final_track)
        .bind(finalize.then_some("selected"))
        .execute(&self.pool)
        .await?;

        Ok(StageOutcome {
            result,
            passed,
            next_stage,
            status: status.to_string(),
            final_track,
        })
    }

    /// Attaches a voice recording to the (not yet submitted) voice stage.
    pub async fn attach_voice_recording(
        &self,
        application: &Application,
        recording_link: Option<String>,
        recording_file_path: Option<String>,
    ) -> Result<StageResult> {
        if !StagePolicy::is_known_stage(&application.company, "voice") {
            return Err(Error::UnknownCompanyOrStage(format!(
                "The {} pipeline has no voice stage",
                application.company
            )));
        }

        let attached = sqlx::query_as::<_, StageResult>(
            r#"
            INSERT INTO stage_results (
                application_id, stage_name, score, total, percentage, passed,
                recording_link, recording_file_path
            )
            VALUES ($1, 'voice', 0, 0, 0, FALSE, $2, $3)
            ON CONFLICT (application_id, stage_name) DO UPDATE
            SET recording_link = EXCLUDED.recording_link,
                recording_file_path = EXCLUDED.recording_file_path
            WHERE stage_results.submitted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(&recording_link)
        .bind(&recording_file_path)
        .fetch_optional(&self.pool)
        .await?;

        attached.ok_or_else(|| {
            Error::AlreadySubmitted("The voice stage has already been submitted".to_string())
        })
    }
}
