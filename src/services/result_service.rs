use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::models::test_result::TestResult;
use crate::services::scoring_service::Evaluation;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends a practice result. Rows are never updated; retakes produce new
    /// rows for the same (user_id, test_id).
    pub async fn record_result(
        &self,
        user_id: Uuid,
        test_id: Uuid,
        evaluation: &Evaluation,
        time_spent_seconds: Option<i32>,
    ) -> Result<TestResult> {
        let percentage =
            crate::services::scoring_service::ScoringService::percentage(
                evaluation.total_correct,
                evaluation.total_questions,
            );

        let result = sqlx::query_as::<_, TestResult>(
            r#"
            INSERT INTO test_results (
                user_id, test_id, score, total_questions, percentage,
                category_breakdown, wrong_questions, time_spent_seconds
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(test_id)
        .bind(evaluation.total_correct as i32)
        .bind(evaluation.total_questions as i32)
        .bind(percentage as i32)
        .bind(serde_json::to_value(&evaluation.category_breakdown)?)
        .bind(serde_json::to_value(&evaluation.wrong_questions)?)
        .bind(time_spent_seconds)
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TestResult>> {
        let results = sqlx::query_as::<_, TestResult>(
            "SELECT * FROM test_results WHERE user_id = $1 ORDER BY submitted_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(results)
    }

    /// History access: the owner, or an administrator acting on their behalf.
    pub async fn list_for_owner(&self, owner_id: Uuid, claims: &Claims) -> Result<Vec<TestResult>> {
        let caller = Uuid::parse_str(&claims.sub)
            .map_err(|_| Error::Unauthorized("Token subject is not a valid user id".to_string()))?;
        let is_admin = claims
            .role
            .as_deref()
            .map(|r| r.eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        if caller != owner_id && !is_admin {
            return Err(Error::Forbidden(
                "Results belong to another candidate".to_string(),
            ));
        }
        self.list_for_user(owner_id).await
    }
}
