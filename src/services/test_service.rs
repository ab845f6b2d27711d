use crate::dto::test_dto::{
    CreateQuestion, CreateTestPayload, GetTestResponse, PublicQuestion, TestSummary,
    UpdateTestPayload,
};
use crate::error::Result;
use crate::models::practice_test::PracticeTest;
use crate::models::question::Question;
use crate::services::categorizer;
use rand::seq::SliceRandom;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct TestService {
    pool: PgPool,
}

impl TestService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_test(
        &self,
        payload: CreateTestPayload,
        created_by: Uuid,
    ) -> Result<PracticeTest> {
        let questions_json = match &payload.questions {
            Some(qs) => serde_json::to_value(assign_question_ids(qs))?,
            None => serde_json::json!([]),
        };

        let test = sqlx::query_as::<_, PracticeTest>(
            r#"
            INSERT INTO practice_tests (
                title, description, company, stage, questions,
                duration_minutes, shuffle_questions, shuffle_options, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(payload.company.as_deref().map(|c| c.to_lowercase()))
        .bind(payload.stage.as_deref().map(|s| s.to_lowercase()))
        .bind(questions_json)
        .bind(payload.duration_minutes)
        .bind(payload.shuffle_questions.unwrap_or(false))
        .bind(payload.shuffle_options.unwrap_or(false))
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(test)
    }

    pub async fn update_test(&self, test_id: Uuid, payload: UpdateTestPayload) -> Result<PracticeTest> {
        let questions_json = match &payload.questions {
            Some(qs) => Some(serde_json::to_value(assign_question_ids(qs))?),
            None => None,
        };

        let test = sqlx::query_as::<_, PracticeTest>(
            r#"
            UPDATE practice_tests
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                questions = COALESCE($4, questions),
                duration_minutes = COALESCE($5, duration_minutes),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(test_id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(questions_json)
        .bind(payload.duration_minutes)
        .bind(payload.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(test)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM practice_tests WHERE id = $1")
            .bind(test_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_test_by_id(&self, test_id: Uuid) -> Result<PracticeTest> {
        let test = sqlx::query_as::<_, PracticeTest>("SELECT * FROM practice_tests WHERE id = $1")
            .bind(test_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(test)
    }

    pub async fn list_active_tests(&self) -> Result<Vec<PracticeTest>> {
        let tests = sqlx::query_as::<_, PracticeTest>(
            "SELECT * FROM practice_tests WHERE is_active = TRUE ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    /// Question set backing an objective pipeline stage, if one is configured.
    pub async fn find_stage_test(&self, company: &str, stage: &str) -> Result<Option<PracticeTest>> {
        let test = sqlx::query_as::<_, PracticeTest>(
            r#"
            SELECT * FROM practice_tests
            WHERE company = $1 AND stage = $2 AND is_active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(company.to_lowercase())
        .bind(stage)
        .fetch_optional(&self.pool)
        .await?;
        Ok(test)
    }

    pub fn parse_questions(test: &PracticeTest) -> Vec<Question> {
        serde_json::from_value(test.questions.clone()).unwrap_or_default()
    }

    /// Candidate-facing view: correct flags stripped, order shuffled when the
    /// test asks for it.
    pub fn public_view(test: &PracticeTest) -> GetTestResponse {
        let mut questions = Self::parse_questions(test);
        let mut rng = rand::thread_rng();

        if test.shuffle_questions.unwrap_or(false) {
            questions.shuffle(&mut rng);
        }

        let public_questions = questions
            .iter()
            .map(|q| {
                let mut options: Vec<String> = q.options.iter().map(|o| o.text.clone()).collect();
                if test.shuffle_options.unwrap_or(false) {
                    options.shuffle(&mut rng);
                }
                PublicQuestion {
                    id: q.id,
                    question: q.question.clone(),
                    category: q.category.clone(),
                    options,
                }
            })
            .collect::<Vec<_>>();

        GetTestResponse {
            test: TestSummary {
                id: test.id,
                title: test.title.clone(),
                description: test.description.clone(),
                company: test.company.clone(),
                stage: test.stage.clone(),
                duration_minutes: test.duration_minutes,
                total_questions: public_questions.len(),
            },
            questions: public_questions,
        }
    }
}

/// Sequential ids plus category inference for questions created without one.
fn assign_question_ids(questions: &[CreateQuestion]) -> Vec<Question> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, q)| Question {
            id: (idx as i32) + 1,
            question: q.question.clone(),
            category: q
                .category
                .clone()
                .filter(|c| !c.trim().is_empty())
                .or_else(|| Some(categorizer::categorize(Some(&q.question)).to_string())),
            options: q.options.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionOption;

    #[test]
    fn question_ids_are_sequential_and_categories_inferred() {
        let created = vec![
            CreateQuestion {
                question: "Find the profit percentage if cost is 200 and sell is 250".to_string(),
                category: None,
                options: vec![QuestionOption {
                    text: "25%".to_string(),
                    is_correct: true,
                }],
            },
            CreateQuestion {
                question: "Choose the synonym of 'rapid'".to_string(),
                category: Some("Verbal & Reading".to_string()),
                options: vec![],
            },
        ];

        let questions = assign_question_ids(&created);
        assert_eq!(questions[0].id, 1);
        assert_eq!(questions[1].id, 2);
        assert_eq!(
            questions[0].category.as_deref(),
            Some("Quantitative Aptitude")
        );
        assert_eq!(questions[1].category.as_deref(), Some("Verbal & Reading"));
    }

    #[test]
    fn public_view_never_leaks_correct_flags() {
        let test = PracticeTest {
            id: Uuid::nil(),
            title: "Mock".to_string(),
            description: None,
            company: None,
            stage: None,
            questions: serde_json::json!([
                {
                    "id": 1,
                    "question": "2 + 2?",
                    "category": "Quantitative Aptitude",
                    "options": [
                        {"text": "3", "is_correct": false},
                        {"text": "4", "is_correct": true}
                    ]
                }
            ]),
            duration_minutes: 10,
            shuffle_questions: Some(false),
            shuffle_options: Some(false),
            created_by: None,
            is_active: Some(true),
            created_at: None,
            updated_at: None,
        };

        let view = TestService::public_view(&test);
        let rendered = serde_json::to_string(&view).unwrap();
        assert!(!rendered.contains("is_correct"));
        assert_eq!(view.questions[0].options, vec!["3", "4"]);
        assert_eq!(view.test.total_questions, 1);
    }
}
