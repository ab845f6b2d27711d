pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use crate::services::{
    application_service::ApplicationService, audit_service::AuditService,
    essay_service::EssayService, feedback_service::FeedbackService, result_service::ResultService,
    test_service::TestService, user_service::UserService,
};
use reqwest::Client;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub test_service: TestService,
    pub result_service: ResultService,
    pub application_service: ApplicationService,
    pub user_service: UserService,
    pub feedback_service: FeedbackService,
    pub essay_service: EssayService,
    pub audit_service: AuditService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .unwrap();

        let test_service = TestService::new(pool.clone());
        let result_service = ResultService::new(pool.clone());
        let application_service = ApplicationService::new(pool.clone());
        let user_service = UserService::new(pool.clone());
        let feedback_service = FeedbackService::new(
            config.openai_api_key.clone(),
            http_client.clone(),
            config.max_wrong_questions_in_prompt,
        );
        let essay_service = EssayService::new(config.openai_api_key.clone(), http_client);
        let audit_service = AuditService::new(pool.clone());

        Self {
            pool,
            test_service,
            result_service,
            application_service,
            user_service,
            feedback_service,
            essay_service,
            audit_service,
        }
    }
}
