use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::post,
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn init_test_env() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("JWT_SECRET", "test_secret_key");
    // no AI collaborator: every request must take the deterministic path
    env::set_var("OPENAI_API_KEY", "");
    env::set_var("PUBLIC_RPS", "100");
    env::set_var("ADMIN_RPS", "100");
    env::set_var("MAX_WRONG_QUESTIONS_IN_PROMPT", "10");
    let _ = placement_backend::config::init_config();
}

fn make_token(user_id: Uuid) -> String {
    let claims = json!({
        "sub": user_id.to_string(),
        "exp": (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp(),
        "role": "candidate",
    });
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"test_secret_key"),
    )
    .expect("encode token")
}

async fn call(app: &Router, token: &str, uri: &str, body: &JsonValue) -> (StatusCode, JsonValue) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null))
}

#[tokio::test]
async fn ai_endpoints_degrade_to_deterministic_fallback() {
    init_test_env();
    let pool = placement_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");

    let app = Router::new()
        .route(
            "/api/ai/summary",
            post(placement_backend::routes::feedback_routes::ai_summary),
        )
        .route(
            "/api/ai/report",
            post(placement_backend::routes::feedback_routes::ai_report),
        )
        .layer(axum::middleware::from_fn(
            placement_backend::middleware::auth::require_bearer_auth,
        ))
        .with_state(placement_backend::AppState::new(pool));

    let token = make_token(Uuid::new_v4());
    let payload = json!({
        "test_title": "TCS Foundation Mock",
        "score": 65,
        "total_questions": 20,
        "correct": 13,
        "wrong": 7,
        "category_breakdown": {
            "Quantitative Aptitude": { "correct": 6, "total": 10, "percentage": 60 }
        },
        "wrong_questions": [
            {
                "question": "Find the profit percentage if cost is 200 and sell is 250",
                "category": "Quantitative Aptitude",
                "your_answer": "20%",
                "correct_answer": "25%"
            },
            {
                "question": "What is the output of the following program with a loop over an array?",
                "category": "Programming/Coding",
                "your_answer": "Not answered",
                "correct_answer": "42"
            }
        ]
    });

    let (status, body) = call(&app, &token, "/api/ai/summary", &payload).await;
    assert_eq!(status, StatusCode::OK);
    let summary = body["summary"].as_str().expect("summary text");
    assert!(summary.contains("Overall Score: 65%"));
    assert!(summary.contains("Category Breakdown"));
    assert!(summary.contains("Most Focus Needed"));
    assert!(summary.contains("Recommended Study Time"));

    let (status, body) = call(&app, &token, "/api/ai/report", &payload).await;
    assert_eq!(status, StatusCode::OK);
    let report = body["report"].as_str().expect("report text");
    assert!(report.contains("Recommended Study Time"));

    // identical input, identical fallback output
    let (_, second) = call(&app, &token, "/api/ai/summary", &payload).await;
    assert_eq!(second["summary"], summary);

    // missing auth is rejected before any AI work
    let req = Request::builder()
        .method("POST")
        .uri("/api/ai/summary")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
