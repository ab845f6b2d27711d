use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use placement_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{auth, cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let public_api = Router::new()
        .route("/api/tests", get(routes::test_routes::list_tests))
        .route("/api/tests/:id", get(routes::test_routes::get_test))
        .route(
            "/api/tests/:id/submit",
            post(routes::test_routes::submit_test),
        )
        .route("/api/results", get(routes::test_routes::my_results))
        .route(
            "/api/applications",
            get(routes::application_routes::list_applications)
                .post(routes::application_routes::create_application),
        )
        .route(
            "/api/applications/:id",
            get(routes::application_routes::get_application),
        )
        .route(
            "/api/applications/:id/stages/:stage/submit",
            post(routes::application_routes::submit_stage),
        )
        .route(
            "/api/applications/:id/stages/voice/recording",
            post(routes::application_routes::upload_voice_recording),
        )
        .route("/api/ai/summary", post(routes::feedback_routes::ai_summary))
        .route("/api/ai/report", post(routes::feedback_routes::ai_report))
        .layer(axum::middleware::from_fn(auth::require_bearer_auth))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let admin_api = Router::new()
        .route("/api/admin/tests", post(routes::admin_routes::create_test))
        .route(
            "/api/admin/tests/:id",
            axum::routing::patch(routes::admin_routes::update_test)
                .delete(routes::admin_routes::delete_test),
        )
        .route(
            "/api/admin/applications",
            get(routes::admin_routes::list_applications),
        )
        .layer(axum::middleware::from_fn(auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(config.admin_rps),
            rate_limit::rps_middleware,
        ));

    let uploads_dir = config
        .uploads_dir
        .clone()
        .unwrap_or_else(|| "uploads".to_string());
    info!("Serving uploads from: {}", uploads_dir);

    let app = base_routes
        .merge(public_api)
        .merge(admin_api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(uploads_dir),
        )
        .with_state(app_state)
        .layer(cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
