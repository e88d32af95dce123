// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeFile,
    trace::TraceLayer,
};

use crate::{
    handlers::{admin, registration, results},
    state::AppState,
};

/// Assembles the main application router.
///
/// * `/questions.json` is the static question source read by the exam client.
/// * Registration, result storage and the admin dashboard share one pool.
/// * Trace and CORS wrap everything.
pub fn create_router(state: AppState) -> Router {
    // The exam pages are opened from arbitrary origins (file://, dev servers).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route("/test-results", post(results::submit_test_results))
        .route("/user/results", get(results::get_user_results))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/login", post(admin::login));

    Router::new()
        .route_service(
            "/questions.json",
            ServeFile::new(&state.config.questions_file),
        )
        .route("/register", post(registration::register))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
