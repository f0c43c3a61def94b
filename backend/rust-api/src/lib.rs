use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;

pub use config::Config;
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    metrics::CATALOG_QUESTIONS.set(app_state.catalog.question_count() as i64);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(tower_http::cors::Any); // TODO: restrict once the front-end origin is fixed

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        .nest("/api/v1", api_routes().layer(cors))
        .with_state(app_state)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/skills", get(handlers::catalog::list_skills))
        .route("/questions", get(handlers::catalog::list_questions))
        .route("/questions/{id}", get(handlers::catalog::get_question))
        .route(
            "/distractor-patterns",
            get(handlers::catalog::list_patterns),
        )
        .route(
            "/distractor-patterns/match",
            post(handlers::catalog::match_pattern),
        )
        .route(
            "/learners/{id}/responses",
            get(handlers::learners::list_responses).post(handlers::learners::submit_response),
        )
        .route("/learners/{id}/progress", get(handlers::learners::get_progress))
}
