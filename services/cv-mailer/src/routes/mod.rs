use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Router,
};
use cv_mailer_utils::AppConfig;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers::*, middleware::request_id_middleware, AppState};

pub fn create_api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/config", get(get_config))
        .route("/send-single", post(send_single))
        .route("/recipients", post(send_batch))
        .route("/test-email", post(send_test_email))
}

/// Full application: API routes under `/api` plus the middleware stack.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .nest("/api", create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                        .allow_headers(Any),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}
