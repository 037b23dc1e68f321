use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::security::{self, RateLimiter};
use crate::AppState;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn routes(limiter: Arc<RateLimiter>) -> Router<Arc<AppState>> {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/submissions/single", post(handlers::submit_single))
        .route("/api/submissions/single/:token", get(handlers::get_single))
        .route(
            "/api/submissions/batch",
            post(handlers::submit_batch).get(handlers::get_batch),
        )
        .route("/api/submissions/languages", get(handlers::list_languages))
        .route("/api/submissions/statuses", get(handlers::list_statuses))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(limiter, security::rate_limit));

    // Outermost, so rejected requests still carry these headers
    security::with_security_headers(router).layer(security::cors_layer())
}
