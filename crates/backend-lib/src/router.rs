// ============================
// backend-lib/src/router.rs
// ============================
//! HTTP router.
use crate::handlers;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route(
            "/api/auth/validate",
            get(handlers::validate).post(handlers::validate),
        )
        .route("/api/auth/logout", post(handlers::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
