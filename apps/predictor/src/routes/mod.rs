pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::submission::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Form page
        .route("/", get(handlers::handle_page))
        .route("/predict", post(handlers::handle_predict))
        .route("/reset", post(handlers::handle_reset))
        // JSON view of the submission lifecycle
        .route("/api/v1/submission", get(handlers::handle_submission_state))
        .with_state(state)
}
