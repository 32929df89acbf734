pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::screening::handlers;
use crate::state::AppState;

/// Uploads of a few dozen resumes must fit in one form post.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening page
        .route("/", get(handlers::handle_index))
        .route("/screen", post(handlers::handle_screen_page))
        // Screening API
        .route("/api/v1/screen", post(handlers::handle_screen_api))
        .route("/api/v1/prompts", get(handlers::handle_prompts))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
