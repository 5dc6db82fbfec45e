pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/tailor", post(handlers::handle_tailor))
        .route("/api/v1/resumes/:key", get(handlers::handle_retrieve))
        .with_state(state)
}
