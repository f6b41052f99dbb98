//! Route table for the inbound surface.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{health, process_inbound, start_trigger, ApiHandlers};

/// Creates the API router with all endpoints.
pub fn api_routes(handlers: ApiHandlers) -> Router {
    Router::new()
        .route("/inbound", post(process_inbound))
        .route("/triggers", post(start_trigger))
        .route("/health", get(health))
        .with_state(handlers)
}
