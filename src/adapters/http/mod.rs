//! HTTP inbound surface.
//!
//! Thin webhook/API layer over the application handlers: an inbound-message
//! endpoint, a trigger endpoint, and a health check.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, HealthResponse, InboundRequest, InboundResponse, TriggerRequest,
    TriggerResponse,
};
pub use handlers::ApiHandlers;
pub use routes::api_routes;
