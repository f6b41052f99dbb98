//! HTTP handlers for the inbound surface.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::handlers::{
    ProcessInboundCommand, ProcessInboundHandler, StartTriggerCommand, StartTriggerError,
    StartTriggerHandler,
};

use super::dto::{
    ErrorResponse, HealthResponse, InboundRequest, InboundResponse, TriggerRequest,
    TriggerResponse,
};

/// Shared handler state for the API router.
#[derive(Clone)]
pub struct ApiHandlers {
    inbound: Arc<ProcessInboundHandler>,
    trigger: Arc<StartTriggerHandler>,
}

impl ApiHandlers {
    pub fn new(inbound: Arc<ProcessInboundHandler>, trigger: Arc<StartTriggerHandler>) -> Self {
        Self { inbound, trigger }
    }
}

/// POST /inbound - process one inbound student message.
///
/// Always 200 with a textual reply; the engine absorbs collaborator
/// failures.
pub async fn process_inbound(
    State(handlers): State<ApiHandlers>,
    Json(req): Json<InboundRequest>,
) -> Response {
    let reply = handlers
        .inbound
        .handle(ProcessInboundCommand {
            sender: req.sender,
            text: req.text,
        })
        .await;

    (StatusCode::OK, Json(InboundResponse::from(reply))).into_response()
}

/// POST /triggers - start a proactive conversation.
pub async fn start_trigger(
    State(handlers): State<ApiHandlers>,
    Json(req): Json<TriggerRequest>,
) -> Response {
    let command = StartTriggerCommand {
        sender: req.sender,
        trigger_type: req.trigger_type,
    };

    match handlers.trigger.handle(command).await {
        Ok(started) => {
            (StatusCode::CREATED, Json(TriggerResponse::from(started))).into_response()
        }
        Err(e) => handle_trigger_error(e),
    }
}

/// GET /health - liveness probe.
pub async fn health() -> Response {
    (StatusCode::OK, Json(HealthResponse { status: "ok" })).into_response()
}

fn handle_trigger_error(error: StartTriggerError) -> Response {
    match error {
        StartTriggerError::InvalidSender(msg) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("Invalid sender: {}", msg))),
        )
            .into_response(),
        StartTriggerError::UnknownTrigger(kind) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(format!("Unknown trigger type: {}", kind))),
        )
            .into_response(),
        StartTriggerError::Storage(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
            .into_response(),
    }
}
