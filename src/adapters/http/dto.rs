//! HTTP DTOs for the inbound surface.
//!
//! These types decouple the wire format from domain types.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{InboundReply, TriggerStarted};
use crate::domain::engine::EngineAction;

/// Inbound webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundRequest {
    /// Phone number or virtual web identifier.
    pub sender: String,
    /// Message text.
    pub text: String,
}

/// Reply for an inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct InboundResponse {
    pub response: String,
    /// `continue` or `finish`.
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<String>,
}

impl From<InboundReply> for InboundResponse {
    fn from(reply: InboundReply) -> Self {
        Self {
            response: reply.response,
            action: match reply.action {
                EngineAction::Continue => "continue",
                EngineAction::Finish => "finish",
            },
            result_type: reply.result_type.map(|rt| rt.as_str().to_string()),
        }
    }
}

/// Request to start a triggered conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct TriggerRequest {
    pub sender: String,
    pub trigger_type: String,
}

/// Response after starting a triggered conversation.
#[derive(Debug, Clone, Serialize)]
pub struct TriggerResponse {
    pub conversation_id: String,
    pub message: String,
    pub delivered: bool,
}

impl From<TriggerStarted> for TriggerResponse {
    fn from(started: TriggerStarted) -> Self {
        Self {
            conversation_id: started.conversation_id.to_string(),
            message: started.message,
            delivered: started.delivered,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body for failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::ResultType;

    #[test]
    fn finish_reply_serializes_action_and_result_type() {
        let response = InboundResponse::from(InboundReply {
            response: "All set!".to_string(),
            action: EngineAction::Finish,
            result_type: Some(ResultType::Paid),
            delivered: false,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["action"], "finish");
        assert_eq!(json["result_type"], "paid");
    }

    #[test]
    fn continuation_reply_omits_result_type() {
        let response = InboundResponse::from(InboundReply {
            response: "Here's how to pay.".to_string(),
            action: EngineAction::Continue,
            result_type: None,
            delivered: true,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["action"], "continue");
        assert!(json.get("result_type").is_none());
    }
}
