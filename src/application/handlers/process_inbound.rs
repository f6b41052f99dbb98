//! ProcessInbound use case.
//!
//! One inbound student message: run the engine, then deliver the reply
//! through the outbound gateway when the conversation continues. On a finish
//! the closing reply is returned to the caller but nothing further is sent
//! for that turn.

use std::sync::Arc;

use tracing::warn;

use crate::domain::conversation::ResultType;
use crate::domain::engine::{ConversationEngine, EngineAction};
use crate::domain::foundation::SenderId;
use crate::ports::MessageSender;

/// Reply for a sender identity the handler cannot work with.
const BAD_SENDER_REPLY: &str =
    "I'm sorry, I couldn't process your message. Please try again.";

/// Command for one inbound message.
#[derive(Debug, Clone)]
pub struct ProcessInboundCommand {
    /// Raw sender identity from the webhook payload.
    pub sender: String,
    /// Message text.
    pub text: String,
}

/// Outcome of processing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundReply {
    pub response: String,
    pub action: EngineAction,
    pub result_type: Option<ResultType>,
    /// Whether the reply went out through the gateway.
    pub delivered: bool,
}

/// Handler for inbound webhook messages.
pub struct ProcessInboundHandler {
    engine: Arc<ConversationEngine>,
    gateway: Arc<dyn MessageSender>,
}

impl ProcessInboundHandler {
    pub fn new(engine: Arc<ConversationEngine>, gateway: Arc<dyn MessageSender>) -> Self {
        Self { engine, gateway }
    }

    /// Processes one inbound message.
    ///
    /// Infallible by design: a bad sender identity gets an apologetic reply
    /// instead of an error, and a failed delivery never suppresses the
    /// response text.
    pub async fn handle(&self, command: ProcessInboundCommand) -> InboundReply {
        let sender = match SenderId::new(&command.sender) {
            Ok(sender) => sender,
            Err(e) => {
                warn!(error = %e, "inbound message with unusable sender identity");
                return InboundReply {
                    response: BAD_SENDER_REPLY.to_string(),
                    action: EngineAction::Continue,
                    result_type: None,
                    delivered: false,
                };
            }
        };

        let reply = self.engine.process_message(&sender, &command.text).await;

        let delivered = match reply.action {
            EngineAction::Continue => {
                let receipt = self.gateway.send(&sender, &reply.response).await;
                if !receipt.success {
                    warn!(
                        to = %sender,
                        error = receipt.error.as_deref().unwrap_or("unknown"),
                        "outbound delivery failed"
                    );
                }
                receipt.success
            }
            // Closing turn: the caller suppresses further assistant text.
            EngineAction::Finish => false,
        };

        InboundReply {
            response: reply.response,
            action: reply.action,
            result_type: reply.result_type,
            delivered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockModel;
    use crate::adapters::knowledge::StaticKnowledgeBase;
    use crate::adapters::sms::LogSender;
    use crate::adapters::storage::InMemoryStore;
    use crate::domain::engine::EngineConfig;
    use crate::domain::prompt::PromptComposer;

    fn handler_with(model: MockModel) -> (ProcessInboundHandler, Arc<LogSender>) {
        let engine = Arc::new(ConversationEngine::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(StaticKnowledgeBase::new()),
            Arc::new(model),
            PromptComposer::default(),
            EngineConfig::default(),
        ));
        let gateway = Arc::new(LogSender::new());
        (
            ProcessInboundHandler::new(engine, gateway.clone()),
            gateway,
        )
    }

    #[tokio::test]
    async fn continuation_reply_is_delivered() {
        let (handler, gateway) = handler_with(MockModel::new().with_text("You can pay online."));

        let reply = handler
            .handle(ProcessInboundCommand {
                sender: "+18475551234".to_string(),
                text: "how do I pay".to_string(),
            })
            .await;

        assert_eq!(reply.action, EngineAction::Continue);
        assert!(reply.delivered);
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].text, "You can pay online.");
    }

    #[tokio::test]
    async fn finish_suppresses_outbound_send() {
        let (handler, gateway) = handler_with(MockModel::new().with_finish("paid"));

        let reply = handler
            .handle(ProcessInboundCommand {
                sender: "+18475551234".to_string(),
                text: "just paid it".to_string(),
            })
            .await;

        assert_eq!(reply.action, EngineAction::Finish);
        assert_eq!(reply.result_type, Some(ResultType::Paid));
        assert!(!reply.delivered);
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn empty_sender_gets_apologetic_reply() {
        let (handler, gateway) = handler_with(MockModel::new());

        let reply = handler
            .handle(ProcessInboundCommand {
                sender: "   ".to_string(),
                text: "hello".to_string(),
            })
            .await;

        assert_eq!(reply.action, EngineAction::Continue);
        assert!(!reply.delivered);
        assert!(!reply.response.is_empty());
        assert!(gateway.sent().is_empty());
    }
}
