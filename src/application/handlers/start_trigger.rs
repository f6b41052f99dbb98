//! StartTrigger use case.
//!
//! Starts a proactive conversation for a sender from a trigger category and
//! delivers the trigger's fixed opening message.

use std::sync::Arc;

use tracing::warn;

use crate::domain::conversation::TriggerKind;
use crate::domain::engine::ConversationEngine;
use crate::domain::foundation::{ConversationId, SenderId};
use crate::ports::{MessageSender, StoreError};

/// Command to start a triggered conversation.
#[derive(Debug, Clone)]
pub struct StartTriggerCommand {
    /// Raw sender identity (phone number or virtual web id).
    pub sender: String,
    /// Trigger category in wire form (e.g. `payment_deadline_3days`).
    pub trigger_type: String,
}

/// Errors starting a triggered conversation.
#[derive(Debug, thiserror::Error)]
pub enum StartTriggerError {
    #[error("invalid sender: {0}")]
    InvalidSender(String),

    #[error("unknown trigger type: {0}")]
    UnknownTrigger(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Result of starting a triggered conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerStarted {
    pub conversation_id: ConversationId,
    /// The opening message seeded into the conversation.
    pub message: String,
    /// Whether the opening message went out through the gateway.
    pub delivered: bool,
}

/// Handler for trigger requests.
pub struct StartTriggerHandler {
    engine: Arc<ConversationEngine>,
    gateway: Arc<dyn MessageSender>,
}

impl StartTriggerHandler {
    pub fn new(engine: Arc<ConversationEngine>, gateway: Arc<dyn MessageSender>) -> Self {
        Self { engine, gateway }
    }

    pub async fn handle(
        &self,
        command: StartTriggerCommand,
    ) -> Result<TriggerStarted, StartTriggerError> {
        let sender = SenderId::new(&command.sender)
            .map_err(|e| StartTriggerError::InvalidSender(e.to_string()))?;
        let trigger: TriggerKind = command
            .trigger_type
            .parse()
            .map_err(|_| StartTriggerError::UnknownTrigger(command.trigger_type.clone()))?;

        let conversation = self.engine.start_conversation(&sender, trigger).await?;
        let message = trigger.opening_message().to_string();

        let receipt = self.gateway.send(&sender, &message).await;
        if !receipt.success {
            warn!(
                to = %sender,
                error = receipt.error.as_deref().unwrap_or("unknown"),
                "trigger opening delivery failed"
            );
        }

        Ok(TriggerStarted {
            conversation_id: conversation.id(),
            message,
            delivered: receipt.success,
        })
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
    use crate::ports::ConversationStore;

    fn handler() -> (StartTriggerHandler, Arc<InMemoryStore>, Arc<LogSender>) {
        let store = Arc::new(InMemoryStore::new());
        let engine = Arc::new(ConversationEngine::new(
            store.clone(),
            Arc::new(StaticKnowledgeBase::new()),
            Arc::new(MockModel::new()),
            PromptComposer::default(),
            EngineConfig::default(),
        ));
        let gateway = Arc::new(LogSender::new());
        (
            StartTriggerHandler::new(engine, gateway.clone()),
            store,
            gateway,
        )
    }

    #[tokio::test]
    async fn starts_conversation_and_sends_opening() {
        let (handler, store, gateway) = handler();

        let started = handler
            .handle(StartTriggerCommand {
                sender: "+18475551234".to_string(),
                trigger_type: "payment_deadline_3days".to_string(),
            })
            .await
            .unwrap();

        assert!(started.delivered);
        assert_eq!(
            started.message,
            TriggerKind::PaymentDeadline3Days.opening_message()
        );
        assert_eq!(gateway.sent()[0].text, started.message);

        let conversation = store.get(started.conversation_id).await.unwrap().unwrap();
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.trigger(), TriggerKind::PaymentDeadline3Days);
    }

    #[tokio::test]
    async fn unknown_trigger_is_rejected() {
        let (handler, _, gateway) = handler();

        let err = handler
            .handle(StartTriggerCommand {
                sender: "+18475551234".to_string(),
                trigger_type: "tuition_due".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StartTriggerError::UnknownTrigger(_)));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn invalid_sender_is_rejected() {
        let (handler, _, _) = handler();

        let err = handler
            .handle(StartTriggerCommand {
                sender: "".to_string(),
                trigger_type: "default".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StartTriggerError::InvalidSender(_)));
    }
}
