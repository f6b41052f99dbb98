//! Conversation lifecycle status.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The lifecycle status of a conversation.
///
/// A conversation is `Active` from creation until a finish signal records an
/// outcome, at which point it becomes `Completed` and read-only. Completed
/// conversations are never resumed; a new inbound message from the same
/// sender starts a fresh conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Open dialogue, accepting messages.
    #[default]
    Active,

    /// Terminal: outcome recorded, conversation is immutable history.
    Completed,
}

impl ConversationStatus {
    /// Returns true if the conversation still accepts messages.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl StateMachine for ConversationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        matches!(
            (self, target),
            (ConversationStatus::Active, ConversationStatus::Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            ConversationStatus::Active => vec![ConversationStatus::Completed],
            ConversationStatus::Completed => vec![],
        }
    }
}
