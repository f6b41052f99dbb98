//! Conversation storage port.
//!
//! Contract for persisting conversations, action items, outcomes, and the
//! profile/deadline lookups used for prompt enrichment.
//!
//! # Design
//!
//! - **Append-only messages**: `append_message` must be an atomic,
//!   order-preserving append (never read-modify-write), so concurrent turns
//!   cannot lose updates.
//! - **Atomic completion**: `complete` performs the `Active -> Completed`
//!   status transition and outcome creation as one operation; readers never
//!   observe one without the other.
//! - **Safe to fail**: the engine treats every call as best-effort and
//!   degrades instead of crashing the turn.

use async_trait::async_trait;

use crate::domain::conversation::{
    ActionItem, Conversation, ConversationStatus, Message, Outcome, TriggerKind,
};
use crate::domain::foundation::{ConversationId, SenderId};
use crate::domain::student::{Deadline, StudentProfile};

/// Storage collaborator errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("conversation already completed: {0}")]
    AlreadyCompleted(ConversationId),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Port for conversation persistence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates a new active conversation for a sender.
    async fn create_conversation(
        &self,
        sender: &SenderId,
        trigger: TriggerKind,
    ) -> Result<Conversation, StoreError>;

    /// Fetches a conversation with its full message history.
    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError>;

    /// Finds the sender's current active conversation, most recent first.
    async fn find_active_by_sender(
        &self,
        sender: &SenderId,
    ) -> Result<Option<Conversation>, StoreError>;

    /// Appends a message to a conversation.
    async fn append_message(
        &self,
        id: ConversationId,
        message: &Message,
    ) -> Result<(), StoreError>;

    /// Appends an action item to a conversation.
    async fn append_action_item(
        &self,
        id: ConversationId,
        item: &ActionItem,
    ) -> Result<(), StoreError>;

    /// Sets a conversation's lifecycle status.
    async fn set_status(
        &self,
        id: ConversationId,
        status: ConversationStatus,
    ) -> Result<(), StoreError>;

    /// Atomically completes a conversation and records its outcome.
    async fn complete(&self, id: ConversationId, outcome: Outcome) -> Result<(), StoreError>;

    /// Returns all outcomes recorded for a conversation.
    async fn outcomes_for(&self, id: ConversationId) -> Result<Vec<Outcome>, StoreError>;

    /// Looks up a student profile for prompt enrichment.
    async fn student_profile(
        &self,
        sender: &SenderId,
    ) -> Result<Option<StudentProfile>, StoreError>;

    /// Creates or updates a student profile.
    async fn save_student_profile(&self, profile: &StudentProfile) -> Result<(), StoreError>;

    /// Returns deadlines within the next `days_ahead` days, soonest first.
    async fn upcoming_deadlines(&self, days_ahead: i64) -> Result<Vec<Deadline>, StoreError>;
}
