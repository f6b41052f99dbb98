//! Message entity for conversations.
//!
//! Messages are immutable records of user/assistant exchanges within a
//! conversation. Assistant messages that ask a guided-flow question carry a
//! typed [`FlowTag`] stamped at write time, so flow state can be re-derived
//! from history without depending on prompt wording.

use serde::{Deserialize, Serialize};

use crate::domain::flow::FlowTag;
use crate::domain::foundation::{MessageId, Timestamp, ValidationError};

/// Role of a message sender in a conversation.
///
/// Only user-visible roles are persisted; system instructions are rebuilt
/// on every turn by the prompt composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Inbound student message.
    User,
    /// AI assistant response.
    Assistant,
}

/// An immutable message within a conversation.
///
/// # Invariants
///
/// - `content` is non-empty (validated at construction)
/// - `created_at` is set at construction and never changes
/// - `flow_tag` is only ever present on assistant messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    role: Role,
    content: String,
    flow_tag: Option<FlowTag>,
    created_at: Timestamp,
}

impl Message {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty or whitespace
    pub fn user(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::User, content, None)
    }

    /// Creates an assistant message with no flow tag.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty or whitespace
    pub fn assistant(content: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, content, None)
    }

    /// Creates an assistant message tagged with the flow question it asks.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty or whitespace
    pub fn assistant_asking(
        content: impl Into<String>,
        tag: FlowTag,
    ) -> Result<Self, ValidationError> {
        Self::new(Role::Assistant, content, Some(tag))
    }

    fn new(
        role: Role,
        content: impl Into<String>,
        flow_tag: Option<FlowTag>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(Self {
            id: MessageId::new(),
            role,
            content,
            flow_tag,
            created_at: Timestamp::now(),
        })
    }

    /// Reconstitutes a message from persistence (no validation).
    pub fn reconstitute(
        id: MessageId,
        role: Role,
        content: String,
        flow_tag: Option<FlowTag>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            role,
            content,
            flow_tag,
            created_at,
        }
    }

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the flow question tag, if this message asked one.
    pub fn flow_tag(&self) -> Option<&FlowTag> {
        self.flow_tag.as_ref()
    }

    /// Returns when the message was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if this message is from the user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Returns true if this message is from the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::{FlowTag, ProfileField};

    #[test]
    fn user_creates_user_message() {
        let msg = Message::user("Hello").unwrap();
        assert!(msg.is_user());
        assert!(!msg.is_assistant());
        assert_eq!(msg.content(), "Hello");
        assert!(msg.flow_tag().is_none());
    }

    #[test]
    fn assistant_creates_assistant_message() {
        let msg = Message::assistant("Hi there").unwrap();
        assert!(msg.is_assistant());
        assert!(msg.flow_tag().is_none());
    }

    #[test]
    fn assistant_asking_carries_tag() {
        let msg = Message::assistant_asking(
            "What's your name?",
            FlowTag::ProfileQuestion(ProfileField::Name),
        )
        .unwrap();
        assert_eq!(
            msg.flow_tag(),
            Some(&FlowTag::ProfileQuestion(ProfileField::Name))
        );
    }

    #[test]
    fn rejects_empty_content() {
        assert!(Message::user("").is_err());
        assert!(Message::assistant("   ").is_err());
    }

    #[test]
    fn reconstitute_preserves_all_fields() {
        let id = MessageId::new();
        let created_at = Timestamp::now();

        let msg = Message::reconstitute(
            id,
            Role::User,
            "Test content".to_string(),
            None,
            created_at,
        );

        assert_eq!(msg.id(), &id);
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "Test content");
        assert_eq!(msg.created_at(), &created_at);
    }

    #[test]
    fn role_serializes_to_snake_case() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }
}
