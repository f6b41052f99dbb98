//! Conversation entity - core conversation management.

use crate::domain::conversation::{
    ActionItem, ConversationStatus, Message, Role, TriggerKind,
};
use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, SenderId, StateMachine, Timestamp, TriggerId,
};

/// Conversation aggregate - an ordered, append-only dialogue with one sender.
///
/// Owned exclusively by the orchestrator. Mutation is limited to appending
/// messages, appending action items, and the single `Active -> Completed`
/// status transition; messages are never reordered or rewritten.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    sender: SenderId,
    status: ConversationStatus,
    trigger: TriggerKind,
    trigger_id: Option<TriggerId>,
    messages: Vec<Message>,
    action_items: Vec<ActionItem>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Creates a new active conversation for a sender.
    pub fn new(sender: SenderId, trigger: TriggerKind) -> Self {
        let now = Timestamp::now();
        Self {
            id: ConversationId::new(),
            sender,
            status: ConversationStatus::Active,
            trigger,
            trigger_id: None,
            messages: Vec::new(),
            action_items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Links the conversation to the trigger record that started it.
    pub fn with_trigger_id(mut self, trigger_id: TriggerId) -> Self {
        self.trigger_id = Some(trigger_id);
        self
    }

    /// Reconstitutes a conversation from persistence.
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: ConversationId,
        sender: SenderId,
        status: ConversationStatus,
        trigger: TriggerKind,
        trigger_id: Option<TriggerId>,
        messages: Vec<Message>,
        action_items: Vec<ActionItem>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            sender,
            status,
            trigger,
            trigger_id,
            messages,
            action_items,
            created_at,
            updated_at,
        }
    }

    // === Accessors ===

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn sender(&self) -> &SenderId {
        &self.sender
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn trigger(&self) -> TriggerKind {
        self.trigger
    }

    pub fn trigger_id(&self) -> Option<&TriggerId> {
        self.trigger_id.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn action_items(&self) -> &[ActionItem] {
        &self.action_items
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role() == Role::User).count()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// True while only the seeded opening (if any) and at most one user turn
    /// have happened - the window where profile setup kicks in.
    pub fn is_new(&self) -> bool {
        self.user_message_count() <= 1
    }

    // === Message Management ===

    /// Appends a message to the conversation.
    ///
    /// # Errors
    ///
    /// - `ConversationCompleted` if the conversation is no longer active
    pub fn append_message(&mut self, message: Message) -> Result<&Message, DomainError> {
        if !self.status.is_active() {
            return Err(DomainError::new(
                ErrorCode::ConversationCompleted,
                format!("Cannot append message to {:?} conversation", self.status),
            ));
        }
        self.messages.push(message);
        self.updated_at = Timestamp::now();
        Ok(self.messages.last().expect("just pushed"))
    }

    // === Action Items ===

    /// Appends an action item.
    ///
    /// # Errors
    ///
    /// - `ConversationCompleted` if the conversation is no longer active
    pub fn append_action_item(&mut self, item: ActionItem) -> Result<(), DomainError> {
        if !self.status.is_active() {
            return Err(DomainError::new(
                ErrorCode::ConversationCompleted,
                format!("Cannot append action item to {:?} conversation", self.status),
            ));
        }
        self.action_items.push(item);
        self.updated_at = Timestamp::now();
        Ok(())
    }

    // === Status ===

    /// Transitions the conversation to `Completed`.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already completed
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(ConversationStatus::Completed)
            .map_err(|e| DomainError::new(ErrorCode::InvalidStateTransition, e.to_string()))?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    // === Context Building ===

    /// Returns the most recent `max_messages` messages, oldest first.
    pub fn trailing_messages(&self, max_messages: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(max_messages);
        &self.messages[start..]
    }

    /// Returns up to `max` of the most recent user messages, oldest first.
    pub fn recent_user_messages(&self, max: usize) -> Vec<&Message> {
        let mut recent: Vec<&Message> = self
            .messages
            .iter()
            .rev()
            .filter(|m| m.is_user())
            .take(max)
            .collect();
        recent.reverse();
        recent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_conversation() -> Conversation {
        Conversation::new(
            SenderId::new("+18475551234").unwrap(),
            TriggerKind::Default,
        )
    }

    #[test]
    fn new_conversation_is_active_and_empty() {
        let conv = test_conversation();
        assert_eq!(conv.status(), ConversationStatus::Active);
        assert_eq!(conv.message_count(), 0);
        assert!(conv.action_items().is_empty());
        assert!(conv.trigger_id().is_none());
    }

    #[test]
    fn append_preserves_order() {
        let mut conv = test_conversation();
        conv.append_message(Message::user("one").unwrap()).unwrap();
        conv.append_message(Message::assistant("two").unwrap()).unwrap();
        conv.append_message(Message::user("three").unwrap()).unwrap();

        let contents: Vec<&str> = conv.messages().iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
        assert_eq!(conv.last_message().unwrap().content(), "three");
    }

    #[test]
    fn user_message_count_only_counts_user_messages() {
        let mut conv = test_conversation();
        conv.append_message(Message::assistant("Hi!").unwrap()).unwrap();
        conv.append_message(Message::user("Hello").unwrap()).unwrap();
        conv.append_message(Message::assistant("What's up?").unwrap()).unwrap();

        assert_eq!(conv.user_message_count(), 1);
    }

    #[test]
    fn is_new_with_seeded_opening_and_first_user_turn() {
        let mut conv = test_conversation();
        conv.append_message(Message::assistant("Hi! I'm here to help.").unwrap())
            .unwrap();
        assert!(conv.is_new());

        conv.append_message(Message::user("hey").unwrap()).unwrap();
        assert!(conv.is_new());

        conv.append_message(Message::assistant("What do you need?").unwrap())
            .unwrap();
        conv.append_message(Message::user("help me register").unwrap())
            .unwrap();
        assert!(!conv.is_new());
    }

    #[test]
    fn complete_transitions_once() {
        let mut conv = test_conversation();
        conv.complete().unwrap();
        assert_eq!(conv.status(), ConversationStatus::Completed);

        let err = conv.complete().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[test]
    fn completed_conversation_rejects_appends() {
        let mut conv = test_conversation();
        conv.complete().unwrap();

        let err = conv
            .append_message(Message::user("still there?").unwrap())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationCompleted);

        let err = conv
            .append_action_item(ActionItem::pending("pay balance").unwrap())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ConversationCompleted);
    }

    #[test]
    fn trailing_messages_returns_window() {
        let mut conv = test_conversation();
        for i in 0..8 {
            conv.append_message(Message::user(format!("m{}", i)).unwrap())
                .unwrap();
        }

        let window = conv.trailing_messages(3);
        let contents: Vec<&str> = window.iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["m5", "m6", "m7"]);

        // Window larger than history returns everything.
        assert_eq!(conv.trailing_messages(100).len(), 8);
    }

    #[test]
    fn recent_user_messages_skips_assistant_turns() {
        let mut conv = test_conversation();
        conv.append_message(Message::user("a").unwrap()).unwrap();
        conv.append_message(Message::assistant("r1").unwrap()).unwrap();
        conv.append_message(Message::user("b").unwrap()).unwrap();
        conv.append_message(Message::assistant("r2").unwrap()).unwrap();
        conv.append_message(Message::user("c").unwrap()).unwrap();

        let recent = conv.recent_user_messages(2);
        let contents: Vec<&str> = recent.iter().map(|m| m.content()).collect();
        assert_eq!(contents, vec!["b", "c"]);
    }
}
