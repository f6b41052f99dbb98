//! In-memory implementation of the conversation store.
//!
//! A mutex-guarded map store. Serves three roles: the test backend, the
//! development backend, and the explicit injectable fallback when no
//! database is configured. Appends and completion happen inside one lock
//! section, which is what makes them atomic to readers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::conversation::{
    ActionItem, Conversation, ConversationStatus, Message, Outcome, TriggerKind,
};
use crate::domain::foundation::{ConversationId, SenderId, StateMachine};
use crate::domain::student::{Deadline, StudentProfile};
use crate::ports::{ConversationStore, StoreError};

#[derive(Default)]
struct Inner {
    conversations: HashMap<ConversationId, Conversation>,
    outcomes: HashMap<ConversationId, Vec<Outcome>>,
    profiles: HashMap<String, StudentProfile>,
    deadlines: Vec<Deadline>,
}

/// Mutex-guarded in-memory conversation store.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds upcoming deadlines (for tests and development).
    pub fn with_deadlines(self, deadlines: Vec<Deadline>) -> Self {
        self.inner.lock().expect("store lock").deadlines = deadlines;
        self
    }

    /// Seeds a student profile (for tests and development).
    pub fn insert_profile(&self, profile: StudentProfile) {
        self.inner
            .lock()
            .expect("store lock")
            .profiles
            .insert(profile.sender.as_str().to_string(), profile);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store lock poisoned")
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn create_conversation(
        &self,
        sender: &SenderId,
        trigger: TriggerKind,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(sender.clone(), trigger);
        self.lock()
            .conversations
            .insert(conversation.id(), conversation.clone());
        Ok(conversation)
    }

    async fn get(&self, id: ConversationId) -> Result<Option<Conversation>, StoreError> {
        Ok(self.lock().conversations.get(&id).cloned())
    }

    async fn find_active_by_sender(
        &self,
        sender: &SenderId,
    ) -> Result<Option<Conversation>, StoreError> {
        let inner = self.lock();
        let mut candidates: Vec<&Conversation> = inner
            .conversations
            .values()
            .filter(|c| c.sender() == sender && c.status().is_active())
            .collect();
        candidates.sort_by_key(|c| c.updated_at());
        Ok(candidates.last().map(|c| (*c).clone()))
    }

    async fn append_message(
        &self,
        id: ConversationId,
        message: &Message,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        conversation
            .append_message(message.clone())
            .map_err(|_| StoreError::AlreadyCompleted(id))?;
        Ok(())
    }

    async fn append_action_item(
        &self,
        id: ConversationId,
        item: &ActionItem,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        conversation
            .append_action_item(item.clone())
            .map_err(|_| StoreError::AlreadyCompleted(id))?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: ConversationId,
        status: ConversationStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        conversation
            .status()
            .transition_to(status)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        if status == ConversationStatus::Completed {
            conversation
                .complete()
                .map_err(|_| StoreError::AlreadyCompleted(id))?;
        }
        Ok(())
    }

    async fn complete(&self, id: ConversationId, outcome: Outcome) -> Result<(), StoreError> {
        // Single critical section: status transition and outcome creation
        // are observed together or not at all.
        let mut inner = self.lock();
        let conversation = inner
            .conversations
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        conversation
            .complete()
            .map_err(|_| StoreError::AlreadyCompleted(id))?;
        inner.outcomes.entry(id).or_default().push(outcome);
        Ok(())
    }

    async fn outcomes_for(&self, id: ConversationId) -> Result<Vec<Outcome>, StoreError> {
        Ok(self.lock().outcomes.get(&id).cloned().unwrap_or_default())
    }

    async fn student_profile(
        &self,
        sender: &SenderId,
    ) -> Result<Option<StudentProfile>, StoreError> {
        Ok(self.lock().profiles.get(sender.as_str()).cloned())
    }

    async fn save_student_profile(&self, profile: &StudentProfile) -> Result<(), StoreError> {
        self.lock()
            .profiles
            .insert(profile.sender.as_str().to_string(), profile.clone());
        Ok(())
    }

    async fn upcoming_deadlines(&self, days_ahead: i64) -> Result<Vec<Deadline>, StoreError> {
        let mut deadlines: Vec<Deadline> = self
            .lock()
            .deadlines
            .iter()
            .filter(|d| d.days_until >= 0 && d.days_until <= days_ahead)
            .cloned()
            .collect();
        deadlines.sort_by_key(|d| d.days_until);
        Ok(deadlines)
    }
}
