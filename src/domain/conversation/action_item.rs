//! Action items extracted from assistant replies.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ActionItemId, StateMachine, Timestamp, ValidationError};

/// Progress status of an action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActionItemStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl StateMachine for ActionItemStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ActionItemStatus::*;
        matches!(
            (self, target),
            (Pending, InProgress) | (Pending, Completed) | (InProgress, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ActionItemStatus::*;
        match self {
            Pending => vec![InProgress, Completed],
            InProgress => vec![Completed],
            Completed => vec![],
        }
    }
}

/// A follow-up task implied by an assistant reply.
///
/// Action items are appended to a conversation and never deleted; only their
/// status moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    id: ActionItemId,
    action: String,
    status: ActionItemStatus,
    due_date: Option<NaiveDate>,
    created_at: Timestamp,
}

impl ActionItem {
    /// Creates a pending action item.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the action text is empty or whitespace
    pub fn pending(action: impl Into<String>) -> Result<Self, ValidationError> {
        let action = action.into();
        if action.trim().is_empty() {
            return Err(ValidationError::empty_field("action"));
        }
        Ok(Self {
            id: ActionItemId::new(),
            action,
            status: ActionItemStatus::Pending,
            due_date: None,
            created_at: Timestamp::now(),
        })
    }

    /// Sets a due date.
    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Reconstitutes an action item from persistence.
    pub fn reconstitute(
        id: ActionItemId,
        action: String,
        status: ActionItemStatus,
        due_date: Option<NaiveDate>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            action,
            status,
            due_date,
            created_at,
        }
    }

    pub fn id(&self) -> &ActionItemId {
        &self.id
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn status(&self) -> ActionItemStatus {
        self.status
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Advances the status.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the transition moves backwards
    pub fn set_status(&mut self, status: ActionItemStatus) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(status)?;
        Ok(())
    }
}
