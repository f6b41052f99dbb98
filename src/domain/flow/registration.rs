//! Registration troubleshooting flow.
//!
//! Mirror of the hold flow, keyed on the on-screen error question.

use crate::domain::conversation::Message;

use super::tag::FlowTag;

/// Trailing window inspected for registration-flow activity.
pub const REGISTRATION_WINDOW: usize = 5;

/// Derived registration-troubleshooting state for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrationFlow {
    active: bool,
    error_message: Option<String>,
}

impl RegistrationFlow {
    /// Reconstructs registration-flow state from the trailing message window.
    pub fn reconstruct(messages: &[Message]) -> Self {
        let start = messages.len().saturating_sub(REGISTRATION_WINDOW);
        let window = &messages[start..];

        let mut flow = RegistrationFlow::default();
        for msg in window {
            if msg.is_assistant() {
                if matches!(msg.flow_tag(), Some(FlowTag::RegistrationErrorQuestion)) {
                    flow.active = true;
                }
            } else if flow.active && flow.error_message.is_none() && msg.is_user() {
                flow.error_message = Some(msg.content().trim().to_string());
            }
        }
        flow
    }

    /// Returns true if the error question appears in the window.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The error message the student reported, if captured.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}
