//! Hold diagnosis flow.
//!
//! One question ("what does the hold message say?"), one captured answer.
//! The captured text parameterizes the fix-guide directive.

use crate::domain::conversation::Message;

use super::tag::FlowTag;

/// Trailing window inspected for hold-flow activity.
pub const HOLD_WINDOW: usize = 5;

/// Derived hold-flow state for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HoldFlow {
    active: bool,
    hold_message: Option<String>,
}

impl HoldFlow {
    /// Reconstructs hold-flow state from the trailing message window.
    ///
    /// Active if the assistant asked for the hold message within the window;
    /// the answer is the first user message following that question.
    pub fn reconstruct(messages: &[Message]) -> Self {
        let start = messages.len().saturating_sub(HOLD_WINDOW);
        let window = &messages[start..];

        let mut flow = HoldFlow::default();
        for msg in window {
            if msg.is_assistant() {
                if matches!(msg.flow_tag(), Some(FlowTag::HoldMessageQuestion)) {
                    flow.active = true;
                }
            } else if flow.active && flow.hold_message.is_none() && msg.is_user() {
                flow.hold_message = Some(msg.content().trim().to_string());
            }
        }
        flow
    }

    /// Returns true if the hold question appears in the window.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The hold message the student reported, if captured.
    pub fn hold_message(&self) -> Option<&str> {
        self.hold_message.as_deref()
    }
}
