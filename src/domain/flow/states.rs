//! Combined flow-state view.

use crate::domain::conversation::Message;

use super::hold::HoldFlow;
use super::profile::ProfileFlow;
use super::registration::RegistrationFlow;
use super::wizard::WizardProgress;

/// Every guided flow's derived state for one conversation, reconstructed in
/// a single pass over the message history.
///
/// This is a view: it holds no identity of its own and must be re-derivable
/// purely from the message sequence. Same history, same state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlowStates {
    pub profile: ProfileFlow,
    pub hold: HoldFlow,
    pub registration: RegistrationFlow,
    pub wizard: WizardProgress,
}

impl FlowStates {
    /// Reconstructs all flow states from a conversation's messages.
    ///
    /// Each flow applies its own trailing window; very long conversations
    /// intentionally forget flow state beyond those windows.
    pub fn reconstruct(messages: &[Message]) -> Self {
        Self {
            profile: ProfileFlow::reconstruct(messages),
            hold: HoldFlow::reconstruct(messages),
            registration: RegistrationFlow::reconstruct(messages),
            wizard: WizardProgress::reconstruct(messages),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::flow::{FlowTag, ProfileField, WizardKey};

    #[test]
    fn reconstructs_independent_flows_from_one_history() {
        let messages = vec![
            Message::assistant_asking(
                "What's your name?",
                FlowTag::ProfileQuestion(ProfileField::Name),
            )
            .unwrap(),
            Message::user("Jordan").unwrap(),
            Message::assistant_asking(
                "Have you registered for classes yet? (yes/no)",
                FlowTag::WizardQuestion(WizardKey::Registered),
            )
            .unwrap(),
            Message::user("no").unwrap(),
        ];

        let states = FlowStates::reconstruct(&messages);
        assert!(states.profile.is_active());
        assert_eq!(states.profile.fields().name.as_deref(), Some("Jordan"));
        assert!(states.wizard.is_active());
        assert!(!states.hold.is_active());
        assert!(!states.registration.is_active());
    }

    #[test]
    fn empty_history_has_no_active_flows() {
        let states = FlowStates::reconstruct(&[]);
        assert!(!states.profile.is_active());
        assert!(!states.hold.is_active());
        assert!(!states.registration.is_active());
        assert!(!states.wizard.is_active());
    }

    #[test]
    fn reconstruction_is_idempotent() {
        let messages = vec![
            Message::assistant_asking("What hold message do you see?", FlowTag::HoldMessageQuestion)
                .unwrap(),
            Message::user("Tuition Payment Hold").unwrap(),
        ];
        assert_eq!(
            FlowStates::reconstruct(&messages),
            FlowStates::reconstruct(&messages)
        );
    }
}
