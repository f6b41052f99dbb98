//! Message intent classification.
//!
//! A pure function from message text to a set of independent boolean flags.
//! Flags are not mutually exclusive - the prompt composer decides how to
//! combine overlapping intents.

use super::rules::{IntentKind, COMPILED};

/// Independent intent flags for one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntentFlags {
    pub link_request: bool,
    pub policy_question: bool,
    pub financial_aid: bool,
    pub hold: bool,
    pub registration_trouble: bool,
    pub next_steps: bool,
}

impl IntentFlags {
    /// Returns true if any intent matched.
    pub fn any(&self) -> bool {
        self.link_request
            || self.policy_question
            || self.financial_aid
            || self.hold
            || self.registration_trouble
            || self.next_steps
    }

    fn set(&mut self, kind: IntentKind) {
        match kind {
            IntentKind::LinkRequest => self.link_request = true,
            IntentKind::PolicyQuestion => self.policy_question = true,
            IntentKind::FinancialAid => self.financial_aid = true,
            IntentKind::Hold => self.hold = true,
            IntentKind::RegistrationTrouble => self.registration_trouble = true,
            IntentKind::NextSteps => self.next_steps = true,
        }
    }
}

/// Regex-rule based intent classifier.
///
/// Stateless and deterministic: identical input text always yields identical
/// flags, and classification has no side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classifies a raw message against every rule in the table.
    pub fn classify(&self, message: &str) -> IntentFlags {
        let mut flags = IntentFlags::default();
        for (kind, patterns) in COMPILED.iter() {
            if patterns.iter().any(|p| p.is_match(message)) {
                flags.set(*kind);
            }
        }
        flags
    }
}
