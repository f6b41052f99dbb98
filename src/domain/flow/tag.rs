//! Typed markers for flow questions asked by the assistant.

use serde::{Deserialize, Serialize};

use super::wizard::WizardKey;

/// The profile field a profile-flow question asks for.
///
/// Fields are collected in this fixed order, one per turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    StudentId,
    Program,
}

impl ProfileField {
    /// Collection order: name, then student id, then program.
    pub const ORDER: [ProfileField; 3] = [
        ProfileField::Name,
        ProfileField::StudentId,
        ProfileField::Program,
    ];

    /// Returns the snake_case key used in prompt snapshots.
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::StudentId => "student_id",
            ProfileField::Program => "program",
        }
    }
}

/// The flow question an assistant message asked, stamped at write time.
///
/// This is the explicit replacement for scanning assistant text for literal
/// question phrases: the orchestrator knows which question the composer
/// directed the model to ask and records it on the message itself. State
/// reconstruction reads only these tags plus message order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "flow", content = "question", rename_all = "snake_case")]
pub enum FlowTag {
    /// Profile setup asked for one field.
    ProfileQuestion(ProfileField),
    /// Hold diagnosis asked for the exact hold message.
    HoldMessageQuestion,
    /// Registration troubleshooting asked for the on-screen error.
    RegistrationErrorQuestion,
    /// Next-steps wizard asked one of its fixed diagnostic questions.
    WizardQuestion(WizardKey),
}
