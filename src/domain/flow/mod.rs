//! Guided-flow state reconstruction.
//!
//! Flow state is a *view*, never stored: every call re-derives it from a
//! bounded trailing window of the conversation's messages. Assistant messages
//! that ask a flow question carry a typed [`FlowTag`] stamped at write time,
//! so reconstruction does not depend on prompt wording.

mod hold;
mod profile;
mod registration;
mod states;
mod tag;
mod wizard;

pub use hold::{HoldFlow, HOLD_WINDOW};
pub use profile::{clean_answer, ProfileFields, ProfileFlow, PROFILE_WINDOW};
pub use registration::{RegistrationFlow, REGISTRATION_WINDOW};
pub use states::FlowStates;
pub use tag::{FlowTag, ProfileField};
pub use wizard::{
    WizardKey, WizardProgress, WizardQuestion, WIZARD_QUESTIONS, WIZARD_WINDOW,
};
