//! Intent detection over inbound message text.

mod classifier;
mod rules;

pub use classifier::{IntentClassifier, IntentFlags};
pub use rules::IntentKind;
