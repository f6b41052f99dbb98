//! Conversation orchestration.

#[allow(clippy::module_inception)]
mod engine;

pub use engine::{ConversationEngine, EngineAction, EngineConfig, EngineReply};
