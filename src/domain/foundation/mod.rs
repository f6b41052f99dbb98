//! Foundation - shared value objects and error types.

mod errors;
mod ids;
mod sender;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ActionItemId, ConversationId, MessageId, OutcomeId, TriggerId};
pub use sender::SenderId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
