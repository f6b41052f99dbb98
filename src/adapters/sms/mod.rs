//! Outbound delivery adapters.

mod log_sender;

pub use log_sender::LogSender;
