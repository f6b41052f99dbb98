//! Use-case handlers.

mod process_inbound;
mod start_trigger;

pub use process_inbound::{InboundReply, ProcessInboundCommand, ProcessInboundHandler};
pub use start_trigger::{
    StartTriggerCommand, StartTriggerError, StartTriggerHandler, TriggerStarted,
};
