//! Delivery stub that logs outbound messages.
//!
//! The real SMS gateway lives outside this repository; this adapter records
//! what would have been sent so development and tests can observe outbound
//! traffic.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::SenderId;
use crate::ports::{DeliveryReceipt, MessageSender};

/// A recorded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: SenderId,
    pub text: String,
}

/// Logging delivery stub. Every send succeeds.
#[derive(Debug, Default)]
pub struct LogSender {
    sent: Mutex<Vec<SentMessage>>,
}

impl LogSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every message recorded so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("sender lock").clone()
    }
}

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, to: &SenderId, text: &str) -> DeliveryReceipt {
        info!(to = %to, chars = text.len(), "outbound message");
        self.sent.lock().expect("sender lock").push(SentMessage {
            to: to.clone(),
            text: text.to_string(),
        });
        DeliveryReceipt::delivered()
    }
}
