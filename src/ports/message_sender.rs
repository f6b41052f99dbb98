//! Outbound message delivery port.
//!
//! Called by the inbound-surface layer once the engine returns a non-finish
//! reply; the engine itself never sends.

use async_trait::async_trait;

use crate::domain::foundation::SenderId;

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub success: bool,
    pub error: Option<String>,
}

impl DeliveryReceipt {
    /// A successful delivery.
    pub fn delivered() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed delivery with a reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Port for the outbound SMS/chat gateway.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Sends a text to a recipient. Never panics; failures come back in the
    /// receipt.
    async fn send(&self, to: &SenderId, text: &str) -> DeliveryReceipt;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_sender_is_object_safe() {
        fn _accepts_dyn(_sender: &dyn MessageSender) {}
    }

    #[test]
    fn receipt_constructors() {
        assert!(DeliveryReceipt::delivered().success);
        let failed = DeliveryReceipt::failed("number unreachable");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("number unreachable"));
    }
}
