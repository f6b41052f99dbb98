//! Terminal conversation outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{ConversationId, OutcomeId, SenderId, Timestamp};

/// How a conversation ended.
///
/// Closed enum; the language model declares one of these through the `finish`
/// tool and nothing else is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    /// Student completed payment.
    Paid,
    /// Student completed registration.
    Registered,
    /// Issue was resolved.
    Resolved,
    /// Reminder was successfully delivered.
    ReminderSent,
    /// Case needs human intervention.
    Escalated,
    /// Student didn't respond.
    NoResponse,
    /// Conversation was abandoned.
    Abandoned,
}

impl ResultType {
    /// All result types, in declaration order.
    pub const ALL: [ResultType; 7] = [
        ResultType::Paid,
        ResultType::Registered,
        ResultType::Resolved,
        ResultType::ReminderSent,
        ResultType::Escalated,
        ResultType::NoResponse,
        ResultType::Abandoned,
    ];

    /// Returns the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Paid => "paid",
            ResultType::Registered => "registered",
            ResultType::Resolved => "resolved",
            ResultType::ReminderSent => "reminder_sent",
            ResultType::Escalated => "escalated",
            ResultType::NoResponse => "no_response",
            ResultType::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = UnknownResultType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paid" => Ok(ResultType::Paid),
            "registered" => Ok(ResultType::Registered),
            "resolved" => Ok(ResultType::Resolved),
            "reminder_sent" => Ok(ResultType::ReminderSent),
            "escalated" => Ok(ResultType::Escalated),
            "no_response" => Ok(ResultType::NoResponse),
            "abandoned" => Ok(ResultType::Abandoned),
            other => Err(UnknownResultType(other.to_string())),
        }
    }
}

/// Error returned for a result type outside the closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown result type: {0}")]
pub struct UnknownResultType(pub String);

/// Terminal outcome record, linked to exactly one conversation.
///
/// Created once per conversation closure. The conversation's transition to
/// `Completed` must be atomic with outcome creation as seen by any reader -
/// the storage layer performs both in a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    id: OutcomeId,
    conversation_id: ConversationId,
    result_type: ResultType,
    sender: Option<SenderId>,
    metadata: Option<serde_json::Value>,
    created_at: Timestamp,
}

impl Outcome {
    /// Creates an outcome for a conversation.
    pub fn new(
        conversation_id: ConversationId,
        result_type: ResultType,
        sender: Option<SenderId>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: OutcomeId::new(),
            conversation_id,
            result_type,
            sender,
            metadata,
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitutes an outcome from persistence.
    pub fn reconstitute(
        id: OutcomeId,
        conversation_id: ConversationId,
        result_type: ResultType,
        sender: Option<SenderId>,
        metadata: Option<serde_json::Value>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            conversation_id,
            result_type,
            sender,
            metadata,
            created_at,
        }
    }

    pub fn id(&self) -> &OutcomeId {
        &self.id
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn result_type(&self) -> ResultType {
        self.result_type
    }

    pub fn sender(&self) -> Option<&SenderId> {
        self.sender.as_ref()
    }

    pub fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_type_round_trips_through_str() {
        for rt in ResultType::ALL {
            assert_eq!(rt.as_str().parse::<ResultType>().unwrap(), rt);
        }
    }

    #[test]
    fn unknown_result_type_is_rejected() {
        let err = "solved".parse::<ResultType>().unwrap_err();
        assert_eq!(err.0, "solved");
    }

    #[test]
    fn result_type_serializes_to_snake_case() {
        assert_eq!(
            serde_json::to_string(&ResultType::ReminderSent).unwrap(),
            "\"reminder_sent\""
        );
        assert_eq!(
            serde_json::to_string(&ResultType::NoResponse).unwrap(),
            "\"no_response\""
        );
    }

    #[test]
    fn outcome_links_to_conversation() {
        let conv_id = ConversationId::new();
        let outcome = Outcome::new(
            conv_id,
            ResultType::Paid,
            Some(SenderId::new("+18475551234").unwrap()),
            Some(serde_json::json!({"amount": 1500})),
        );

        assert_eq!(outcome.conversation_id(), conv_id);
        assert_eq!(outcome.result_type(), ResultType::Paid);
        assert_eq!(outcome.metadata().unwrap()["amount"], 1500);
    }
}
