//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a conversation.
    ConversationId
}

uuid_id! {
    /// Unique identifier for a message within a conversation.
    MessageId
}

uuid_id! {
    /// Unique identifier for an outreach trigger.
    TriggerId
}

uuid_id! {
    /// Unique identifier for a conversation outcome record.
    OutcomeId
}

uuid_id! {
    /// Unique identifier for an action item.
    ActionItemId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_unique_values() {
        assert_ne!(ConversationId::new(), ConversationId::new());
        assert_ne!(MessageId::new(), MessageId::new());
    }

    #[test]
    fn parses_from_valid_string() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: ConversationId = uuid_str.parse().unwrap();
        assert_eq!(id.to_string(), uuid_str);
    }

    #[test]
    fn rejects_invalid_string() {
        assert!("not-a-uuid".parse::<ConversationId>().is_err());
    }

    #[test]
    fn from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = OutcomeId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn serializes_transparently() {
        let id = TriggerId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
