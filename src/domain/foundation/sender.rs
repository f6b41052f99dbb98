//! Sender identity value object.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Maximum accepted sender identifier length.
const MAX_SENDER_LEN: usize = 64;

/// Identity of the student on the other end of a conversation.
///
/// Usually an E.164 phone number (`+18475551234`); web chat sessions use a
/// virtual identifier (`web:<session>`). Opaque to the engine - it only keys
/// conversation ownership and profile lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SenderId(String);

impl SenderId {
    /// Creates a sender identity from a raw string.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the value is empty or whitespace
    /// - `TooLong` if the value exceeds 64 characters
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("sender"));
        }
        if trimmed.len() > MAX_SENDER_LEN {
            return Err(ValidationError::too_long("sender", MAX_SENDER_LEN));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
