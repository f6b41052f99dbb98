//! Finish-signal interpretation.
//!
//! Decides between two outcomes for every model reply: an explicit, typed
//! finish declaration, or a continuation carrying assistant text. The
//! interpreter only classifies - the orchestrator owns the resulting
//! storage writes.

use crate::domain::conversation::ResultType;
use crate::ports::{ModelReply, ToolCall};

use super::actions::extract_action_items;

/// Fallback text when the model returns nothing usable.
const EMPTY_REPLY_FALLBACK: &str =
    "I'm sorry, I didn't understand that. Could you rephrase?";

/// What the model's reply means for the conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    /// The model declared a terminal outcome.
    Finish {
        result_type: ResultType,
        metadata: Option<serde_json::Value>,
    },
    /// Ordinary assistant text, with any action items worth tracking.
    Continuation {
        text: String,
        action_items: Vec<String>,
    },
}

/// Interprets model replies into finish signals or continuations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletionInterpreter;

impl CompletionInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Classifies one model reply.
    ///
    /// A tool call named `finish` with a valid `result_type` becomes a
    /// [`Interpretation::Finish`]. Anything malformed - wrong tool name,
    /// missing or unknown result type, garbled arguments - falls through to
    /// continuation handling instead of failing the turn.
    pub fn interpret(&self, reply: ModelReply) -> Interpretation {
        match reply {
            ModelReply::ToolCall(call) => match parse_finish(&call) {
                Some((result_type, metadata)) => Interpretation::Finish {
                    result_type,
                    metadata,
                },
                None => {
                    tracing::warn!(
                        tool = %call.name,
                        "malformed finish call, treating as continuation"
                    );
                    Interpretation::Continuation {
                        text: EMPTY_REPLY_FALLBACK.to_string(),
                        action_items: Vec::new(),
                    }
                }
            },
            ModelReply::Text(text) => {
                let text = if text.trim().is_empty() {
                    EMPTY_REPLY_FALLBACK.to_string()
                } else {
                    text
                };
                let action_items = extract_action_items(&text);
                Interpretation::Continuation { text, action_items }
            }
        }
    }
}

fn parse_finish(call: &ToolCall) -> Option<(ResultType, Option<serde_json::Value>)> {
    if call.name != "finish" {
        return None;
    }
    let result_type = call
        .arguments
        .get("result_type")?
        .as_str()?
        .parse::<ResultType>()
        .ok()?;
    let metadata = call
        .arguments
        .get("metadata")
        .filter(|m| !m.is_null())
        .cloned();
    Some((result_type, metadata))
}
