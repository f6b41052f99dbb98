//! The `finish` tool schema handed to the language model.

use crate::domain::conversation::ResultType;
use crate::ports::ToolSpec;

/// Builds the `finish` tool definition.
///
/// The model calls this exactly once, when the conversation has reached a
/// terminal outcome; the orchestrator performs the resulting storage write.
pub fn finish_tool() -> ToolSpec {
    let result_types: Vec<&str> = ResultType::ALL.iter().map(|rt| rt.as_str()).collect();
    ToolSpec::new(
        "finish",
        "Call this function when the conversation is complete or resolved",
        serde_json::json!({
            "type": "object",
            "properties": {
                "result_type": {
                    "type": "string",
                    "enum": result_types,
                    "description": "Type of result"
                },
                "metadata": {
                    "type": "object",
                    "description": "Additional information about the result"
                }
            },
            "required": ["result_type"]
        }),
    )
}
