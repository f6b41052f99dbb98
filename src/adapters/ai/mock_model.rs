//! Mock language model for tests.
//!
//! Scripted replies consumed in order, plus call capture so tests can assert
//! on the prompts the engine actually built.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{ChatRequest, LanguageModel, ModelError, ModelReply, ToolCall};

/// A scripted reply the mock will produce.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return free text.
    Text(String),
    /// Return a structured tool call.
    ToolCall { name: String, arguments: serde_json::Value },
    /// Return an error.
    Error(ModelError),
}

/// Scripted language model.
///
/// Replies are consumed front to back; an exhausted queue yields
/// `ModelError::Unavailable` so a test that under-scripts fails loudly.
#[derive(Debug, Clone, Default)]
pub struct MockModel {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a free-text reply.
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.push(MockReply::Text(content.into()));
        self
    }

    /// Queues a `finish` tool call with the given result type.
    pub fn with_finish(self, result_type: &str) -> Self {
        self.push(MockReply::ToolCall {
            name: "finish".to_string(),
            arguments: serde_json::json!({ "result_type": result_type }),
        });
        self
    }

    /// Queues an arbitrary tool call.
    pub fn with_tool_call(self, name: impl Into<String>, arguments: serde_json::Value) -> Self {
        self.push(MockReply::ToolCall {
            name: name.into(),
            arguments,
        });
        self
    }

    /// Queues an error reply.
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(MockReply::Error(error));
        self
    }

    /// Returns every request the mock has received.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().expect("mock lock").clone()
    }

    /// Returns the most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().expect("mock lock").last().cloned()
    }

    fn push(&self, reply: MockReply) {
        self.replies.lock().expect("mock lock").push_back(reply);
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn respond(&self, request: ChatRequest) -> Result<ModelReply, ModelError> {
        self.requests.lock().expect("mock lock").push(request);

        let reply = self.replies.lock().expect("mock lock").pop_front();
        match reply {
            Some(MockReply::Text(content)) => Ok(ModelReply::Text(content)),
            Some(MockReply::ToolCall { name, arguments }) => {
                Ok(ModelReply::ToolCall(ToolCall { name, arguments }))
            }
            Some(MockReply::Error(error)) => Err(error),
            None => Err(ModelError::Unavailable(
                "no scripted reply remaining".to_string(),
            )),
        }
    }
}
