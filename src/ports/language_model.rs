//! Language-model port.
//!
//! Abstracts the chat-completion provider. The engine hands over an ordered
//! list of role-tagged messages plus the `finish` tool schema and gets back
//! either free text or a structured tool call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a chat message sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A role-tagged message in the model request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

/// Schema and metadata for a tool the model may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique tool name (e.g. "finish").
    pub name: String,
    /// Human-readable description for the model.
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Request for one model completion.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System instruction block.
    pub system_prompt: Option<String>,
    /// Conversation messages (context + history + current user message).
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Tools the model may call.
    pub tools: Vec<ToolSpec>,
}

impl ChatRequest {
    /// Creates an empty request.
    pub fn new() -> Self {
        Self {
            system_prompt: None,
            messages: Vec::new(),
            max_tokens: None,
            temperature: None,
            tools: Vec::new(),
        }
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Adds a message.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets the token ceiling.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Adds a tool the model may call.
    pub fn with_tool(mut self, tool: ToolSpec) -> Self {
        self.tools.push(tool);
        self
    }
}

impl Default for ChatRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// A structured tool call emitted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name the model invoked.
    pub name: String,
    /// Parsed arguments; `Value::Null` if the provider payload was garbled.
    pub arguments: serde_json::Value,
}

/// The model's reply: free text or one structured tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Text(String),
    ToolCall(ToolCall),
}

/// Language-model collaborator errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ModelError {
    /// Returns true if retrying later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelError::RateLimited { .. }
                | ModelError::Timeout { .. }
                | ModelError::Unavailable(_)
                | ModelError::Network(_)
        )
    }
}

/// Port for chat-completion providers.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generates one reply for the request.
    async fn respond(&self, request: ChatRequest) -> Result<ModelReply, ModelError>;
}
