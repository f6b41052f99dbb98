//! OpenAI chat-completions adapter.
//!
//! Non-streaming client for the chat-completions API with legacy function
//! calling, which is how the `finish` signal reaches the model. The engine
//! owns the timeout and never retries a model call, so this adapter performs
//! exactly one request per `respond`.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    ChatRequest, ChatRole, LanguageModel, ModelError, ModelReply, ToolCall,
};

/// Configuration for the OpenAI adapter.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat-completions provider.
pub struct OpenAiModel {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiModel {
    /// Creates a new provider with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::InvalidRequest(format!("HTTP client build failed: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    fn to_api_request(&self, request: &ChatRequest) -> ApiRequest {
        let mut messages = Vec::new();

        if let Some(ref prompt) = request.system_prompt {
            messages.push(ApiMessage {
                role: "system".to_string(),
                content: Some(prompt.clone()),
                function_call: None,
            });
        }

        for msg in &request.messages {
            messages.push(ApiMessage {
                role: match msg.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                }
                .to_string(),
                content: Some(msg.content.clone()),
                function_call: None,
            });
        }

        let functions: Vec<ApiFunction> = request
            .tools
            .iter()
            .map(|tool| ApiFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            })
            .collect();
        let function_call = if functions.is_empty() {
            None
        } else {
            Some("auto".to_string())
        };

        ApiRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            functions: if functions.is_empty() {
                None
            } else {
                Some(functions)
            },
            function_call,
        }
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, ModelError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            401 => Err(ModelError::AuthenticationFailed),
            429 => Err(ModelError::RateLimited {
                retry_after_secs: parse_retry_after(&error_body),
            }),
            400 => Err(ModelError::InvalidRequest(error_body)),
            500..=599 => Err(ModelError::Unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(ModelError::Network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    async fn respond(&self, request: ChatRequest) -> Result<ModelReply, ModelError> {
        let api_request = self.to_api_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ModelError::Network(format!("Connection failed: {}", e))
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;
        let response = self.handle_response_status(response).await?;

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(format!("Failed to parse response: {}", e)))?;

        reply_from_response(api_response)
    }
}

/// Converts the provider payload into a [`ModelReply`].
///
/// A garbled `arguments` string on a function call becomes `Value::Null`
/// rather than an error; the completion interpreter downgrades that to a
/// continuation.
fn reply_from_response(response: ApiResponse) -> Result<ModelReply, ModelError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::Parse("No choices in response".to_string()))?;

    if let Some(call) = choice.message.function_call {
        let arguments = serde_json::from_str(&call.arguments)
            .unwrap_or(serde_json::Value::Null);
        return Ok(ModelReply::ToolCall(ToolCall {
            name: call.name,
            arguments,
        }));
    }

    Ok(ModelReply::Text(choice.message.content.unwrap_or_default()))
}

/// Pulls a retry hint out of the rate-limit error body, defaulting to 30s.
fn parse_retry_after(error_body: &str) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(s) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = s.find("try again in ") {
                let rest = &s[idx + 13..];
                if let Some(num_end) = rest.find(|c: char| !c.is_ascii_digit()) {
                    if let Ok(secs) = rest[..num_end].parse::<u32>() {
                        return secs;
                    }
                }
            }
        }
    }
    30
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    functions: Option<Vec<ApiFunction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<String>,
}

#[derive(Debug, Serialize)]
struct ApiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}
