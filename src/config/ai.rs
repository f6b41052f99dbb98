//! Language-model configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Language-model configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key.
    pub openai_api_key: Option<String>,

    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds; the latency-critical path.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Token ceiling for generated replies.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl AiConfig {
    /// Get timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate language-model configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    500
}

fn default_temperature() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_the_small_model() {
        let config = AiConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_key_fails_validation() {
        assert!(AiConfig::default().validate().is_err());
    }

    #[test]
    fn valid_config_passes() {
        let config = AiConfig {
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn temperature_is_bounded() {
        let config = AiConfig {
            openai_api_key: Some("sk-xxx".to_string()),
            temperature: 3.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTemperature)
        ));
    }
}
