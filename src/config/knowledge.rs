//! Knowledge-base configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Knowledge-base search configuration.
///
/// When no base URL is configured the service runs with an empty static
/// knowledge base; retrieval simply contributes nothing to the prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    /// Base URL of the vector-search service.
    pub base_url: Option<String>,

    /// Optional bearer token.
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Snippets requested per turn.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl KnowledgeConfig {
    /// Get timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if a search service is configured.
    pub fn has_search_service(&self) -> bool {
        self.base_url.as_ref().is_some_and(|u| !u.is_empty())
    }

    /// Validate knowledge-base configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref url) = self.base_url {
            if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidKnowledgeUrl);
            }
        }
        if self.timeout_secs == 0 || self.timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_timeout(),
            top_k: default_top_k(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_top_k() -> usize {
    3
}
