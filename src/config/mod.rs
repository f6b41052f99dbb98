//! Application configuration.
//!
//! Type-safe configuration loaded from environment variables with the
//! `CAMPUS_ASSIST` prefix; nested values use `__` as separator
//! (`CAMPUS_ASSIST__SERVER__PORT=8080` -> `server.port`). A `.env` file is
//! honored in development.

mod ai;
mod error;
mod knowledge;
mod server;
mod storage;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use knowledge::KnowledgeConfig;
pub use server::{Environment, ServerConfig};
pub use storage::{StorageBackend, StorageConfig};

use serde::Deserialize;

use crate::domain::engine::EngineConfig;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Institution name used in prompts.
    #[serde(default = "default_school")]
    pub school: String,

    /// Server configuration (host, port, environment).
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration (backend selection, PostgreSQL connection).
    #[serde(default)]
    pub storage: StorageConfig,

    /// Language-model configuration.
    #[serde(default)]
    pub ai: AiConfig,

    /// Knowledge-base configuration.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CAMPUS_ASSIST")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.storage.validate()?;
        self.ai.validate()?;
        self.knowledge.validate()?;
        Ok(())
    }

    /// Check if running in production environment.
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Engine tunables derived from the ai/knowledge sections.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            model_timeout: self.ai.timeout(),
            search_timeout: self.knowledge.timeout(),
            top_k: self.knowledge.top_k,
            max_tokens: self.ai.max_tokens,
            temperature: self.ai.temperature,
            ..EngineConfig::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            school: default_school(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            ai: AiConfig::default(),
            knowledge: KnowledgeConfig::default(),
        }
    }
}

fn default_school() -> String {
    "the college".to_string()
}
