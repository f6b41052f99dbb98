//! Storage configuration.

use serde::Deserialize;

use super::error::ValidationError;

/// Which conversation-store implementation to run.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL-backed store.
    Postgres,
    /// In-memory store (development, tests, degraded operation).
    #[default]
    Memory,
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// PostgreSQL connection URL; required for the postgres backend.
    pub database_url: Option<String>,

    /// Connection pool ceiling.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::Postgres {
            match self.database_url.as_deref() {
                None | Some("") => return Err(ValidationError::MissingRequired("DATABASE_URL")),
                Some(url) if !url.starts_with("postgres://") && !url.starts_with("postgresql://") => {
                    return Err(ValidationError::InvalidDatabaseUrl)
                }
                _ => {}
            }
        }
        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_needs_no_url() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 10,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn postgres_backend_requires_url() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            database_url: None,
            max_connections: 10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn postgres_url_scheme_is_checked() {
        let config = StorageConfig {
            backend: StorageBackend::Postgres,
            database_url: Some("mysql://localhost/campus".to_string()),
            max_connections: 10,
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn pool_size_is_bounded() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            database_url: None,
            max_connections: 200,
        };
        assert!(config.validate().is_err());
    }
}
