//! Conversation store configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Which conversation store backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map. Single-server; logs do not survive restarts.
    #[default]
    Memory,
    /// Redis-backed store for production deployments.
    Redis,
}

/// Conversation store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Backend selection
    #[serde(default)]
    pub backend: StoreBackend,

    /// Redis connection URL (redis backend only)
    #[serde(default = "default_url")]
    pub url: String,

    /// TTL applied to session keys in Redis, in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl StoreConfig {
    /// Validate store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StoreBackend::Redis
            && !(self.url.starts_with("redis://") || self.url.starts_with("rediss://"))
        {
            return Err(ValidationError::InvalidStoreUrl);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_url(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_ttl_secs() -> u64 {
    86_400
}
