//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the
//! `DEBATE_ARENA` prefix and nested values use double underscores as
//! separators.
//!
//! # Example
//!
//! ```no_run
//! use debate_arena::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod server;
mod store;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, timeouts, static assets)
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Conversation store configuration
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present (for development)
    /// 2. Reads environment variables with the `DEBATE_ARENA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DEBATE_ARENA__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `DEBATE_ARENA__AI__API_KEY=...` -> `ai.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the
    /// expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DEBATE_ARENA")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.store.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("DEBATE_ARENA__SERVER__PORT");
        env::remove_var("DEBATE_ARENA__AI__PROVIDER");
        env::remove_var("DEBATE_ARENA__AI__API_KEY");
        env::remove_var("DEBATE_ARENA__STORE__BACKEND");
        env::remove_var("DEBATE_ARENA__STORE__URL");
    }

    #[test]
    fn loads_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.ai.provider, AiProvider::Openai);
        assert_eq!(config.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn reads_nested_values_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DEBATE_ARENA__SERVER__PORT", "3000");
        env::set_var("DEBATE_ARENA__AI__PROVIDER", "mock");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ai.provider, AiProvider::Mock);
    }

    #[test]
    fn mock_provider_with_defaults_validates() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("DEBATE_ARENA__AI__PROVIDER", "mock");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }
}
