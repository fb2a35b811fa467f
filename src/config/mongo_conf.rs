use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Connection settings for the single database backing every collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upper bound of the driver's connection pool
    pub pool_size: u32,
    /// Applied to both connect and server selection
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Reads `MONGO_URI` and `MONGO_DATABASE` (required), optional
    /// `MONGO_USERNAME`/`MONGO_PASSWORD`, `MONGO_POOL_SIZE` (10) and
    /// `MONGO_CONNECTION_TIMEOUT` in seconds (5).
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let config = MongoConfig {
            uri: required("MONGO_URI")?,
            database: required("MONGO_DATABASE")?,
            username: env::var("MONGO_USERNAME").ok(),
            password: env::var("MONGO_PASSWORD").ok(),
            pool_size: number_or("MONGO_POOL_SIZE", 10)?,
            connection_timeout_secs: number_or("MONGO_CONNECTION_TIMEOUT", 5)?,
        };
        debug!(
            "MongoDB database '{}' (credentials: {})",
            config.database,
            if config.username.is_some() { "yes" } else { "no" }
        );

        config.validate()?;
        Ok(config)
    }

    /// Local settings used by tests that need a config value without touching the environment.
    pub fn from_test_env() -> Self {
        MongoConfig {
            database: "redinclusion_test".to_string(),
            pool_size: 2,
            connection_timeout_secs: 2,
            ..MongoConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.uri.trim().is_empty() {
            Some("MongoDB URI cannot be empty")
        } else if self.database.trim().is_empty() {
            Some("MongoDB database cannot be empty")
        } else if self.pool_size == 0 {
            Some("MongoDB pool size must be greater than 0")
        } else if self.connection_timeout_secs == 0 {
            Some("MongoDB connection timeout must be greater than 0")
        } else if self.username.as_deref() == Some("") || self.password.as_deref() == Some("") {
            Some("MongoDB credentials cannot be empty when set")
        } else {
            None
        };

        match problem {
            Some(msg) => {
                error!("{}", msg);
                Err(ConfigError::ValidationError(msg.to_string()))
            }
            None => Ok(()),
        }
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| {
        error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

fn number_or<T: FromStr + std::fmt::Display>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| {
            error!("Invalid {} value: '{}'", name, raw);
            ConfigError::InvalidValue(format!("{}: '{}'", name, raw))
        }),
        Err(_) => {
            warn!("{} not set, using default: {}", name, default);
            Ok(default)
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "redinclusion".to_string(),
            username: None,
            password: None,
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
