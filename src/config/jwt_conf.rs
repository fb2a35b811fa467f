use std::env;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

const MIN_SECRET_LEN: usize = 32;

/// JWT configuration structure
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens
    pub jwt_secret: String,
    /// Access token expiration time in minutes
    pub access_token_expiration: i64,
    /// Refresh token expiration time in minutes
    pub refresh_token_expiration: i64,
    /// JWT issuer (optional)
    pub jwt_issuer: Option<String>,
    /// JWT audience (optional)
    pub jwt_audience: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables
    ///
    /// Expected environment variables:
    /// - JWT_SECRET: Secret key for signing JWT tokens (required, >= 32 chars)
    /// - JWT_ACCESS_TOKEN_EXPIRY: Access token expiration in minutes (defaults to 480, one working day)
    /// - JWT_REFRESH_TOKEN_EXPIRY: Refresh token expiration in minutes (defaults to 10080 = 1 week)
    /// - JWT_ISSUER / JWT_AUDIENCE: optional claims
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from environment variables");
        Self::load("")
    }

    /// Same as [`JwtConfig::from_env`] but reading `TEST_`-prefixed variables.
    pub fn from_test_env() -> Result<Self, ConfigError> {
        info!("Loading JWT configuration from test environment variables");
        Self::load("TEST_")
    }

    fn load(prefix: &str) -> Result<Self, ConfigError> {
        let var = |name: &str| format!("{}{}", prefix, name);

        let jwt_secret = env::var(var("JWT_SECRET")).map_err(|_| {
            error!("{} environment variable not found", var("JWT_SECRET"));
            ConfigError::EnvVarNotFound(var("JWT_SECRET"))
        })?;
        debug!("JWT secret loaded (length: {} chars)", jwt_secret.len());

        let access_token_expiration = read_minutes(&var("JWT_ACCESS_TOKEN_EXPIRY"), 480)?;
        let refresh_token_expiration = read_minutes(&var("JWT_REFRESH_TOKEN_EXPIRY"), 10080)?;

        let config = JwtConfig {
            jwt_secret,
            access_token_expiration,
            refresh_token_expiration,
            jwt_issuer: env::var(var("JWT_ISSUER")).ok(),
            jwt_audience: env::var(var("JWT_AUDIENCE")).ok(),
        };

        config.validate()?;
        info!("JWT configuration loaded successfully");
        Ok(config)
    }

    /// Validate the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            error!("JWT secret is too short (minimum {} characters required)", MIN_SECRET_LEN);
            return Err(ConfigError::ValidationError(format!(
                "JWT secret must be at least {} characters long",
                MIN_SECRET_LEN
            )));
        }

        if self.access_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Access token expiration must be greater than 0".to_string()));
        }

        if self.refresh_token_expiration <= 0 {
            return Err(ConfigError::ValidationError("Refresh token expiration must be greater than 0".to_string()));
        }

        if self.access_token_expiration >= self.refresh_token_expiration {
            warn!("Access token expiration is greater than or equal to refresh token expiration");
        }

        Ok(())
    }
}

fn read_minutes(name: &str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.parse::<i64>().map_err(|e| {
            error!("Invalid {} value: {}", name, e);
            ConfigError::InvalidValue(format!("{}: {}", name, e))
        }),
        Err(_) => {
            warn!("{} not set, using default: {} minutes", name, default);
            Ok(default)
        }
    }
}

/// Create JWT configuration for testing with default values
impl Default for JwtConfig {
    fn default() -> Self {
        JwtConfig {
            jwt_secret: "test_secret_key_for_jwt_testing_should_be_long_enough_for_security_purposes".to_string(),
            access_token_expiration: 480,
            refresh_token_expiration: 10080,
            jwt_issuer: Some("redinclusion-backend-test".to_string()),
            jwt_audience: Some("redinclusion-backend-users".to_string()),
        }
    }
}
