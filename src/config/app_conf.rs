use std::env;
use tracing::warn;

use crate::config::{parse_flag, ConfigError};

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// When true, writes on the activity and attendee surfaces without a bearer
    /// token are attributed to the `sistema` actor instead of being rejected.
    pub allow_anonymous_writes: bool,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = match env::var("APP_PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("APP_PORT: '{}'", raw)))?,
            Err(_) => 8080,
        };
        let allow_anonymous_writes = match env::var("APP_ALLOW_ANONYMOUS_WRITES") {
            Ok(raw) => parse_flag("APP_ALLOW_ANONYMOUS_WRITES", &raw)?,
            Err(_) => {
                warn!("APP_ALLOW_ANONYMOUS_WRITES not set, anonymous writes attributed to 'sistema'");
                true
            }
        };
        let cors_origins = env::var("APP_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(AppConfig { host, port, allow_anonymous_writes, cors_origins })
    }
}
