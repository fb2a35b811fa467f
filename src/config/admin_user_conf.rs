use std::env;
use serde::{Serialize, Deserialize};
use crate::config::ConfigError;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@redinclusion.com";

/// Account provisioned at startup when no staff member owns `email`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub nombre: String,
    pub secretaria: String,
    pub email: String,
    pub password: String,
}

impl AdminUserConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AdminUserConfig {
            nombre: env::var("ADMIN_NOMBRE").unwrap_or_else(|_| "Administrador".to_string()),
            secretaria: env::var("ADMIN_SECRETARIA").unwrap_or_else(|_| "Administración General".to_string()),
            email: env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string()),
            password: env::var("ADMIN_PASSWORD").map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?,
        })
    }
}
