//! Server configuration loaded from environment variables

use formtrap_common::HoneypotConfig;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Host to bind to
    pub host: String,

    /// Public port for form pages and the admin API
    pub port: u16,

    /// JSON file with form page definitions (demo form when unset)
    pub forms_file: Option<PathBuf>,

    /// Bearer token for the admin API (admin API disabled when unset)
    pub admin_token: Option<String>,

    /// Honeypot field names and minimum fill time
    pub honeypot: HoneypotConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            forms_file: env::var("FORMS_FILE")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|token| !token.is_empty()),
            honeypot: HoneypotConfig::from_env(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            forms_file: None,
            admin_token: None,
            honeypot: HoneypotConfig::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
}
