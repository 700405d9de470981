//! Server configuration.

use std::{env, path::PathBuf};

use auth::DEFAULT_JWT_EXPIRATION_HOURS;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Secret for signing access tokens.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Log level.
    pub log_level: String,
    /// CSV file with `part1,part2,part3` lines loaded into an empty zone table.
    pub zones_file: Option<PathBuf>,
}

impl Config {
    /// Creates a configuration with defaults and the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            log_level: "info".to_string(),
            zones_file: None,
        }
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = env::var("STUDYHUB_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("STUDYHUB_JWT_SECRET is required"))?;

        Ok(Self {
            host: env::var("STUDYHUB_SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("STUDYHUB_SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_secret,
            jwt_expiration_hours: env::var("STUDYHUB_JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            log_level: env::var("STUDYHUB_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            zones_file: env::var("STUDYHUB_ZONES_FILE").ok().map(PathBuf::from),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
