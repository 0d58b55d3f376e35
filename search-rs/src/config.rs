use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_addr: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Base URL of the Custom Search JSON API
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// API key (overridable via GOOGLE_API_KEY)
    #[serde(default)]
    pub api_key: String,
    /// Search engine identifier (overridable via GOOGLE_CX)
    #[serde(default)]
    pub engine_id: String,
    /// Per-page request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Token lifetime in hours
    #[serde(default = "default_token_expiration")]
    pub token_expiration_hours: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

fn default_upstream_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_token_expiration() -> u64 {
    168
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SearchError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| SearchError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default development configuration
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                listen_addr: "0.0.0.0:5000".to_string(),
            },
            upstream: UpstreamConfig {
                base_url: default_upstream_base_url(),
                api_key: String::new(),
                engine_id: String::new(),
                timeout_seconds: default_upstream_timeout(),
            },
            storage: StorageConfig {
                database_url: "sqlite:///tmp/search.db".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: "change-me-in-production".to_string(),
                token_expiration_hours: default_token_expiration(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(SearchError::Config(format!(
                "Invalid upstream base URL: {}",
                self.upstream.base_url
            )));
        }

        if self.upstream.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "upstream.timeout_seconds must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::development()
    }
}
