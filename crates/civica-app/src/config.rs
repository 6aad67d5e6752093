//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "CIVICA_DATA_DIR";

/// Configuration for the portal application stack.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Backend base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Directory for durable session and cache state.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Create a configuration with defaults for everything but the URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            data_dir: Self::default_data_dir(),
        }
    }

    /// Read the configuration from the environment:
    /// `CIVICA_API_BASE_URL` (required) and `CIVICA_DATA_DIR` (optional).
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(civica_client::BASE_URL_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", civica_client::BASE_URL_ENV)))?;
        let mut config = Self::new(base_url);
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Default data directory: the platform data dir, or the temp dir as
    /// a last resort.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("civica")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::new("http://localhost:8080");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.data_dir.ends_with("civica"));
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::new("http://localhost:8080")
            .with_timeout(Duration::from_secs(5))
            .with_data_dir("/tmp/x");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/x"));
    }
}
