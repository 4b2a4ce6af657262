// ABOUTME: Configuration loading and validation for the easyads client.
// ABOUTME: Reads the API base URL and client home directory from environment variables.

use std::path::PathBuf;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("EASYADS_API_URL is not an absolute http(s) URL: {0}")]
    InvalidApiUrl(String),
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub home: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - EASYADS_API_URL: backend base URL (default: http://localhost:8000)
    /// - EASYADS_HOME: client storage directory (default: ~/.easyads)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("EASYADS_API_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let home = std::env::var("EASYADS_HOME")
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("/tmp"))
                    .join(".easyads")
            });

        Self::new(&api_url, home)
    }

    /// Build a configuration from explicit values.
    pub fn new(api_url: &str, home: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            home,
        })
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidApiUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidApiUrl(raw.to_string()));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serialize all tests that read/write env vars to prevent race conditions.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn config_loads_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: test-only code, env access serialized by ENV_MUTEX
        unsafe {
            std::env::remove_var("EASYADS_API_URL");
            std::env::remove_var("EASYADS_HOME");
        }

        let config = ClientConfig::from_env().unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:8000/");
        assert!(config.home.to_string_lossy().contains(".easyads"));
    }

    #[test]
    fn config_reads_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        // SAFETY: test-only code, env access serialized by ENV_MUTEX
        unsafe {
            std::env::set_var("EASYADS_API_URL", "https://ads.example.com/api");
            std::env::set_var("EASYADS_HOME", "/var/lib/easyads-test");
        }

        let config = ClientConfig::from_env();

        // SAFETY: test-only code, env access serialized by ENV_MUTEX
        unsafe {
            std::env::remove_var("EASYADS_API_URL");
            std::env::remove_var("EASYADS_HOME");
        }

        let config = config.unwrap();
        assert_eq!(config.api_url.host_str(), Some("ads.example.com"));
        assert_eq!(config.home, PathBuf::from("/var/lib/easyads-test"));
    }

    #[test]
    fn config_rejects_non_http_url() {
        for raw in ["ftp://example.com", "not a url", "localhost:8000"] {
            let err = ClientConfig::new(raw, PathBuf::from("/tmp/x")).unwrap_err();
            assert!(
                err.to_string().contains("EASYADS_API_URL"),
                "error should name the variable: {}",
                err
            );
        }
    }
}
