//! Configuration module

use std::time::Duration;

use crate::constants;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream classification service base URL (no trailing slash)
    pub api_url: String,

    /// Analytics refresh interval in seconds
    pub refresh_interval_secs: u64,

    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: constants::DEFAULT_API_URL.to_string(),
            refresh_interval_secs: constants::DEFAULT_REFRESH_INTERVAL,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            api_url: constants::get_api_url(),
            refresh_interval_secs: constants::get_refresh_interval(),
            request_timeout_secs: constants::get_request_timeout(),
        }
    }

    /// Override the upstream base URL
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
