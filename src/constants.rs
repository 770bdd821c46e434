//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change the default upstream service, only edit this file.

/// Default upstream classification service URL
///
/// This is the fallback URL when no environment variable is set.
/// For development the service listens on http://localhost:8000
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default analytics refresh interval (seconds)
pub const DEFAULT_REFRESH_INTERVAL: u64 = 30;

/// Default HTTP request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Message surfaced when a rejected response carries no `detail`
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Rakshak";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get upstream base URL from environment or use default
pub fn get_api_url() -> String {
    std::env::var("RAKSHAK_API_URL")
        .ok()
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Get refresh interval from environment or use default
pub fn get_refresh_interval() -> u64 {
    std::env::var("RAKSHAK_REFRESH_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REFRESH_INTERVAL)
}

/// Get request timeout from environment or use default
pub fn get_request_timeout() -> u64 {
    std::env::var("RAKSHAK_REQUEST_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
}
