//! Detection API Client
//!
//! HTTP client for the upstream classification service. One request per
//! call, no retry, no caching.

use std::time::Duration;

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::types::{
    require_text, ErrorResponse, HealthResponse, JobPosting, MessageRequest, ModelStatusResponse,
    UrlRequest,
};
use crate::config::Config;
use crate::constants::GENERIC_SERVER_ERROR;
use crate::error::{DetectionError, DetectionResult};
use crate::logic::analytics::AnalyticsSnapshot;
use crate::logic::scan::{normalize_job, normalize_message, normalize_url, ScanOutcome};

/// Detection API client
#[derive(Debug, Clone)]
pub struct DetectionClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl DetectionClient {
    /// Create a client from runtime configuration
    pub fn new(config: &Config) -> DetectionResult<Self> {
        Self::with_timeout(config.api_url.clone(), config.request_timeout())
    }

    /// Create a client for `base_url` with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> DetectionResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DetectionError::Unreachable(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // CLASSIFICATION
    // ========================================================================

    /// Classify a text message (scam / not scam)
    pub async fn detect_message(&self, text: &str) -> DetectionResult<ScanOutcome> {
        let message = require_text("message", text)?;
        let body = self.post_json("/detect-message", &MessageRequest { message }).await?;
        normalize_message(&body)
    }

    /// Classify a URL (phishing / not phishing)
    pub async fn scan_url(&self, url: &str) -> DetectionResult<ScanOutcome> {
        let url = require_text("url", url)?;
        let body = self.post_json("/scan-url", &UrlRequest { url }).await?;
        normalize_url(&body)
    }

    /// Classify a job posting (fake / legit)
    pub async fn detect_job(&self, posting: &JobPosting) -> DetectionResult<ScanOutcome> {
        posting.validate()?;
        let body = self.post_json("/detect-job", posting).await?;
        normalize_job(&body)
    }

    // ========================================================================
    // ANALYTICS & STATUS
    // ========================================================================

    /// Fetch the current analytics snapshot
    pub async fn fetch_analytics(&self) -> DetectionResult<AnalyticsSnapshot> {
        let body = self.get_json("/analytics").await?;
        let snapshot = AnalyticsSnapshot::from_json(body)?;

        if let Some(drift) = snapshot.detection_rate_drift() {
            log::debug!(
                "Upstream detection rate {} differs from counts by {:.1} points",
                snapshot.detection_rate,
                drift
            );
        }
        Ok(snapshot)
    }

    /// Check server health
    pub async fn health(&self) -> DetectionResult<HealthResponse> {
        let body = self.get_json("/health").await?;
        decode("health", body)
    }

    /// Which classifier models the service has loaded
    pub async fn model_status(&self) -> DetectionResult<ModelStatusResponse> {
        let body = self.get_json("/model-status").await?;
        decode("model status", body)
    }

    // ========================================================================
    // TRANSPORT
    // ========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> DetectionResult<Value> {
        log::debug!("POST {}", path);
        let response = self.http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| unreachable(path, e))?;

        read_body(path, response).await
    }

    async fn get_json(&self, path: &str) -> DetectionResult<Value> {
        log::debug!("GET {}", path);
        let response = self.http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| unreachable(path, e))?;

        read_body(path, response).await
    }
}

fn unreachable(path: &str, err: reqwest::Error) -> DetectionError {
    let reason = if err.is_timeout() {
        format!("request to {} timed out", path)
    } else {
        format!("request to {} failed: {}", path, err)
    };
    log::warn!("{}", reason);
    DetectionError::Unreachable(reason)
}

async fn read_body(path: &str, response: Response) -> DetectionResult<Value> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| unreachable(path, e))?;

    if !status.is_success() {
        let message = rejection_message(&bytes);
        log::warn!("{} rejected ({}): {}", path, status.as_u16(), message);
        return Err(DetectionError::UpstreamRejected {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&bytes).map_err(|e| {
        log::warn!("{} returned an unreadable body: {}", path, e);
        DetectionError::MalformedResponse(format!("{}: {}", path, e))
    })
}

/// The `detail` string of an error body, else the generic message
fn rejection_message(bytes: &[u8]) -> String {
    serde_json::from_slice::<ErrorResponse>(bytes)
        .ok()
        .and_then(|err| match err.detail {
            Some(Value::String(detail)) if !detail.is_empty() => Some(detail),
            _ => None,
        })
        .unwrap_or_else(|| GENERIC_SERVER_ERROR.to_string())
}

fn decode<T: DeserializeOwned>(what: &str, body: Value) -> DetectionResult<T> {
    serde_json::from_value(body)
        .map_err(|e| DetectionError::MalformedResponse(format!("{}: {}", what, e)))
}
