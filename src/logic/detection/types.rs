//! Request/Response types for the upstream classification service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, DetectionResult};
use crate::logic::ordered_map::OrderedMap;
use crate::logic::scan::timestamp;

// ============================================================================
// REQUESTS
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub message: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UrlRequest<'a> {
    pub url: &'a str,
}

/// Job posting form; every field may be left empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company_profile: String,
    pub description: String,
    pub requirements: String,
    pub benefits: String,
}

impl JobPosting {
    /// At least one of title/description must carry text
    pub fn validate(&self) -> DetectionResult<()> {
        if self.title.trim().is_empty() && self.description.trim().is_empty() {
            return Err(DetectionError::InvalidInput(
                "job posting needs a title or a description".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reject blank free-text input before any request is made
pub fn require_text<'a>(field: &str, value: &'a str) -> DetectionResult<&'a str> {
    if value.trim().is_empty() {
        Err(DetectionError::InvalidInput(format!("{} cannot be empty", field)))
    } else {
        Ok(value)
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub detail: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub models_loaded: u64,
    #[serde(default, with = "timestamp::flexible_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub name: String,
    pub loaded: bool,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatusResponse {
    pub models: OrderedMap<ModelStatus>,
    #[serde(default)]
    pub total_loaded: u64,
}

impl ModelStatusResponse {
    /// Keys of models that are not loaded
    pub fn missing(&self) -> Vec<&str> {
        self.models
            .iter()
            .filter(|(_, m)| !m.loaded)
            .map(|(key, _)| key)
            .collect()
    }
}
