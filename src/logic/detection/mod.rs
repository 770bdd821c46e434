//! Detection Module - Client for the upstream classification service
//!
//! This module handles:
//! - Message / URL / job classification requests
//! - Analytics snapshot fetch
//! - Health and model status probes
//! - Translating transport failures into `DetectionError`

pub mod client;
pub mod types;

pub use client::DetectionClient;
pub use types::{HealthResponse, JobPosting, ModelStatus, ModelStatusResponse};

#[cfg(test)]
mod tests;
