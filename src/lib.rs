//! Rakshak Core
//!
//! Client-side core for the Rakshak fraud detection service: classifies
//! messages, URLs and job postings through the upstream API, normalizes the
//! results into one risk taxonomy, and keeps a dashboard view of the
//! service's analytics fresh.

pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use config::Config;
pub use error::{DetectionError, DetectionResult};
