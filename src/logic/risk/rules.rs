//! Risk Classification Thresholds
//!
//! Inclusive lower bounds for each level.
//! No classify logic here - only constants.

/// At or above this score = CRITICAL
pub const CRITICAL_THRESHOLD: f64 = 0.80;

/// At or above this score = HIGH
pub const HIGH_THRESHOLD: f64 = 0.60;

/// At or above this score = MEDIUM
pub const MEDIUM_THRESHOLD: f64 = 0.40;

/// At or above this score = LOW, below = SAFE
pub const LOW_THRESHOLD: f64 = 0.20;
