//! Risk Classifier
//!
//! Maps a probability score onto a [`RiskLevel`].

use super::rules::{CRITICAL_THRESHOLD, HIGH_THRESHOLD, LOW_THRESHOLD, MEDIUM_THRESHOLD};
use super::types::RiskLevel;

/// Classify a score in `[0, 1]`
///
/// Out-of-range scores are clamped first; NaN is treated as 0.
pub fn classify(score: f64) -> RiskLevel {
    let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };

    if score >= CRITICAL_THRESHOLD {
        RiskLevel::Critical
    } else if score >= HIGH_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_THRESHOLD {
        RiskLevel::Medium
    } else if score >= LOW_THRESHOLD {
        RiskLevel::Low
    } else {
        RiskLevel::Safe
    }
}

// ============================================================================
// TESTS
// ============================================================================
