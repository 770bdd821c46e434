//! Risk Taxonomy
//!
//! The closed set of severity levels shared by every detector kind,
//! the score thresholds that produce them, and the display table.
//!
//! ## Structure
//! - `types`: `RiskLevel`, badge table and fallbacks
//! - `rules`: Score thresholds
//! - `classifier`: Score -> level
//!
//! ## Usage
//! ```
//! use rakshak_core::logic::risk::{classify, label_for, RiskLevel};
//!
//! assert_eq!(classify(0.85), RiskLevel::Critical);
//! assert_eq!(label_for("not-a-level"), "MEDIUM");
//! ```

pub mod types;
pub mod rules;
pub mod classifier;

pub use types::{
    badge_for,
    color_for,
    label_for,
    RiskBadge,
    RiskLevel,
    UnknownRiskLevel,
    FALLBACK_LEVEL,
};

pub use rules::{CRITICAL_THRESHOLD, HIGH_THRESHOLD, LOW_THRESHOLD, MEDIUM_THRESHOLD};

pub use classifier::classify;
