//! Risk Types
//!
//! Core types for risk classification.
//! No classification logic here - only data structures and the display table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ============================================================================
// RISK LEVEL
// ============================================================================

/// Five-point ordinal severity, ordered `Safe < Low < Medium < High < Critical`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// All levels, ascending
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Safe,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Wire label as sent by the upstream service
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Badge text
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Low => "LOW RISK",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH RISK",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "#22c55e",     // Green
            RiskLevel::Low => "#3b82f6",      // Blue
            RiskLevel::Medium => "#eab308",   // Yellow
            RiskLevel::High => "#f97316",     // Orange
            RiskLevel::Critical => "#ef4444", // Red
        }
    }

    pub fn badge(&self) -> RiskBadge {
        RiskBadge {
            label: self.label(),
            color: self.color(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the five wire labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRiskLevel(pub String);

impl fmt::Display for UnknownRiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown risk level: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRiskLevel {}

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRiskLevel(s.to_string()))
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

/// Label/color pair used wherever a risk level is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskBadge {
    pub label: &'static str,
    pub color: &'static str,
}

/// Level used for any label outside the closed set
pub const FALLBACK_LEVEL: RiskLevel = RiskLevel::Medium;

/// Color for a wire label, falling back to MEDIUM for unknown values
pub fn color_for(level: &str) -> &'static str {
    level.parse::<RiskLevel>().unwrap_or(FALLBACK_LEVEL).color()
}

/// Badge text for a wire label, falling back to MEDIUM for unknown values
pub fn label_for(level: &str) -> &'static str {
    level.parse::<RiskLevel>().unwrap_or(FALLBACK_LEVEL).label()
}

/// Badge for a wire label, falling back to MEDIUM for unknown values
pub fn badge_for(level: &str) -> RiskBadge {
    level.parse::<RiskLevel>().unwrap_or(FALLBACK_LEVEL).badge()
}
