//! Scan Types
//!
//! The normalized shape every detector kind is mapped into, and the
//! lightweight history record derived from it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::logic::ordered_map::OrderedMap;
use crate::logic::risk::{badge_for, RiskBadge, RiskLevel};

// ============================================================================
// DETECTOR KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectorKind {
    Message,
    Url,
    Job,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 3] = [DetectorKind::Message, DetectorKind::Url, DetectorKind::Job];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectorKind::Message => "message",
            DetectorKind::Url => "url",
            DetectorKind::Job => "job",
        }
    }

    /// History result label for a positive verdict
    pub fn positive_result(&self) -> &'static str {
        match self {
            DetectorKind::Message => "scam",
            DetectorKind::Url => "phishing",
            DetectorKind::Job => "fake",
        }
    }

    /// History result label for a negative verdict
    pub fn negative_result(&self) -> &'static str {
        match self {
            DetectorKind::Message | DetectorKind::Url => "safe",
            DetectorKind::Job => "legit",
        }
    }

    /// Activity-list title, e.g. "Message scan"
    pub fn scan_title(&self) -> &'static str {
        match self {
            DetectorKind::Message => "Message scan",
            DetectorKind::Url => "URL scan",
            DetectorKind::Job => "Job scan",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result labels counted as threats in history
pub const THREAT_RESULTS: [&str; 3] = ["scam", "phishing", "fake"];

pub fn is_threat_result(result: &str) -> bool {
    THREAT_RESULTS.contains(&result)
}

// ============================================================================
// SCAN OUTCOME
// ============================================================================

/// Normalized result of one classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    pub kind: DetectorKind,
    /// Scam / phishing / fake, depending on `kind`
    pub is_positive: bool,
    /// Kind-specific probability in `[0, 1]`
    pub score: f64,
    pub risk_level: RiskLevel,
    pub category: Option<String>,
    /// Detector-assigned salience order, never re-sorted
    pub explanations: Vec<String>,
    /// Message kind only
    pub model_confidence: Option<OrderedMap<f64>>,
    /// URL kind only
    pub features_detected: Option<OrderedMap<bool>>,
    pub timestamp: DateTime<Utc>,
}

impl ScanOutcome {
    pub fn badge(&self) -> RiskBadge {
        self.risk_level.badge()
    }

    /// Score as a whole percentage for meters
    pub fn percentage(&self) -> u8 {
        (self.score * 100.0).round() as u8
    }

    pub fn result_label(&self) -> &'static str {
        if self.is_positive {
            self.kind.positive_result()
        } else {
            self.kind.negative_result()
        }
    }

    /// Detected URL features that are set
    pub fn active_features(&self) -> Vec<&str> {
        self.features_detected
            .as_ref()
            .map(|features| {
                features
                    .iter()
                    .filter(|(_, on)| **on)
                    .map(|(name, _)| name)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// SCAN RECORD (history entry)
// ============================================================================

/// Lightweight per-scan summary, as listed in `recent_scans`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    #[serde(with = "timestamp::flexible")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: DetectorKind,
    pub result: String,
    /// Wire label; kept as text so unknown levels still display
    pub risk_level: String,
    #[serde(default)]
    pub category: String,
}

impl ScanRecord {
    pub fn from_outcome(outcome: &ScanOutcome) -> Self {
        let category = if !outcome.is_positive {
            String::new()
        } else {
            match outcome.kind {
                DetectorKind::Message => outcome.category.clone().unwrap_or_default(),
                DetectorKind::Url => "Phishing Link".to_string(),
                DetectorKind::Job => "Fake Job Scam".to_string(),
            }
        };

        Self {
            timestamp: outcome.timestamp,
            kind: outcome.kind,
            result: outcome.result_label().to_string(),
            risk_level: outcome.risk_level.as_str().to_string(),
            category,
        }
    }

    pub fn is_threat(&self) -> bool {
        is_threat_result(&self.result)
    }

    pub fn badge(&self) -> RiskBadge {
        badge_for(&self.risk_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: DetectorKind, is_positive: bool, category: Option<&str>) -> ScanOutcome {
        ScanOutcome {
            kind,
            is_positive,
            score: 0.9,
            risk_level: RiskLevel::Critical,
            category: category.map(str::to_string),
            explanations: vec![],
            model_confidence: None,
            features_detected: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_record_from_positive_outcomes() {
        let msg = ScanRecord::from_outcome(&outcome(DetectorKind::Message, true, Some("Lottery Scam")));
        assert_eq!(msg.result, "scam");
        assert_eq!(msg.category, "Lottery Scam");
        assert_eq!(msg.risk_level, "CRITICAL");

        let url = ScanRecord::from_outcome(&outcome(DetectorKind::Url, true, None));
        assert_eq!(url.result, "phishing");
        assert_eq!(url.category, "Phishing Link");

        let job = ScanRecord::from_outcome(&outcome(DetectorKind::Job, true, Some("Fake Job")));
        assert_eq!(job.result, "fake");
        assert_eq!(job.category, "Fake Job Scam");
        assert!(job.is_threat());
    }

    #[test]
    fn test_record_from_negative_outcomes() {
        let msg = ScanRecord::from_outcome(&outcome(DetectorKind::Message, false, Some("Lottery Scam")));
        assert_eq!(msg.result, "safe");
        assert_eq!(msg.category, "");
        assert!(!msg.is_threat());

        let job = ScanRecord::from_outcome(&outcome(DetectorKind::Job, false, None));
        assert_eq!(job.result, "legit");
    }

    #[test]
    fn test_record_wire_shape() {
        let json = r#"{
            "timestamp": "2025-01-02T03:04:05.000123",
            "type": "url",
            "result": "phishing",
            "risk_level": "HIGH",
            "category": "Phishing Link"
        }"#;
        let record: ScanRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.kind, DetectorKind::Url);
        assert_eq!(record.badge().label, "HIGH RISK");
    }

    #[test]
    fn test_active_features() {
        let mut out = outcome(DetectorKind::Url, true, None);
        out.features_detected = Some(
            [("has_ip_address", true), ("uses_https", false), ("suspicious_tld", true)]
                .into_iter()
                .collect(),
        );
        assert_eq!(out.active_features(), vec!["has_ip_address", "suspicious_tld"]);
        assert_eq!(out.percentage(), 90);
    }
}
