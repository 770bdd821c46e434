//! Analytics Types
//!
//! The point-in-time summary fetched from `/analytics`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DetectionError, DetectionResult};
use crate::logic::ordered_map::OrderedMap;
use crate::logic::scan::timestamp;
use crate::logic::scan::ScanRecord;

/// Number of days in `daily_trend`
pub const TREND_DAYS: usize = 7;

/// One calendar day of the trend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// `YYYY-MM-DD`
    pub date: String,
    pub scans: u64,
    pub threats: u64,
}

/// One complete analytics summary, replaced wholesale on every refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub total_scans: u64,
    pub threats_detected: u64,
    /// Upstream-computed percentage; displayed as supplied
    pub detection_rate: f64,
    pub models_active: u64,
    #[serde(default)]
    pub category_distribution: OrderedMap<u64>,
    #[serde(default)]
    pub risk_distribution: OrderedMap<u64>,
    #[serde(default)]
    pub scan_type_distribution: OrderedMap<u64>,
    #[serde(default)]
    pub result_distribution: OrderedMap<u64>,
    /// Chronological, earliest first
    pub daily_trend: Vec<DailyCount>,
    /// Most recent first
    #[serde(default)]
    pub recent_scans: Vec<ScanRecord>,
    /// Model name -> metric name -> value
    #[serde(default)]
    pub model_info: OrderedMap<OrderedMap<Value>>,
    #[serde(default, with = "timestamp::flexible_option", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl AnalyticsSnapshot {
    /// Decode and validate a `/analytics` body
    pub fn from_json(body: Value) -> DetectionResult<Self> {
        let snapshot: AnalyticsSnapshot = serde_json::from_value(body)
            .map_err(|e| DetectionError::MalformedResponse(format!("analytics: {}", e)))?;
        snapshot.validate().map_err(DetectionError::MalformedResponse)?;
        Ok(snapshot)
    }

    /// Check the structural invariants of a snapshot
    pub fn validate(&self) -> Result<(), String> {
        if self.threats_detected > self.total_scans {
            return Err(format!(
                "threats_detected ({}) exceeds total_scans ({})",
                self.threats_detected, self.total_scans
            ));
        }
        if self.daily_trend.len() != TREND_DAYS {
            return Err(format!(
                "daily_trend has {} entries, expected {}",
                self.daily_trend.len(),
                TREND_DAYS
            ));
        }
        if let Some(day) = self.daily_trend.iter().find(|d| d.threats > d.scans) {
            return Err(format!(
                "daily_trend {} has {} threats out of {} scans",
                day.date, day.threats, day.scans
            ));
        }
        let dates = self
            .daily_trend
            .iter()
            .map(|d| {
                NaiveDate::parse_from_str(&d.date, "%Y-%m-%d")
                    .map_err(|_| format!("daily_trend date '{}' is not YYYY-MM-DD", d.date))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err("daily_trend is not in chronological order".to_string());
        }
        Ok(())
    }

    /// Rate implied by the counts, 0 when nothing was scanned
    pub fn implied_detection_rate(&self) -> f64 {
        if self.total_scans == 0 {
            0.0
        } else {
            self.threats_detected as f64 * 100.0 / self.total_scans as f64
        }
    }

    /// Difference between the supplied rate and the implied one,
    /// when it exceeds display rounding
    pub fn detection_rate_drift(&self) -> Option<f64> {
        let drift = self.detection_rate - self.implied_detection_rate();
        (drift.abs() > 0.05).then_some(drift)
    }

    /// No scan has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.total_scans == 0
            && self.category_distribution.is_empty()
            && self.risk_distribution.is_empty()
            && self.scan_type_distribution.is_empty()
            && self.result_distribution.is_empty()
            && self.recent_scans.is_empty()
    }
}
