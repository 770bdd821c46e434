//! Analytics Aggregator
//!
//! Pure transformations from an [`AnalyticsSnapshot`] into display-ready
//! series. Every function is total: an empty snapshot yields empty series.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::types::{AnalyticsSnapshot, DailyCount};
use crate::logic::ordered_map::OrderedMap;
use crate::logic::risk::{RiskBadge, RiskLevel};
use crate::logic::scan::ScanRecord;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Longest category label shown before truncation
pub const CATEGORY_LABEL_MAX: usize = 15;

/// Appended to truncated labels
pub const ELLIPSIS: &str = "...";

/// Rotating palette for keys without a fixed color
pub const PALETTE: [&str; 11] = [
    "#06b6d4", "#3b82f6", "#8b5cf6", "#ef4444", "#f97316", "#eab308",
    "#22c55e", "#ec4899", "#14b8a6", "#6366f1", "#f43f5e",
];

/// Bar fill for the scan-type chart
pub const SCAN_TYPE_COLOR: &str = "#3b82f6";

fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// One slice/bar of a distribution chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Source key, used for lookups
    pub key: String,
    /// Display label
    pub label: String,
    pub value: u64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    /// Axis tick, `MM-DD` for ISO dates
    pub label: String,
    pub scans: u64,
    pub threats: u64,
}

/// The 7-day trend. An all-zero trend reports no data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    pub fn has_data(&self) -> bool {
        self.points.iter().any(|p| p.scans > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCell {
    pub name: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelBlock {
    pub name: String,
    pub title: String,
    /// `accuracy` as a percentage, when reported
    pub headline: Option<String>,
    pub metrics: Vec<MetricCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityRow {
    pub timestamp: DateTime<Utc>,
    pub title: &'static str,
    /// Category when present, else the result label
    pub detail: String,
    pub is_threat: bool,
    pub badge: RiskBadge,
}

// ============================================================================
// SERIES
// ============================================================================

fn truncate_label(key: &str) -> String {
    if key.chars().count() > CATEGORY_LABEL_MAX {
        let head: String = key.chars().take(CATEGORY_LABEL_MAX).collect();
        format!("{}{}", head, ELLIPSIS)
    } else {
        key.to_string()
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn category_series(snapshot: &AnalyticsSnapshot) -> Vec<SeriesPoint> {
    snapshot
        .category_distribution
        .iter()
        .enumerate()
        .map(|(i, (key, count))| SeriesPoint {
            key: key.to_string(),
            label: truncate_label(key),
            value: *count,
            color: palette_color(i),
        })
        .collect()
}

pub fn risk_series(snapshot: &AnalyticsSnapshot) -> Vec<SeriesPoint> {
    snapshot
        .risk_distribution
        .iter()
        .enumerate()
        .map(|(i, (key, count))| {
            // exact wire labels only; anything else is off-palette
            let level = RiskLevel::ALL.into_iter().find(|l| l.as_str() == key);
            SeriesPoint {
                key: key.to_string(),
                label: key.to_string(),
                value: *count,
                color: level.map(|l| l.color()).unwrap_or_else(|| palette_color(i)),
            }
        })
        .collect()
}

pub fn scan_type_series(snapshot: &AnalyticsSnapshot) -> Vec<SeriesPoint> {
    snapshot
        .scan_type_distribution
        .iter()
        .map(|(key, count)| SeriesPoint {
            key: key.to_string(),
            label: capitalize_first(key),
            value: *count,
            color: SCAN_TYPE_COLOR,
        })
        .collect()
}

fn axis_label(date: &str) -> String {
    let bytes = date.as_bytes();
    let iso = bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-';
    if iso {
        date[5..].to_string()
    } else {
        date.to_string()
    }
}

pub fn trend_series(snapshot: &AnalyticsSnapshot) -> TrendSeries {
    TrendSeries {
        points: snapshot
            .daily_trend
            .iter()
            .map(|DailyCount { date, scans, threats }| TrendPoint {
                date: date.clone(),
                label: axis_label(date),
                scans: *scans,
                threats: *threats,
            })
            .collect(),
    }
}

/// Value in (0, 1) as a one-decimal percentage, anything else as-is
pub fn format_metric(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) if v > 0.0 && v < 1.0 => format!("{:.1}%", v * 100.0),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn model_title(name: &str) -> String {
    let words: Vec<String> = name
        .split('_')
        .filter(|w| !w.is_empty())
        .map(capitalize_first)
        .collect();
    format!("{} Model", words.join(" "))
}

fn model_block(name: &str, metrics: &OrderedMap<Value>) -> ModelBlock {
    ModelBlock {
        name: name.to_string(),
        title: model_title(name),
        headline: metrics
            .get("accuracy")
            .and_then(Value::as_f64)
            .map(|acc| format!("{:.1}%", acc * 100.0)),
        metrics: metrics
            .iter()
            .map(|(metric, value)| MetricCell {
                name: metric.to_string(),
                display: format_metric(value),
            })
            .collect(),
    }
}

pub fn model_performance_view(snapshot: &AnalyticsSnapshot) -> Vec<ModelBlock> {
    snapshot
        .model_info
        .iter()
        .map(|(name, metrics)| model_block(name, metrics))
        .collect()
}

pub fn headline_stats(snapshot: &AnalyticsSnapshot) -> Vec<StatCard> {
    vec![
        StatCard {
            label: "Total Scans",
            value: snapshot.total_scans.to_string(),
        },
        StatCard {
            label: "Threats Detected",
            value: snapshot.threats_detected.to_string(),
        },
        StatCard {
            label: "Detection Rate",
            value: format!("{}%", snapshot.detection_rate),
        },
        StatCard {
            label: "Models Active",
            value: snapshot.models_active.to_string(),
        },
    ]
}

fn activity_row(record: &ScanRecord) -> ActivityRow {
    let detail = if record.category.is_empty() {
        record.result.clone()
    } else {
        record.category.clone()
    };

    ActivityRow {
        timestamp: record.timestamp,
        title: record.kind.scan_title(),
        detail,
        is_threat: record.is_threat(),
        badge: record.badge(),
    }
}

pub fn recent_activity(snapshot: &AnalyticsSnapshot) -> Vec<ActivityRow> {
    snapshot.recent_scans.iter().map(activity_row).collect()
}

// ============================================================================
// DASHBOARD BUNDLE
// ============================================================================

/// Every derived series of one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSeries {
    pub stats: Vec<StatCard>,
    pub categories: Vec<SeriesPoint>,
    pub risks: Vec<SeriesPoint>,
    pub scan_types: Vec<SeriesPoint>,
    pub trend: TrendSeries,
    pub models: Vec<ModelBlock>,
    pub recent: Vec<ActivityRow>,
}

impl DashboardSeries {
    pub fn from_snapshot(snapshot: &AnalyticsSnapshot) -> Self {
        Self {
            stats: headline_stats(snapshot),
            categories: category_series(snapshot),
            risks: risk_series(snapshot),
            scan_types: scan_type_series(snapshot),
            trend: trend_series(snapshot),
            models: model_performance_view(snapshot),
            recent: recent_activity(snapshot),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
