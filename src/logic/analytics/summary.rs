//! History Summary
//!
//! Builds an [`AnalyticsSnapshot`] from a batch of scan records, counting
//! the same way the upstream service does for `/analytics`.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::types::{AnalyticsSnapshot, DailyCount, TREND_DAYS};
use crate::logic::ordered_map::OrderedMap;
use crate::logic::scan::ScanRecord;

/// Length of the recent-activity window
pub const RECENT_WINDOW: usize = 20;

/// Summarize `records` (oldest first) as of `now`
///
/// `models_active` and `model_info` are left empty; they describe the
/// classifier deployment, not the history.
pub fn summarize(records: &[ScanRecord], now: DateTime<Utc>) -> AnalyticsSnapshot {
    let mut category_distribution = OrderedMap::new();
    let mut risk_distribution = OrderedMap::new();
    let mut scan_type_distribution = OrderedMap::new();
    let mut result_distribution = OrderedMap::new();
    let mut threats_detected = 0u64;

    for record in records {
        if !record.category.is_empty() {
            category_distribution.increment(&record.category);
        }
        risk_distribution.increment(&record.risk_level);
        scan_type_distribution.increment(record.kind.as_str());
        result_distribution.increment(&record.result);
        if record.is_threat() {
            threats_detected += 1;
        }
    }

    let total_scans = records.len() as u64;

    AnalyticsSnapshot {
        total_scans,
        threats_detected,
        detection_rate: detection_rate(threats_detected, total_scans),
        models_active: 0,
        category_distribution,
        risk_distribution,
        scan_type_distribution,
        result_distribution,
        daily_trend: daily_trend(records, now.date_naive()),
        recent_scans: records.iter().rev().take(RECENT_WINDOW).cloned().collect(),
        model_info: OrderedMap::new(),
        timestamp: Some(now),
    }
}

/// Percentage rounded to one decimal, 0 for an empty history
fn detection_rate(threats: u64, total: u64) -> f64 {
    let rate = threats as f64 / total.max(1) as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

fn daily_trend(records: &[ScanRecord], today: NaiveDate) -> Vec<DailyCount> {
    (0..TREND_DAYS as i64)
        .rev()
        .map(|days_ago| {
            let date = today - Duration::days(days_ago);
            let (scans, threats) = records
                .iter()
                .filter(|r| r.timestamp.date_naive() == date)
                .fold((0u64, 0u64), |(scans, threats), r| {
                    (scans + 1, threats + r.is_threat() as u64)
                });
            DailyCount {
                date: date.format("%Y-%m-%d").to_string(),
                scans,
                threats,
            }
        })
        .collect()
}
