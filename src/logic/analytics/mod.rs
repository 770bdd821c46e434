//! Analytics Module
//!
//! Turns scan history into dashboard series.
//!
//! ## Structure
//! - `types`: `AnalyticsSnapshot` and its invariants
//! - `series`: snapshot -> chart series, stat cards, activity rows
//! - `summary`: scan records -> snapshot

pub mod types;
pub mod series;
pub mod summary;

pub use types::{AnalyticsSnapshot, DailyCount, TREND_DAYS};

pub use series::{
    category_series,
    format_metric,
    headline_stats,
    model_performance_view,
    recent_activity,
    risk_series,
    scan_type_series,
    trend_series,
    ActivityRow,
    DashboardSeries,
    MetricCell,
    ModelBlock,
    SeriesPoint,
    StatCard,
    TrendPoint,
    TrendSeries,
    PALETTE,
};

pub use summary::{summarize, RECENT_WINDOW};
