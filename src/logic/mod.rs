//! Logic Module - Detection client & dashboard engines
//!
//! ## Layout
//! - `risk/` - Risk taxonomy, thresholds and display table
//! - `scan/` - Normalized scan results and records
//! - `detection/` - HTTP client for the classification service
//! - `analytics/` - Snapshot -> dashboard series
//! - `refresh/` - Polling state machine and scheduler

pub mod ordered_map;

pub mod risk;
pub mod scan;
pub mod detection;
pub mod analytics;
pub mod refresh;
