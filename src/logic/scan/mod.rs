//! Scan Module
//!
//! Normalized scan results shared by the message, URL and job detectors.
//!
//! ## Structure
//! - `types`: `DetectorKind`, `ScanOutcome`, `ScanRecord`
//! - `normalizer`: raw response -> `ScanOutcome`
//! - `timestamp`: upstream datetime parsing

pub mod types;
pub mod normalizer;
pub mod timestamp;

pub use types::{is_threat_result, DetectorKind, ScanOutcome, ScanRecord, THREAT_RESULTS};

pub use normalizer::{normalize, normalize_job, normalize_message, normalize_url};

pub use timestamp::parse_timestamp;
