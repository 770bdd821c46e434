//! Result Normalizer
//!
//! Maps each detector kind's raw response onto [`ScanOutcome`].
//! Input: the decoded JSON body of a successful response.
//! Output: a `ScanOutcome`, or `MalformedResponse` when the verdict
//! flag or the score is missing or mistyped.
//!
//! Optional fields that are missing or of the wrong type become absent.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::timestamp::parse_timestamp;
use super::types::{DetectorKind, ScanOutcome};
use crate::error::{DetectionError, DetectionResult};
use crate::logic::ordered_map::OrderedMap;
use crate::logic::risk::{classify, RiskLevel};

// ============================================================================
// FIELD NAMES PER KIND
// ============================================================================

struct WireFields {
    positive: &'static str,
    score: &'static str,
}

fn wire_fields(kind: DetectorKind) -> WireFields {
    match kind {
        DetectorKind::Message => WireFields {
            positive: "is_scam",
            score: "scam_probability",
        },
        DetectorKind::Url => WireFields {
            positive: "is_phishing",
            score: "risk_score",
        },
        DetectorKind::Job => WireFields {
            positive: "is_fake",
            score: "fraud_probability",
        },
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

pub fn normalize_message(raw: &Value) -> DetectionResult<ScanOutcome> {
    normalize(DetectorKind::Message, raw)
}

pub fn normalize_url(raw: &Value) -> DetectionResult<ScanOutcome> {
    normalize(DetectorKind::Url, raw)
}

pub fn normalize_job(raw: &Value) -> DetectionResult<ScanOutcome> {
    normalize(DetectorKind::Job, raw)
}

/// Normalize a raw response of the given kind
pub fn normalize(kind: DetectorKind, raw: &Value) -> DetectionResult<ScanOutcome> {
    let obj = raw.as_object().ok_or_else(|| {
        DetectionError::MalformedResponse(format!("{} response is not a JSON object", kind))
    })?;
    let fields = wire_fields(kind);

    let is_positive = required_bool(obj, fields.positive)?;
    let score = required_score(obj, fields.score)?;
    let risk_level = upstream_level(obj).unwrap_or_else(|| classify(score));

    let (category, model_confidence, features_detected) = match kind {
        DetectorKind::Message => (
            optional_string(obj, "category"),
            number_map(obj, "model_confidence"),
            None,
        ),
        DetectorKind::Url => (None, None, bool_map(obj, "features_detected")),
        DetectorKind::Job => (optional_string(obj, "category"), None, None),
    };

    Ok(ScanOutcome {
        kind,
        is_positive,
        score,
        risk_level,
        category,
        explanations: explanations(obj),
        model_confidence,
        features_detected,
        timestamp: produced_at(obj),
    })
}

// ============================================================================
// FIELD EXTRACTION
// ============================================================================

fn required_bool(obj: &Map<String, Value>, key: &str) -> DetectionResult<bool> {
    match obj.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(DetectionError::MalformedResponse(format!(
            "field `{}` must be a boolean, got {}",
            key,
            type_name(other)
        ))),
        None => Err(DetectionError::MalformedResponse(format!(
            "missing required field `{}`",
            key
        ))),
    }
}

fn required_score(obj: &Map<String, Value>, key: &str) -> DetectionResult<f64> {
    match obj.get(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0))
            .ok_or_else(|| {
                DetectionError::MalformedResponse(format!("field `{}` is not a finite number", key))
            }),
        Some(other) => Err(DetectionError::MalformedResponse(format!(
            "field `{}` must be a number, got {}",
            key,
            type_name(other)
        ))),
        None => Err(DetectionError::MalformedResponse(format!(
            "missing required field `{}`",
            key
        ))),
    }
}

/// Upstream level, if present and one of the five labels
fn upstream_level(obj: &Map<String, Value>) -> Option<RiskLevel> {
    let raw = obj.get("risk_level")?.as_str()?;
    match raw.parse() {
        Ok(level) => Some(level),
        Err(e) => {
            log::debug!("Ignoring upstream risk level: {}", e);
            None
        }
    }
}

fn optional_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn explanations(obj: &Map<String, Value>) -> Vec<String> {
    obj.get("explanations")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn number_map(obj: &Map<String, Value>, key: &str) -> Option<OrderedMap<f64>> {
    let map = obj.get(key)?.as_object()?;
    Some(
        map.iter()
            .filter_map(|(k, v)| v.as_f64().map(|f| (k.as_str(), f)))
            .collect(),
    )
}

fn bool_map(obj: &Map<String, Value>, key: &str) -> Option<OrderedMap<bool>> {
    let map = obj.get(key)?.as_object()?;
    Some(
        map.iter()
            .filter_map(|(k, v)| v.as_bool().map(|b| (k.as_str(), b)))
            .collect(),
    )
}

fn produced_at(obj: &Map<String, Value>) -> DateTime<Utc> {
    match obj.get("timestamp").and_then(Value::as_str) {
        Some(raw) => parse_timestamp(raw).unwrap_or_else(|| {
            log::debug!("Unparseable response timestamp {:?}, using receive time", raw);
            Utc::now()
        }),
        None => Utc::now(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// TESTS
// ============================================================================
