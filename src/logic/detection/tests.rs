use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{DetectionClient, JobPosting};
use crate::error::DetectionError;
use crate::logic::risk::RiskLevel;
use crate::logic::scan::DetectorKind;

// ============================================================================
// MOCK UPSTREAM
// ============================================================================

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> DetectionClient {
    DetectionClient::with_timeout(base_url, Duration::from_secs(5)).unwrap()
}

/// Base URL of a port with nothing listening
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn trend() -> Value {
    let days: Vec<Value> = (1..=7)
        .map(|d| {
            let (scans, threats) = if d == 7 { (2, 1) } else { (0, 0) };
            json!({"date": format!("2025-06-{:02}", d), "scans": scans, "threats": threats})
        })
        .collect();
    Value::Array(days)
}

fn analytics_body() -> Value {
    json!({
        "total_scans": 2,
        "threats_detected": 1,
        "detection_rate": 50.0,
        "models_active": 5,
        "category_distribution": {"Lottery Scam": 1},
        "risk_distribution": {"CRITICAL": 1, "SAFE": 1},
        "scan_type_distribution": {"message": 2},
        "result_distribution": {"scam": 1, "safe": 1},
        "daily_trend": trend(),
        "recent_scans": [
            {"timestamp": "2025-06-07T09:00:00", "type": "message", "result": "scam", "risk_level": "CRITICAL", "category": "Lottery Scam"},
            {"timestamp": "2025-06-07T08:00:00", "type": "message", "result": "safe", "risk_level": "SAFE", "category": ""}
        ],
        "model_info": {"text": {"accuracy": 0.97}},
        "timestamp": "2025-06-07T09:00:01"
    })
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[tokio::test]
async fn test_detect_message_round_trip() {
    let app = Router::new().route(
        "/detect-message",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["message"], "You won a lottery! Send OTP now");
            Json(json!({
                "is_scam": true,
                "scam_probability": 0.85,
                "category": "Lottery Scam",
                "explanations": ["Prize bait", "Requests OTP"],
                "model_confidence": {"logistic_regression": 0.8, "naive_bayes": 0.9, "random_forest": 0.85, "ensemble": 0.85},
                "timestamp": "2025-06-07T09:00:00.123"
            }))
        }),
    );
    let base = serve(app).await;

    let outcome = client(&base)
        .detect_message("You won a lottery! Send OTP now")
        .await
        .unwrap();
    assert_eq!(outcome.kind, DetectorKind::Message);
    assert_eq!(outcome.risk_level, RiskLevel::Critical);
    assert_eq!(outcome.explanations, vec!["Prize bait", "Requests OTP"]);
    assert_eq!(outcome.model_confidence.unwrap().len(), 4);
}

#[tokio::test]
async fn test_scan_url_round_trip() {
    let app = Router::new().route(
        "/scan-url",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["url"], "http://192.168.0.1/login");
            Json(json!({
                "is_phishing": true,
                "risk_score": 0.72,
                "risk_level": "HIGH",
                "features_detected": {"has_ip_address": true, "has_https": false},
                "explanations": ["IP address host"],
                "timestamp": "2025-06-07T09:00:00"
            }))
        }),
    );
    let base = serve(app).await;

    let outcome = client(&base).scan_url("http://192.168.0.1/login").await.unwrap();
    assert_eq!(outcome.kind, DetectorKind::Url);
    assert_eq!(outcome.risk_level, RiskLevel::High);
    assert!(outcome.category.is_none());
    assert_eq!(outcome.active_features(), vec!["has_ip_address"]);
}

#[tokio::test]
async fn test_detect_job_sends_all_fields() {
    let app = Router::new().route(
        "/detect-job",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["title"], "Work from home");
            assert_eq!(body["company_profile"], "");
            assert_eq!(body["benefits"], "Weekly pay");
            Json(json!({
                "is_fake": true,
                "fraud_probability": 0.64,
                "explanations": ["Unrealistic salary"],
                "timestamp": "2025-06-07T09:00:00"
            }))
        }),
    );
    let base = serve(app).await;

    let posting = JobPosting {
        title: "Work from home".into(),
        benefits: "Weekly pay".into(),
        ..Default::default()
    };
    let outcome = client(&base).detect_job(&posting).await.unwrap();
    assert!(outcome.is_positive);
    assert_eq!(outcome.risk_level, RiskLevel::High);
}

// ============================================================================
// LOCAL REJECTION
// ============================================================================

#[tokio::test]
async fn test_invalid_input_never_hits_upstream() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().fallback(move || {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            StatusCode::OK
        }
    });
    let base = serve(app).await;
    let client = client(&base);

    let posting = JobPosting {
        company_profile: "Acme".into(),
        ..Default::default()
    };
    assert!(matches!(client.detect_job(&posting).await, Err(DetectionError::InvalidInput(_))));
    assert!(matches!(client.detect_message("   ").await, Err(DetectionError::InvalidInput(_))));
    assert!(matches!(client.scan_url("").await, Err(DetectionError::InvalidInput(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

// ============================================================================
// ERROR TRANSLATION
// ============================================================================

#[tokio::test]
async fn test_rejection_propagates_detail() {
    let app = Router::new().route(
        "/detect-message",
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"detail": "Text scam models not loaded. Train models first."})),
            )
        }),
    );
    let base = serve(app).await;

    match client(&base).detect_message("hello").await {
        Err(DetectionError::UpstreamRejected { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Text scam models not loaded. Train models first.");
        }
        other => panic!("Expected UpstreamRejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejection_without_detail_is_generic() {
    let app = Router::new()
        .route("/scan-url", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
        .route(
            "/detect-message",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"detail": [{"loc": ["body", "message"], "msg": "field required"}]})),
                )
            }),
        );
    let base = serve(app).await;
    let client = client(&base);

    let err = client.scan_url("http://x.io").await.unwrap_err();
    assert_eq!(err.to_string(), "Server error");
    assert!(err.is_retryable());

    let err = client.detect_message("hi").await.unwrap_err();
    assert!(matches!(err, DetectionError::UpstreamRejected { status: 422, .. }));
    assert_eq!(err.to_string(), "Server error");
}

#[tokio::test]
async fn test_missing_required_field_is_malformed() {
    let app = Router::new().route(
        "/detect-job",
        post(|| async { Json(json!({"fraud_probability": 0.3, "explanations": []})) }),
    );
    let base = serve(app).await;

    let posting = JobPosting {
        description: "Entry level".into(),
        ..Default::default()
    };
    let err = client(&base).detect_job(&posting).await.unwrap_err();
    assert!(matches!(err, DetectionError::MalformedResponse(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_non_json_success_is_malformed() {
    let app = Router::new().route("/analytics", get(|| async { "<html>proxy login</html>" }));
    let base = serve(app).await;

    assert!(matches!(
        client(&base).fetch_analytics().await,
        Err(DetectionError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let base = dead_url().await;
    let err = client(&base).fetch_analytics().await.unwrap_err();
    assert!(matches!(err, DetectionError::Unreachable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_timeout_is_unreachable() {
    let app = Router::new().route(
        "/analytics",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(analytics_body())
        }),
    );
    let base = serve(app).await;
    let client = DetectionClient::with_timeout(&base, Duration::from_millis(200)).unwrap();

    match client.fetch_analytics().await {
        Err(DetectionError::Unreachable(reason)) => assert!(reason.contains("timed out")),
        other => panic!("Expected Unreachable, got {:?}", other),
    }
}

// ============================================================================
// ANALYTICS & STATUS
// ============================================================================

#[tokio::test]
async fn test_fetch_analytics() {
    let app = Router::new().route("/analytics", get(|| async { Json(analytics_body()) }));
    let base = serve(app).await;

    let snapshot = client(&base).fetch_analytics().await.unwrap();
    assert_eq!(snapshot.total_scans, 2);
    assert_eq!(snapshot.daily_trend.len(), 7);
    assert_eq!(snapshot.recent_scans[0].result, "scam");
    assert_eq!(snapshot.risk_distribution.keys().collect::<Vec<_>>(), vec!["CRITICAL", "SAFE"]);
}

#[tokio::test]
async fn test_fetch_analytics_rejects_broken_invariant() {
    let mut body = analytics_body();
    body["threats_detected"] = json!(5);
    let app = Router::new().route("/analytics", get(move || async move { Json(body) }));
    let base = serve(app).await;

    assert!(matches!(
        client(&base).fetch_analytics().await,
        Err(DetectionError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_health_and_model_status() {
    let app = Router::new()
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "models_loaded": 9, "timestamp": "2025-06-07T09:00:00"})) }),
        )
        .route(
            "/model-status",
            get(|| async {
                Json(json!({
                    "models": {
                        "scam_lr": {"name": "Logistic Regression (Text)", "loaded": true, "status": "active"},
                        "job_detector": {"name": "Logistic Regression (Job)", "loaded": false, "status": "not loaded"}
                    },
                    "total_loaded": 1
                }))
            }),
        );
    let base = serve(app).await;
    let client = client(&base);

    let health = client.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.models_loaded, 9);

    let status = client.model_status().await.unwrap();
    assert_eq!(status.total_loaded, 1);
    assert_eq!(status.missing(), vec!["job_detector"]);
}

#[tokio::test]
async fn test_trailing_slash_in_base_url() {
    let app = Router::new().route("/health", get(|| async { Json(json!({"status": "healthy"})) }));
    let base = serve(app).await;

    let client = client(&format!("{}/", base));
    assert_eq!(client.base_url(), base);
    assert!(client.health().await.unwrap().is_healthy());
}
