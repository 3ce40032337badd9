//! Integration tests against a simulated SDI backend.
//!
//! Every failure branch must land on the safe default: the client
//! never propagates a backend problem to its caller.

use std::time::{Duration, Instant};

use sdi_client::{AnalysisRequest, AnalysisResult, SdiClient, SdiConfig, Severity};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SdiClient {
    SdiClient::new(SdiConfig::new(server.uri()))
}

fn sample_request() -> AnalysisRequest {
    AnalysisRequest::builder("svc1", "/api/users", "POST")
        .header("content-type", "application/json")
        .body(r#"{"x":1}"#)
        .build()
}

#[tokio::test]
async fn analyze_maps_backend_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .and(body_partial_json(json!({
            "serviceId": "svc1",
            "path": "/api/users",
            "method": "POST",
            "body": "{\"x\":1}"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "anomalyDetected": true,
            "anomalyScore": 0.91,
            "severity": "critical",
            "serviceId": "svc1",
            "pipelineTriggered": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server).analyze(&sample_request()).await;

    assert!(result.anomaly_detected);
    assert_eq!(result.anomaly_score, 0.91);
    assert_eq!(result.severity, Severity::Critical);
    assert_eq!(result.service_id.as_deref(), Some("svc1"));
    assert!(result.pipeline_triggered);
}

#[tokio::test]
async fn analyze_defaults_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "anomalyDetected": true, "severity": "low" })),
        )
        .mount(&server)
        .await;

    let result = client_for(&server).analyze(&sample_request()).await;

    assert!(result.anomaly_detected);
    assert_eq!(result.severity, Severity::Low);
    assert_eq!(result.anomaly_score, 0.0);
    assert!(!result.pipeline_triggered);
}

#[tokio::test]
async fn analyze_fails_open_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client_for(&server).analyze(&sample_request()).await;
    assert_eq!(result, AnalysisResult::default());
}

#[tokio::test]
async fn analyze_fails_open_on_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let result = client_for(&server).analyze(&sample_request()).await;
    assert_eq!(result, AnalysisResult::default());
}

#[tokio::test]
async fn analyze_fails_open_on_connection_refused() {
    // nothing listens here
    let client = SdiClient::new(SdiConfig::new("http://127.0.0.1:9"));

    let result = client.analyze(&sample_request()).await;
    assert_eq!(result, AnalysisResult::default());
    assert!(!result.anomaly_detected);
    assert_eq!(result.severity, Severity::None);
}

#[tokio::test]
async fn analyze_returns_within_timeout_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "anomalyDetected": true, "severity": "critical" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = SdiConfig::new(server.uri()).timeout(Duration::from_millis(200));
    let client = SdiClient::new(config);

    let start = Instant::now();
    let result = client.analyze(&sample_request()).await;
    let elapsed = start.elapsed();

    assert_eq!(result, AnalysisResult::default());
    assert!(
        elapsed < Duration::from_secs(2),
        "timed-out call took {elapsed:?}"
    );
}

#[tokio::test]
async fn analyze_is_idempotent_against_stable_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "anomalyDetected": true,
            "anomalyScore": 0.42,
            "severity": "medium"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let request = sample_request();
    let first = client.analyze(&request).await;
    let second = client.analyze(&request).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn detect_returns_backend_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/detect"))
        .and(body_partial_json(json!({
            "serviceId": "svc1",
            "path": "/api/users",
            "method": "GET"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "anomalyDetected": true })))
        .mount(&server)
        .await;

    let detected = client_for(&server)
        .detect("svc1", "/api/users", "GET", "")
        .await;
    assert!(detected);
}

#[tokio::test]
async fn detect_fails_open() {
    let client = SdiClient::new(SdiConfig::new("http://127.0.0.1:9"));
    assert!(!client.detect("svc1", "/api/users", "GET", "").await);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/detect"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    assert!(!client_for(&server).detect("svc1", "/api/users", "GET", "").await);
}

#[tokio::test]
async fn health_check_reports_liveness() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(client_for(&server).health_check().await);

    let dead = SdiClient::new(SdiConfig::new("http://127.0.0.1:9"));
    assert!(!dead.health_check().await);
}

#[tokio::test]
async fn health_check_false_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!client_for(&server).health_check().await);
}

#[tokio::test]
async fn concurrent_calls_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/analyze"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "anomalyDetected": false })),
        )
        .expect(8)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.analyze(&sample_request()).await
        }));
    }

    for handle in handles {
        let result = handle.await.expect("task panicked");
        assert!(!result.anomaly_detected);
    }
}
