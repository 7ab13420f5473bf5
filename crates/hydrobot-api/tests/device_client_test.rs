#![allow(clippy::unwrap_used)]
// Integration tests for `DeviceClient` and `DetectionClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hydrobot_api::{
    DetectionClient, DeviceClient, DeviceEndpoints, Error, FailureKind, StatusReport,
    TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DeviceClient, DeviceEndpoints) {
    let server = MockServer::start().await;
    let client = DeviceClient::with_client(reqwest::Client::new());
    let endpoints = DeviceEndpoints::new(server.address().to_string());
    (server, client, endpoints)
}

// ── Status ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_status_success() {
    let (server, client, endpoints) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "192.168.4.1",
            "mode": "ap",
            "led": true,
            "pump": false,
            "rssi": -41
        })))
        .mount(&server)
        .await;

    let report = client.status(&endpoints).await.unwrap();

    assert_eq!(
        report,
        StatusReport {
            ip: "192.168.4.1".into(),
            mode: "ap".into(),
            led: true,
            pump: false,
        }
    );
}

#[tokio::test]
async fn test_status_non_json_is_validity_failure() {
    let (server, client, endpoints) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .mount(&server)
        .await;

    let err = client.status(&endpoints).await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Validity);
}

#[tokio::test]
async fn test_status_http_error_is_transport_failure() {
    let (server, client, endpoints) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client.status(&endpoints).await.unwrap_err();
    assert!(
        matches!(err, Error::HttpStatus { status: 500, .. }),
        "got {err:?}"
    );
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_status_unreachable_is_transport_failure() {
    let client = DeviceClient::new(&TransportConfig::with_timeout(Duration::from_millis(500))).unwrap();
    // Port 9 (discard) on localhost is essentially never listening.
    let endpoints = DeviceEndpoints::new("127.0.0.1:9");

    let err = client.status(&endpoints).await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_led_sends_flag() {
    let (server, client, endpoints) = setup().await;

    Mock::given(method("GET"))
        .and(path("/led"))
        .and(query_param("on", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    client.set_led(&endpoints, true).await.unwrap();
}

#[tokio::test]
async fn test_set_pump_off_sends_zero() {
    let (server, client, endpoints) = setup().await;

    Mock::given(method("GET"))
        .and(path("/pump"))
        .and(query_param("on", "0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.set_pump(&endpoints, false).await.unwrap();
}

#[tokio::test]
async fn test_command_rejected_by_device() {
    let (server, client, endpoints) = setup().await;

    Mock::given(method("GET"))
        .and(path("/led"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.set_led(&endpoints, true).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}

// ── Stream probe ────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_stream_reads_headers_only() {
    let server = MockServer::start().await;
    let client = DeviceClient::with_client(reqwest::Client::new());
    let endpoints = DeviceEndpoints::new(server.address().ip().to_string())
        .with_stream_port(server.address().port());

    Mock::given(method("GET"))
        .and(path("/stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "multipart/x-mixed-replace;boundary=123456789000000000000987654321")
                .set_body_bytes(vec![0_u8; 64]),
        )
        .mount(&server)
        .await;

    let probe = client.probe_stream(&endpoints).await.unwrap();
    assert_eq!(probe.status, 200);
    assert!(probe.is_multipart());
}

// ── Detection ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_detect_success_with_trailing_slash_base() {
    let server = MockServer::start().await;
    let client = DetectionClient::with_client(reqwest::Client::new());

    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "isFire": true,
            "score": 0.87
        })))
        .mount(&server)
        .await;

    let detection = client.detect(&format!("{}/", server.uri())).await.unwrap();
    assert!(detection.is_fire);
    assert!((detection.score - 0.87).abs() < 1e-9);
}

#[tokio::test]
async fn test_detect_without_ok_is_validity_failure() {
    let server = MockServer::start().await;
    let client = DetectionClient::with_client(reqwest::Client::new());

    Mock::given(method("GET"))
        .and(path("/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error": "no frame"
        })))
        .mount(&server)
        .await;

    let err = client.detect(&server.uri()).await.unwrap_err();
    assert!(matches!(err, Error::Validity { .. }), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Validity);
}

#[tokio::test]
async fn test_detect_scheme_less_server_is_transport_failure() {
    let client = DetectionClient::with_client(reqwest::Client::new());

    let err = client.detect("192.168.4.2:8000").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert_eq!(err.kind(), FailureKind::Transport);
}
