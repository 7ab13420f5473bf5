#![allow(clippy::unwrap_used)]
// Integration tests for `DeviceLink` against a wiremock camera.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hydrobot_core::{CoreError, DeviceLink, FailureKind, LinkConfig, LinkState};

const ADVISORY: &str = "Falha ao conectar. Confira o Wi-Fi HYDROBOT-CAM e o IP.";

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> LinkConfig {
    LinkConfig {
        device_address: server.address().to_string(),
        status_interval: Duration::from_millis(50),
        timeout: Duration::from_secs(2),
        ..LinkConfig::default()
    }
}

async fn setup() -> (MockServer, DeviceLink) {
    let server = MockServer::start().await;
    let link = DeviceLink::new(&config_for(&server)).unwrap();
    (server, link)
}

fn status_body(led: bool, pump: bool) -> serde_json::Value {
    json!({ "ip": "192.168.4.1", "mode": "ap", "led": led, "pump": pump })
}

async fn mount_status(server: &MockServer, led: bool, pump: bool) {
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body(led, pump)))
        .mount(server)
        .await;
}

async fn wait_until(link: &DeviceLink, pred: impl FnMut(&LinkState) -> bool) -> LinkState {
    let mut rx = link.subscribe();
    tokio::time::timeout(Duration::from_secs(3), rx.wait_for(pred))
        .await
        .expect("state condition not reached in time")
        .unwrap()
        .clone()
}

async fn status_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/status")
        .count()
}

// ── Polling ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_success_formats_status_line() {
    let (server, link) = setup().await;
    mount_status(&server, true, false).await;

    assert_eq!(link.state().message, "\u{2014}");

    let status = link.poll_status().await.unwrap();
    assert!(status.led_on);

    let state = link.state();
    assert_eq!(
        state.message,
        "OK \u{2022} ip:192.168.4.1 \u{2022} mode:ap \u{2022} led:on \u{2022} pump:off"
    );
    assert!(state.led_on());
    assert!(!state.pump_on());
    assert!(!state.checking);
    assert!(state.last_success.is_some());
}

#[tokio::test]
async fn test_poll_failure_keeps_last_known_flags() {
    let (server, link) = setup().await;
    mount_status(&server, true, true).await;
    link.poll_status().await.unwrap();
    let before = link.state();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = link.poll_status().await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Transport);

    let after = link.state();
    assert_eq!(after.message, ADVISORY);
    assert_eq!(after.device, before.device);
    assert_eq!(after.last_success, before.last_success);
}

#[tokio::test]
async fn test_poll_non_json_is_reported_as_connection_failure() {
    let (server, link) = setup().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
        .mount(&server)
        .await;

    let err = link.poll_status().await.unwrap_err();
    assert!(matches!(err, CoreError::Validity { .. }));
    assert_eq!(link.state().message, ADVISORY);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_toggle_led_from_off_sends_on() {
    let (server, link) = setup().await;

    Mock::given(method("GET"))
        .and(path("/led"))
        .and(query_param("on", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let target = link.toggle_led().await.unwrap();

    assert!(target);
    let state = link.state();
    assert!(state.led_on());
    assert_eq!(state.message, "LED ligado \u{2022} \u{2014}");
}

#[tokio::test]
async fn test_pump_note_replaces_led_note() {
    let (server, link) = setup().await;
    mount_status(&server, false, false).await;
    Mock::given(method("GET"))
        .and(path("/led"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pump"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    link.poll_status().await.unwrap();
    let ok_line = link.state().message;

    link.set_led(true).await.unwrap();
    link.set_pump(true).await.unwrap();

    assert_eq!(link.state().message, format!("Bomba ligada \u{2022} {ok_line}"));
}

#[tokio::test]
async fn test_failed_command_keeps_flag() {
    let (server, link) = setup().await;
    Mock::given(method("GET"))
        .and(path("/pump"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(link.toggle_pump().await.is_err());

    let state = link.state();
    assert!(!state.pump_on());
    assert_eq!(state.message, "Erro ao alternar bomba.");
}

#[tokio::test]
async fn test_stale_poll_does_not_revert_command() {
    let (server, link) = setup().await;

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body(false, false))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/led"))
        .and(query_param("on", "1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let poller = link.clone();
    let poll = tokio::spawn(async move { poller.poll_status().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    link.set_led(true).await.unwrap();
    poll.await.unwrap().unwrap();

    let state = link.state();
    assert!(state.led_on(), "poll issued before the command must not undo it");
    assert!(state.message.starts_with("LED ligado"));
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_activate_polls_immediately() {
    let server = MockServer::start().await;
    mount_status(&server, false, true).await;
    let link = DeviceLink::new(&LinkConfig {
        status_interval: Duration::from_secs(60),
        ..config_for(&server)
    })
    .unwrap();

    let session = link.activate();
    assert!(link.state().active);

    let state = wait_until(&link, |s| s.last_success.is_some()).await;
    assert!(state.pump_on());
    drop(session);
}

#[tokio::test]
async fn test_dropping_session_stops_polling() {
    let (server, link) = setup().await;
    mount_status(&server, false, false).await;

    let session = link.activate();
    wait_until(&link, |s| s.last_success.is_some()).await;
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(status_requests(&server).await >= 2);

    session.deactivate();
    assert!(!link.state().active);

    tokio::time::sleep(Duration::from_millis(60)).await;
    let settled = status_requests(&server).await;
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(status_requests(&server).await, settled);
}

#[tokio::test]
async fn test_in_flight_poll_discarded_after_deactivate() {
    let (server, link) = setup().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(status_body(true, true))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let session = link.activate();
    wait_until(&link, |s| s.checking).await;
    drop(session);

    tokio::time::sleep(Duration::from_millis(450)).await;

    let state = link.state();
    assert!(!state.checking);
    assert!(state.last_success.is_none());
    assert!(!state.led_on());
    assert_eq!(state.message, "\u{2014}");
}

#[tokio::test]
async fn test_address_change_applies_to_next_poll() {
    let (first, link) = setup().await;
    mount_status(&first, false, false).await;

    let second = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ip": "10.0.0.9", "mode": "sta", "led": "1", "pump": 0
        })))
        .mount(&second)
        .await;

    let _session = link.activate();
    wait_until(&link, |s| s.device.reported_ip == "192.168.4.1").await;

    link.set_address(&format!("  {}  ", second.address()));
    assert_eq!(link.address(), second.address().to_string());

    let state = wait_until(&link, |s| s.device.reported_ip == "10.0.0.9").await;
    assert_eq!(state.device.mode, "sta");
    assert!(state.led_on());
    assert!(!state.pump_on());
}

#[tokio::test]
async fn test_stream_url_follows_address() {
    let (_server, link) = setup().await;
    link.set_address("192.168.4.7");
    assert_eq!(link.stream_url(), "http://192.168.4.7:81/stream");
}

#[tokio::test]
async fn test_deactivate_on_link_ends_session() {
    let (server, link) = setup().await;
    mount_status(&server, false, false).await;

    let session = link.activate();
    wait_until(&link, |s| s.last_success.is_some()).await;

    link.deactivate();
    assert!(!link.is_active());

    // The guard outlives the session it belonged to and stays inert.
    drop(session);
    assert!(!link.is_active());

    let _again = link.activate();
    assert!(link.is_active());
}
