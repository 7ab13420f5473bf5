// ── Runtime link configuration ──
//
// Describes *where* the device and detection server live and how often to
// talk to them. Never touches disk: the CLI/TUI build a `LinkConfig`
// (usually via hydrobot-config) and hand it in.

use std::time::Duration;

pub use hydrobot_api::DEFAULT_STREAM_PORT;
use hydrobot_api::TransportConfig;

use crate::joystick::DEFAULT_RADIUS;

/// Access-point address the camera firmware uses out of the box.
pub const DEFAULT_DEVICE_ADDRESS: &str = "192.168.4.1";
/// Inference server on the same access point.
pub const DEFAULT_DETECTION_SERVER: &str = "http://192.168.4.2:8000";
pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_millis(5000);
pub const DEFAULT_DETECTION_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    /// Camera host (IPv4 literal or hostname), free text.
    pub device_address: String,
    /// Port of the MJPEG stream on the camera.
    pub stream_port: u16,
    /// Base URL of the detection server (e.g. `http://192.168.4.2:8000`).
    pub detection_server: String,
    /// Period of the `/status` poll loop.
    pub status_interval: Duration,
    /// Delay between detection attempts.
    pub detection_interval: Duration,
    /// Joystick radius in display units.
    pub joystick_radius: f64,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_address: DEFAULT_DEVICE_ADDRESS.into(),
            stream_port: DEFAULT_STREAM_PORT,
            detection_server: DEFAULT_DETECTION_SERVER.into(),
            status_interval: DEFAULT_STATUS_INTERVAL,
            detection_interval: DEFAULT_DETECTION_INTERVAL,
            joystick_radius: DEFAULT_RADIUS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LinkConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.timeout)
    }
}
