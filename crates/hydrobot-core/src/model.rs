//! Domain types published by the core components.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use hydrobot_api::{Detection, StatusReport};

/// Last-known device state, as reported by `/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub reported_ip: String,
    /// Firmware-defined mode string (e.g. `"ap"`, `"sta"`).
    pub mode: String,
    pub led_on: bool,
    pub pump_on: bool,
}

impl From<StatusReport> for DeviceStatus {
    fn from(report: StatusReport) -> Self {
        Self {
            reported_ip: report.ip,
            mode: report.mode,
            led_on: report.led,
            pump_on: report.pump,
        }
    }
}

/// Fire/no-fire judgment shown in the detection banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DetectionResult {
    pub is_fire: bool,
    pub score: f64,
    /// When the server produced this result. `None` for the cleared default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<DateTime<Utc>>,
}

impl DetectionResult {
    /// Safe default shown on failure or while idle.
    pub const CLEAR: Self = Self {
        is_fire: false,
        score: 0.0,
        received_at: None,
    };

    pub fn from_detection(detection: Detection, at: DateTime<Utc>) -> Self {
        Self {
            is_fire: detection.is_fire,
            score: detection.score,
            received_at: Some(at),
        }
    }
}

/// The two switchable outputs on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuator {
    Led,
    Pump,
}

impl Actuator {
    pub fn label(self) -> &'static str {
        match self {
            Self::Led => "LED",
            Self::Pump => "Pump",
        }
    }

    /// Read this actuator's flag from a status snapshot.
    pub fn is_on(self, status: &DeviceStatus) -> bool {
        match self {
            Self::Led => status.led_on,
            Self::Pump => status.pump_on,
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
