// Wire types for the device `/status` and detection `/detect` documents.
//
// Both servers are small firmware/scripts outside our control, so fields
// are first captured loosely as `serde_json::Value` and then validated
// into typed results. Anything missing or unrecognisable is a
// `Error::Validity`, never a panic or a silently defaulted field.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

// ── Device status ───────────────────────────────────────────────────

/// Parsed and validated `/status` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Address the device reports for itself.
    pub ip: String,
    /// Firmware-defined operating mode (e.g. `"ap"`). Opaque to us.
    pub mode: String,
    pub led: bool,
    pub pump: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawStatus {
    ip: Option<Value>,
    mode: Option<Value>,
    led: Option<Value>,
    pump: Option<Value>,
}

impl TryFrom<RawStatus> for StatusReport {
    type Error = Error;

    fn try_from(raw: RawStatus) -> Result<Self, Self::Error> {
        Ok(Self {
            ip: required_text("ip", raw.ip.as_ref())?,
            mode: required_text("mode", raw.mode.as_ref())?,
            led: required_flag("led", raw.led.as_ref())?,
            pump: required_flag("pump", raw.pump.as_ref())?,
        })
    }
}

// ── Detection ───────────────────────────────────────────────────────

/// A validated fire/no-fire judgment from the inference server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub is_fire: bool,
    /// Confidence as reported by the server. Not range-checked.
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawDetection {
    ok: Option<Value>,
    #[serde(rename = "isFire", alias = "is_fire")]
    is_fire: Option<Value>,
    score: Option<Value>,
}

impl TryFrom<RawDetection> for Detection {
    type Error = Error;

    fn try_from(raw: RawDetection) -> Result<Self, Self::Error> {
        let acknowledged = raw.ok.as_ref().and_then(bool_like).unwrap_or(false);
        if !acknowledged {
            return Err(Error::validity("detection result not marked ok"));
        }

        let score = raw
            .score
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|s| s.is_finite())
            .ok_or_else(|| Error::validity("missing or non-numeric field `score`"))?;

        Ok(Self {
            is_fire: required_flag("isFire", raw.is_fire.as_ref())?,
            score,
        })
    }
}

// ── Stream probe ────────────────────────────────────────────────────

/// Header-only inspection of the MJPEG endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamProbe {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
}

impl StreamProbe {
    /// MJPEG is served as `multipart/x-mixed-replace`; accept any multipart.
    pub fn is_multipart(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("multipart/"))
    }
}

// ── Field helpers ───────────────────────────────────────────────────

/// Interpret a JSON value the way the firmware tends to encode switches.
pub(crate) fn bool_like(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "on" | "true" => Some(true),
            "0" | "off" | "false" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn required_flag(field: &str, value: Option<&Value>) -> Result<bool, Error> {
    let value = value.ok_or_else(|| Error::validity(format!("missing field `{field}`")))?;
    bool_like(value).ok_or_else(|| Error::validity(format!("field `{field}` is not a switch value: {value}")))
}

fn required_text(field: &str, value: Option<&Value>) -> Result<String, Error> {
    match value {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(Error::validity(format!(
            "field `{field}` has unexpected type: {other}"
        ))),
        None => Err(Error::validity(format!("missing field `{field}`"))),
    }
}
