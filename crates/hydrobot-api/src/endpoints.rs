//! URL derivation for the camera device and detection server.
//!
//! The device address is free text typed by the operator. It is never
//! validated here: a value that does not form a usable URL surfaces later
//! as a transport failure on the request that uses it.

use std::fmt;

/// Port the camera firmware serves the MJPEG stream on.
pub const DEFAULT_STREAM_PORT: u16 = 81;

/// Endpoint set derived from a single device address.
///
/// Constructing a new value is the only way to change the address, so all
/// derived URLs always agree with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEndpoints {
    address: String,
    stream_port: u16,
}

impl DeviceEndpoints {
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        let trimmed = address.trim();
        Self {
            address: if trimmed.len() == address.len() {
                address
            } else {
                trimmed.to_owned()
            },
            stream_port: DEFAULT_STREAM_PORT,
        }
    }

    /// Override the MJPEG port (port-forwarded devices, test servers).
    pub fn with_stream_port(mut self, port: u16) -> Self {
        self.stream_port = port;
        self
    }

    /// The address as entered (surrounding whitespace removed).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// `http://{address}/status`
    pub fn status_url(&self) -> String {
        format!("http://{}/status", self.address)
    }

    /// `http://{address}/led?on={0|1}`
    pub fn led_url(&self, on: bool) -> String {
        format!("http://{}/led?on={}", self.address, on_flag(on))
    }

    /// `http://{address}/pump?on={0|1}`
    pub fn pump_url(&self, on: bool) -> String {
        format!("http://{}/pump?on={}", self.address, on_flag(on))
    }

    /// `http://{address}:81/stream`
    ///
    /// The port is appended verbatim; an address that already carries a
    /// port yields an unusable URL, matching how the firmware is reached.
    pub fn stream_url(&self) -> String {
        format!("http://{}:{}/stream", self.address, self.stream_port)
    }
}

impl fmt::Display for DeviceEndpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// `{server_base}/detect`, tolerating a trailing slash on the base.
pub fn detect_url(server_base: &str) -> String {
    format!("{}/detect", server_base.trim().trim_end_matches('/'))
}

fn on_flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}
