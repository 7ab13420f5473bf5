//! Shared configuration for the HydroBot CLI and TUI.
//!
//! A single TOML file layered under `HYDROBOT_` environment variables,
//! translated into `hydrobot_core::LinkConfig`. Both binaries depend on
//! this crate; the CLI adds flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hydrobot_core::LinkConfig;
use hydrobot_core::config::{DEFAULT_DETECTION_SERVER, DEFAULT_DEVICE_ADDRESS};

/// Environment prefix; nested keys are separated by `__`
/// (e.g. `HYDROBOT_DEVICE__ADDRESS`).
pub const ENV_PREFIX: &str = "HYDROBOT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown config key '{key}'")]
    UnknownKey { key: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceSection,

    #[serde(default)]
    pub detection: DetectionSection,

    #[serde(default)]
    pub polling: PollingSection,

    #[serde(default)]
    pub joystick: JoystickSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceSection {
    /// Camera host, free text (IPv4 literal or hostname).
    #[serde(default = "default_address")]
    pub address: String,

    /// MJPEG stream port.
    #[serde(default = "default_stream_port")]
    pub stream_port: u16,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            stream_port: default_stream_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DetectionSection {
    /// Inference server base URL.
    #[serde(default = "default_server")]
    pub server: String,

    /// Start polling as soon as the camera screen opens.
    #[serde(default)]
    pub enabled_on_start: bool,
}

impl Default for DetectionSection {
    fn default() -> Self {
        Self {
            server: default_server(),
            enabled_on_start: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PollingSection {
    #[serde(default = "default_status_interval")]
    pub status_interval_ms: u64,

    #[serde(default = "default_detection_interval")]
    pub detection_interval_ms: u64,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for PollingSection {
    fn default() -> Self {
        Self {
            status_interval_ms: default_status_interval(),
            detection_interval_ms: default_detection_interval(),
            timeout_secs: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JoystickSection {
    #[serde(default = "default_radius")]
    pub radius: f64,
}

impl Default for JoystickSection {
    fn default() -> Self {
        Self {
            radius: default_radius(),
        }
    }
}

fn default_address() -> String {
    DEFAULT_DEVICE_ADDRESS.into()
}
fn default_stream_port() -> u16 {
    hydrobot_core::config::DEFAULT_STREAM_PORT
}
fn default_server() -> String {
    DEFAULT_DETECTION_SERVER.into()
}
fn default_status_interval() -> u64 {
    5000
}
fn default_detection_interval() -> u64 {
    500
}
fn default_timeout() -> u64 {
    4
}
fn default_radius() -> f64 {
    hydrobot_core::DEFAULT_RADIUS
}

/// Keys accepted by [`Config::set`], in display order.
pub const KEYS: &[&str] = &[
    "device.address",
    "device.stream_port",
    "detection.server",
    "detection.enabled_on_start",
    "polling.status_interval_ms",
    "polling.detection_interval_ms",
    "polling.timeout_secs",
    "joystick.radius",
];

impl Config {
    /// Set a single value by dotted key, parsing it to the field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "device.address" => self.device.address = value.to_owned(),
            "device.stream_port" => self.device.stream_port = parse_field(key, value)?,
            "detection.server" => self.detection.server = value.to_owned(),
            "detection.enabled_on_start" => {
                self.detection.enabled_on_start = parse_field(key, value)?;
            }
            "polling.status_interval_ms" => self.polling.status_interval_ms = parse_field(key, value)?,
            "polling.detection_interval_ms" => {
                self.polling.detection_interval_ms = parse_field(key, value)?;
            }
            "polling.timeout_secs" => self.polling.timeout_secs = parse_field(key, value)?,
            "joystick.radius" => self.joystick.radius = parse_field(key, value)?,
            other => {
                return Err(ConfigError::UnknownKey {
                    key: other.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Every settable key with its current value, in [`KEYS`] order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device.address", self.device.address.clone()),
            ("device.stream_port", self.device.stream_port.to_string()),
            ("detection.server", self.detection.server.clone()),
            (
                "detection.enabled_on_start",
                self.detection.enabled_on_start.to_string(),
            ),
            (
                "polling.status_interval_ms",
                self.polling.status_interval_ms.to_string(),
            ),
            (
                "polling.detection_interval_ms",
                self.polling.detection_interval_ms.to_string(),
            ),
            ("polling.timeout_secs", self.polling.timeout_secs.to_string()),
            ("joystick.radius", self.joystick.radius.to_string()),
        ]
    }

    /// Validate and translate into the runtime configuration.
    ///
    /// The device address and detection server are free text and never
    /// rejected here; a bad value shows up as a connection failure on the
    /// first request. See [`server_advisory`] for a non-fatal hint.
    pub fn to_link_config(&self) -> Result<LinkConfig, ConfigError> {
        if self.polling.status_interval_ms == 0 {
            return Err(invalid("polling.status_interval_ms", "must be greater than zero"));
        }
        if self.polling.detection_interval_ms == 0 {
            return Err(invalid("polling.detection_interval_ms", "must be greater than zero"));
        }
        if self.polling.timeout_secs == 0 {
            return Err(invalid("polling.timeout_secs", "must be greater than zero"));
        }
        if !(self.joystick.radius.is_finite() && self.joystick.radius > 0.0) {
            return Err(invalid(
                "joystick.radius",
                format!("must be a positive number, got {}", self.joystick.radius),
            ));
        }

        Ok(LinkConfig {
            device_address: self.device.address.trim().to_owned(),
            stream_port: self.device.stream_port,
            detection_server: self.detection.server.trim().to_owned(),
            status_interval: Duration::from_millis(self.polling.status_interval_ms),
            detection_interval: Duration::from_millis(self.polling.detection_interval_ms),
            joystick_radius: self.joystick.radius,
            timeout: Duration::from_secs(self.polling.timeout_secs),
        })
    }
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, format!("cannot parse '{value}'")))
}

/// Hint for a detection server that will not work as a request base.
///
/// `None` when the value is an absolute http(s) URL. The value is still
/// used as entered either way.
pub fn server_advisory(server: &str) -> Option<String> {
    match server.trim().parse::<url::Url>() {
        Ok(url) if matches!(url.scheme(), "http" | "https") => None,
        Ok(url) => Some(format!(
            "detection server '{}' uses scheme '{}', expected http or https",
            server.trim(),
            url.scheme()
        )),
        Err(e) => Some(format!(
            "detection server '{}' is not an absolute URL ({e})",
            server.trim()
        )),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "hydrobot", "hydrobot").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hydrobot");
    p
}

/// Directory for log files written by the TUI.
pub fn log_dir() -> PathBuf {
    ProjectDirs::from("dev", "hydrobot", "hydrobot").map_or_else(
        || dirs_fallback().join("logs"),
        |dirs| dirs.data_local_dir().join("logs"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) plus environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_runtime_defaults() {
        let link = Config::default().to_link_config().unwrap();
        assert_eq!(link, LinkConfig::default());
    }

    #[test]
    fn set_parses_typed_values() {
        let mut cfg = Config::default();
        cfg.set("device.address", " 10.0.0.5 ").unwrap();
        cfg.set("polling.status_interval_ms", "2500").unwrap();
        cfg.set("detection.enabled_on_start", "true").unwrap();

        assert_eq!(cfg.device.address, "10.0.0.5");
        assert_eq!(cfg.polling.status_interval_ms, 2500);
        assert!(cfg.detection.enabled_on_start);
    }

    #[test]
    fn set_rejects_bad_input() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("polling.timeout_secs", "soon"),
            Err(ConfigError::Validation { .. })
        ));
        assert!(matches!(
            cfg.set("device.colour", "red"),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn every_key_is_settable() {
        let mut cfg = Config::default();
        for key in KEYS {
            let value = match *key {
                "device.address" | "detection.server" => "http://10.0.0.1",
                "detection.enabled_on_start" => "false",
                "joystick.radius" => "48.5",
                _ => "7",
            };
            cfg.set(key, value).unwrap();
        }
    }

    #[test]
    fn entries_cover_every_key() {
        let keys: Vec<_> = Config::default().entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, KEYS);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut cfg = Config::default();
        cfg.polling.detection_interval_ms = 0;
        let err = cfg.to_link_config().unwrap_err();
        assert!(err.to_string().contains("detection_interval_ms"));
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let mut cfg = Config::default();
        cfg.joystick.radius = -1.0;
        assert!(cfg.to_link_config().is_err());
    }

    #[test]
    fn scheme_less_server_is_accepted() {
        let mut cfg = Config::default();
        cfg.detection.server = "192.168.4.2:8000".into();
        let link = cfg.to_link_config().unwrap();
        assert_eq!(link.detection_server, "192.168.4.2:8000");
    }

    #[test]
    fn server_advisory_flags_non_http_values() {
        assert_eq!(server_advisory("http://192.168.4.2:8000"), None);
        assert_eq!(server_advisory(" https://fire.example/ "), None);
        assert!(server_advisory("ftp://192.168.4.2").unwrap().contains("ftp"));
        assert!(server_advisory("192.168.4.2:8000/").is_some());
    }

    #[test]
    fn address_is_never_rejected() {
        let mut cfg = Config::default();
        cfg.device.address = "not a host!".into();
        assert_eq!(cfg.to_link_config().unwrap().device_address, "not a host!");
    }
}
