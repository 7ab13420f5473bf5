//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hydrobot_config::ConfigError;
use hydrobot_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const INVALID_RESPONSE: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach {url}")]
    #[diagnostic(
        code(hydrobot::connection_failed),
        help(
            "Falha ao conectar. Confira o Wi-Fi HYDROBOT-CAM e o IP.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(hydrobot::timeout),
        help("Increase the timeout with --timeout or move closer to the access point.")
    )]
    Timeout,

    #[error("{url} answered HTTP {status}")]
    #[diagnostic(code(hydrobot::rejected))]
    Rejected { status: u16, url: String },

    // ── Validity ─────────────────────────────────────────────────────
    #[error("Invalid response: {message}")]
    #[diagnostic(
        code(hydrobot::invalid_response),
        help("The server answered, but not with the document this client expects.")
    )]
    InvalidResponse { message: String },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hydrobot::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown config key '{key}'")]
    #[diagnostic(code(hydrobot::unknown_key), help("Valid keys: {valid}"))]
    UnknownKey { key: String, valid: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(hydrobot::config_exists),
        help("Use --force to overwrite it, or edit values with: hydrobot config set")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(hydrobot::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(hydrobot::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout | Self::Rejected { .. } => {
                exit_code::CONNECTION
            }
            Self::InvalidResponse { .. } => exit_code::INVALID_RESPONSE,
            Self::Validation { .. }
            | Self::UnknownKey { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::Io(_) | Self::Render(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout => CliError::Timeout,
            CoreError::Rejected { status, url } => CliError::Rejected { status, url },
            CoreError::Validity { message } => CliError::InvalidResponse { message },
            CoreError::Config { message } => CliError::Validation {
                field: "transport".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownKey { key } => CliError::UnknownKey {
                key,
                valid: hydrobot_config::KEYS.join(", "),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::Render(e.to_string()),
        }
    }
}
