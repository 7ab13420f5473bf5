// ── Core error types ──
//
// User-facing errors from hydrobot-core. Consumers never see reqwest
// errors or JSON parse failures directly; the `From<hydrobot_api::Error>`
// impl translates transport-layer errors into these variants.

use thiserror::Error;

use hydrobot_api::FailureKind;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Request rejected with HTTP {status} ({url})")]
    Rejected { status: u16, url: String },

    // ── Validity ─────────────────────────────────────────────────────
    #[error("Invalid response: {message}")]
    Validity { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Failure class for display. Configuration problems surface as
    /// transport failures since no request could be made.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validity { .. } => FailureKind::Validity,
            Self::Unreachable { .. } | Self::Timeout | Self::Rejected { .. } | Self::Config { .. } => {
                FailureKind::Transport
            }
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hydrobot_api::Error> for CoreError {
    fn from(err: hydrobot_api::Error) -> Self {
        match err {
            hydrobot_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else {
                    CoreError::Unreachable {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            hydrobot_api::Error::HttpStatus { status, url } => CoreError::Rejected { status, url },
            hydrobot_api::Error::Client(message) => CoreError::Config { message },
            hydrobot_api::Error::Deserialization { message, body: _ } => {
                CoreError::Validity { message }
            }
            hydrobot_api::Error::Validity { message } => CoreError::Validity { message },
        }
    }
}
