use thiserror::Error;

/// Coarse failure classes surfaced to the UI layer.
///
/// Every [`Error`] maps onto exactly one of these through [`Error::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network unreachable, timeout, or a non-2xx response.
    Transport,
    /// A response arrived but is missing a required field or acknowledgement.
    Validity,
}

/// Top-level error type for the `hydrobot-api` crate.
///
/// Covers every failure mode of the two HTTP surfaces (camera device and
/// detection server). `hydrobot-core` maps these into user-facing status.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Well-formed response that fails validation (missing field, `ok` not set).
    #[error("Invalid response: {message}")]
    Validity { message: String },
}

impl Error {
    /// Classify this error for display purposes.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) | Self::HttpStatus { .. } | Self::Client(_) => {
                FailureKind::Transport
            }
            Self::Deserialization { .. } | Self::Validity { .. } => FailureKind::Validity,
        }
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    pub(crate) fn validity(message: impl Into<String>) -> Self {
        Self::Validity {
            message: message.into(),
        }
    }
}
