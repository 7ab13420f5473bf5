// Shared transport configuration for building reqwest::Client instances.
//
// The device and detection clients share timeout and user-agent settings
// through this module, avoiding duplicated builder logic.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Error;

const USER_AGENT: &str = concat!("hydrobot/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request timeout. The device sits on a local access point, so
    /// anything slower than a few seconds is treated as unreachable.
    pub timeout: Duration,
    /// Timeout for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(4),
            connect_timeout: Duration::from_secs(3),
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout.min(Self::default().connect_timeout),
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Client(e.to_string()))
    }
}

// ── Request helpers ──────────────────────────────────────────────

/// Send a GET and fail on any non-2xx status.
pub(crate) async fn get_checked(
    http: &reqwest::Client,
    url: &str,
) -> Result<reqwest::Response, Error> {
    debug!("GET {url}");

    let resp = http.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    Ok(resp)
}

/// Send a GET and decode the body as JSON into `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
) -> Result<T, Error> {
    let body = get_checked(http, url).await?.text().await?;

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

/// First ~200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_timeout_caps_connect_timeout() {
        let cfg = TransportConfig::with_timeout(Duration::from_secs(1));
        assert_eq!(cfg.timeout, Duration::from_secs(1));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(1));

        let cfg = TransportConfig::with_timeout(Duration::from_secs(30));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let body = format!("{}é", "a".repeat(199));
        assert_eq!(preview(&body).len(), 199);
        assert_eq!(preview("short"), "short");
    }
}
