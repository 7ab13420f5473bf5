// Fire-detection server HTTP client
//
// The inference server is a separate host, configured independently of the
// camera. Only `GET {base}/detect` is consumed.

use crate::endpoints::detect_url;
use crate::error::Error;
use crate::models::{Detection, RawDetection};
use crate::transport::{TransportConfig, get_json};

/// Raw HTTP client for the detection server.
#[derive(Debug, Clone)]
pub struct DetectionClient {
    http: reqwest::Client,
}

impl DetectionClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `GET {server_base}/detect` → validated [`Detection`].
    ///
    /// A response without `ok: true` is an [`Error::Validity`].
    pub async fn detect(&self, server_base: &str) -> Result<Detection, Error> {
        let raw: RawDetection = get_json(&self.http, &detect_url(server_base)).await?;
        Detection::try_from(raw)
    }
}
