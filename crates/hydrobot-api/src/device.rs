// Camera device HTTP client
//
// Thin wrapper around `reqwest::Client` for the ESP32-CAM firmware's tiny
// GET-only API. The client holds no address: every call takes the
// `DeviceEndpoints` current at issue time, so an operator editing the
// address never races a long-lived client.

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, trace};

use crate::endpoints::DeviceEndpoints;
use crate::error::Error;
use crate::models::{RawStatus, StatusReport, StreamProbe};
use crate::transport::{TransportConfig, get_checked, get_json};

/// Raw HTTP client for the camera device.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
}

impl DeviceClient {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Create a device client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// `GET /status` → validated [`StatusReport`].
    pub async fn status(&self, endpoints: &DeviceEndpoints) -> Result<StatusReport, Error> {
        let raw: RawStatus = get_json(&self.http, &endpoints.status_url()).await?;
        let report = StatusReport::try_from(raw)?;
        trace!(?report, "status report");
        Ok(report)
    }

    /// `GET /led?on={0|1}`. The response body is ignored.
    pub async fn set_led(&self, endpoints: &DeviceEndpoints, on: bool) -> Result<(), Error> {
        get_checked(&self.http, &endpoints.led_url(on)).await?;
        debug!(on, "led command accepted");
        Ok(())
    }

    /// `GET /pump?on={0|1}`. The response body is ignored.
    pub async fn set_pump(&self, endpoints: &DeviceEndpoints, on: bool) -> Result<(), Error> {
        get_checked(&self.http, &endpoints.pump_url(on)).await?;
        debug!(on, "pump command accepted");
        Ok(())
    }

    /// Open the MJPEG stream and report its headers.
    ///
    /// The stream body never ends, so the response is dropped as soon as
    /// headers arrive, which closes the connection without reading frames.
    pub async fn probe_stream(&self, endpoints: &DeviceEndpoints) -> Result<StreamProbe, Error> {
        let url = endpoints.stream_url();
        debug!("PROBE {url}");

        let resp = self.http.get(&url).send().await?;
        let probe = StreamProbe {
            status: resp.status().as_u16(),
            content_type: resp
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            url,
        };
        drop(resp);

        if !(200..300).contains(&probe.status) {
            return Err(Error::HttpStatus {
                status: probe.status,
                url: probe.url,
            });
        }
        Ok(probe)
    }
}
