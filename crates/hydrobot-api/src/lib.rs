// hydrobot-api: Async Rust client for the HydroBot camera device and detection server

pub mod detection;
pub mod device;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod transport;

pub use detection::DetectionClient;
pub use device::DeviceClient;
pub use endpoints::{DEFAULT_STREAM_PORT, DeviceEndpoints, detect_url};
pub use error::{Error, FailureKind};
pub use models::{Detection, StatusReport, StreamProbe};
pub use transport::TransportConfig;
