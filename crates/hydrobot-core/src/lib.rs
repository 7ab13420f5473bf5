//! Operational core of the HydroBot camera screen.
//!
//! Three independent components, each owning its own published state:
//!
//! - **[`DeviceLink`]** holds the camera's address, polls `/status` on a
//!   fixed cadence while a [`LinkSession`] is alive, and issues LED / pump
//!   commands with optimistic local updates. Results are versioned so a
//!   slow poll can never overwrite a newer command.
//!
//! - **[`DetectionPoller`]** runs an optional `Idle`/`Polling` loop against a
//!   separate inference server. A generation counter guarantees that a
//!   request in flight when polling is disabled never touches state.
//!
//! - **[`JoystickTracker`]** maps pointer displacement onto the unit disk
//!   and springs back to center on release.
//!
//! State is published through `tokio::sync::watch` channels; front-ends
//! (CLI / TUI) only read.

pub mod config;
pub mod detection;
pub mod error;
pub mod joystick;
pub mod link;
pub mod model;
pub mod status_line;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::LinkConfig;
pub use detection::{DetectionPoller, DetectionState, PollerPhase};
pub use error::CoreError;
pub use joystick::{DEFAULT_RADIUS, JoystickTracker, JoystickVector};
pub use link::{DeviceLink, LinkSession, LinkState};
pub use model::{Actuator, DetectionResult, DeviceStatus};

pub use hydrobot_api::{FailureKind, StreamProbe};
