//! All possible UI actions. Actions are the sole mechanism for state mutation.

use hydrobot_core::{Actuator, DetectionState, LinkState};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ─────────────────────────────────────────────────
    Quit,
    Tick,
    Render,

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,
    /// Drop any pointer gesture in progress.
    CancelPointer,

    // ── Published state ───────────────────────────────────────────
    LinkUpdated(LinkState),
    DetectionUpdated(DetectionState),

    // ── Device ────────────────────────────────────────────────────
    /// Use this text as the device address from the next poll on.
    CommitAddress(String),
    /// One-off `/status` request outside the regular cadence.
    PollNow,
    ToggleActuator(Actuator),
    ProbeStream,
    /// Outcome of a stream probe: the content type, or an error message.
    StreamProbed(Result<String, String>),

    // ── Detection ─────────────────────────────────────────────────
    ToggleDetection,
    CommitServer(String),

    // ── Settings ──────────────────────────────────────────────────
    SaveSettings { address: String, server: String },

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
