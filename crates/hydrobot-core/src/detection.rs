// ── Detection poller ──
//
// Optional loop against the fire-detection server. Two phases, Idle and
// Polling. Each enable/disable bumps a generation counter that lives in
// the published state; a completion only applies if its generation is
// still current, checked under the same watch lock it writes through.

use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use hydrobot_api::{DetectionClient, detect_url};

use crate::config::LinkConfig;
use crate::error::CoreError;
use crate::model::DetectionResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollerPhase {
    #[default]
    Idle,
    Polling,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionState {
    pub phase: PollerPhase,
    /// Last accepted result, [`DetectionResult::CLEAR`] on failure or idle.
    pub result: DetectionResult,
    /// Message of the most recent failed attempt, cleared on success.
    pub last_error: Option<String>,
    /// Attempts completed in the current polling run.
    pub attempts: u64,
    pub last_success: Option<DateTime<Utc>>,
    #[serde(skip)]
    generation: u64,
}

impl Default for DetectionState {
    fn default() -> Self {
        Self {
            phase: PollerPhase::Idle,
            result: DetectionResult::CLEAR,
            last_error: None,
            attempts: 0,
            last_success: None,
            generation: 0,
        }
    }
}

impl DetectionState {
    pub fn is_polling(&self) -> bool {
        self.phase == PollerPhase::Polling
    }

    fn apply_outcome(&mut self, outcome: Result<DetectionResult, &CoreError>) {
        self.attempts += 1;
        match outcome {
            Ok(result) => {
                self.last_success = result.received_at;
                self.result = result;
                self.last_error = None;
            }
            Err(e) => {
                self.result = DetectionResult::CLEAR;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// Handle to the detection loop. Cheaply cloneable.
#[derive(Clone)]
pub struct DetectionPoller {
    inner: Arc<PollerInner>,
}

struct PollerInner {
    client: DetectionClient,
    server: ArcSwap<String>,
    interval: Duration,
    state: watch::Sender<DetectionState>,
    task: Mutex<Option<CancellationToken>>,
}

impl Drop for PollerInner {
    fn drop(&mut self) {
        let task = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = task {
            cancel.cancel();
        }
    }
}

impl DetectionPoller {
    pub fn new(config: &LinkConfig) -> Result<Self, CoreError> {
        let client = DetectionClient::new(&config.transport())?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: DetectionClient, config: &LinkConfig) -> Self {
        let (state, _) = watch::channel(DetectionState::default());
        Self {
            inner: Arc::new(PollerInner {
                client,
                server: ArcSwap::from_pointee(normalize_server(&config.detection_server)),
                interval: config.detection_interval,
                state,
                task: Mutex::new(None),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetectionState> {
        self.inner.state.subscribe()
    }

    pub fn state(&self) -> DetectionState {
        self.inner.state.borrow().clone()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.state.borrow().is_polling()
    }

    /// Detection server base URL currently in effect.
    pub fn server(&self) -> String {
        self.inner.server.load().as_ref().clone()
    }

    /// Commit a new server base URL. Picked up by the next attempt.
    pub fn set_server(&self, server: &str) {
        let server = normalize_server(server);
        info!(server = %server, "detection server changed");
        self.inner.server.store(Arc::new(server));
    }

    /// Start polling. No-op when already polling. Must be called from
    /// within a Tokio runtime.
    pub fn enable(&self) {
        let mut task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if task.is_some() {
            return;
        }

        let mut generation = 0;
        self.inner.state.send_modify(|state| {
            state.generation += 1;
            state.phase = PollerPhase::Polling;
            state.attempts = 0;
            state.last_error = None;
            generation = state.generation;
        });

        let cancel = CancellationToken::new();
        *task = Some(cancel.clone());
        tokio::spawn(detection_task(
            Arc::downgrade(&self.inner),
            self.inner.interval,
            generation,
            cancel,
        ));
        info!(server = %self.server(), "detection polling enabled");
    }

    /// Stop polling and reset the result. Any request still in flight is
    /// discarded when it completes.
    pub fn disable(&self) {
        let task = self
            .inner
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = task {
            cancel.cancel();
        }

        self.inner.state.send_if_modified(|state| {
            let changed = state.phase != PollerPhase::Idle || state.result != DetectionResult::CLEAR;
            state.generation += 1;
            state.phase = PollerPhase::Idle;
            state.result = DetectionResult::CLEAR;
            changed
        });
        debug!("detection polling disabled");
    }

    /// Flip between Idle and Polling. Returns `true` when now polling.
    pub fn toggle(&self) -> bool {
        if self.is_polling() {
            self.disable();
            false
        } else {
            self.enable();
            true
        }
    }

    /// One request against the current server, without touching state.
    pub async fn detect_once(&self) -> Result<DetectionResult, CoreError> {
        let server = self.inner.server.load_full();
        let detection = self.inner.client.detect(&server).await?;
        Ok(DetectionResult::from_detection(detection, Utc::now()))
    }

    /// Apply an attempt's outcome if `generation` is still current.
    fn apply_outcome(&self, generation: u64, outcome: Result<DetectionResult, &CoreError>) -> bool {
        self.inner.state.send_if_modified(|state| {
            if state.generation != generation || state.phase != PollerPhase::Polling {
                return false;
            }
            state.apply_outcome(outcome);
            true
        })
    }
}

/// Trim whitespace and trailing slashes. `detect_url` joins with `/detect`.
fn normalize_server(server: &str) -> String {
    server.trim().trim_end_matches('/').to_owned()
}

/// Attempt, apply, wait, repeat, until cancelled. Only one attempt is
/// ever in flight per run.
async fn detection_task(
    poller: Weak<PollerInner>,
    period: Duration,
    generation: u64,
    cancel: CancellationToken,
) {
    loop {
        let Some(inner) = poller.upgrade() else { break };
        let poller_handle = DetectionPoller { inner };
        debug!(url = %detect_url(&poller_handle.server()), "detection attempt");

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            outcome = poller_handle.detect_once() => outcome,
        };
        if let Err(e) = &outcome {
            debug!(error = %e, "detection attempt failed");
        }
        poller_handle.apply_outcome(generation, outcome.as_ref().copied());
        drop(poller_handle);

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(period) => {}
        }
    }
    debug!(generation, "detection task exited");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn poller() -> DetectionPoller {
        DetectionPoller::new(&LinkConfig::default()).unwrap()
    }

    fn fire(score: f64) -> DetectionResult {
        DetectionResult {
            is_fire: true,
            score,
            received_at: Some(Utc::now()),
        }
    }

    #[test]
    fn failure_resets_to_clear() {
        let mut state = DetectionState {
            phase: PollerPhase::Polling,
            ..DetectionState::default()
        };
        state.apply_outcome(Ok(fire(0.9)));
        assert!(state.result.is_fire);

        let err = CoreError::Timeout;
        state.apply_outcome(Err(&err));
        assert_eq!(state.result, DetectionResult::CLEAR);
        assert_eq!(state.attempts, 2);
        assert!(state.last_error.is_some());
        assert!(state.last_success.is_some(), "last success survives a failure");
    }

    #[test]
    fn server_is_normalized() {
        assert_eq!(normalize_server(" http://10.0.0.2:8000/ "), "http://10.0.0.2:8000");
    }

    #[test]
    fn stale_generation_is_discarded() {
        let poller = poller();
        poller.inner.state.send_modify(|state| {
            state.generation = 3;
            state.phase = PollerPhase::Polling;
        });

        assert!(!poller.apply_outcome(2, Ok(fire(0.8))));
        assert_eq!(poller.state().result, DetectionResult::CLEAR);

        assert!(poller.apply_outcome(3, Ok(fire(0.8))));
        assert!(poller.state().result.is_fire);
    }

    #[test]
    fn disable_clears_result_and_phase() {
        let poller = poller();
        poller.inner.state.send_modify(|state| {
            state.phase = PollerPhase::Polling;
            state.result = fire(0.7);
        });

        poller.disable();

        let state = poller.state();
        assert_eq!(state.phase, PollerPhase::Idle);
        assert_eq!(state.result, DetectionResult::CLEAR);
        assert!(!poller.is_polling());
    }
}
