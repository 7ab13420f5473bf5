// ── Device link ──
//
// Best-effort, eventually consistent view of the camera device plus the
// imperative LED / pump commands. Every poll and command takes a ticket
// when it is issued; a completion writes a field only if its ticket is
// newer than the one that last wrote that field. A stale `/status` that
// was already in flight when a command was sent therefore cannot undo the
// command's optimistic update.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use hydrobot_api::{DeviceClient, DeviceEndpoints, StreamProbe};

use crate::config::LinkConfig;
use crate::error::CoreError;
use crate::model::{Actuator, DeviceStatus};
use crate::status_line;

// ── Published state ──────────────────────────────────────────────

/// Ticket of the operation that last wrote each field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FieldVersions {
    snapshot: u64,
    led: u64,
    pump: u64,
    message: u64,
}

/// Everything the presentation layer renders for the device.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkState {
    /// Last-known device state. Flags may be ahead of the last poll
    /// after an optimistic command.
    pub device: DeviceStatus,
    /// One-line human readable status.
    pub message: String,
    /// A status poll is in flight.
    pub checking: bool,
    /// When `/status` last succeeded. `None` until the first success.
    pub last_success: Option<DateTime<Utc>>,
    /// A [`LinkSession`] is currently polling.
    pub active: bool,
    versions: FieldVersions,
    in_flight: u32,
    epoch: u64,
}

impl Default for LinkState {
    fn default() -> Self {
        Self {
            device: DeviceStatus::default(),
            message: status_line::PLACEHOLDER.into(),
            checking: false,
            last_success: None,
            active: false,
            versions: FieldVersions::default(),
            in_flight: 0,
            epoch: 0,
        }
    }
}

impl LinkState {
    pub fn led_on(&self) -> bool {
        self.device.led_on
    }

    pub fn pump_on(&self) -> bool {
        self.device.pump_on
    }

    fn begin_poll(&mut self) {
        self.in_flight += 1;
        self.checking = true;
    }

    fn end_poll(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.checking = self.in_flight > 0;
    }

    fn apply_poll_success(&mut self, ticket: u64, status: &DeviceStatus, at: DateTime<Utc>) {
        self.end_poll();

        if ticket > self.versions.snapshot {
            self.device.reported_ip.clone_from(&status.reported_ip);
            self.device.mode.clone_from(&status.mode);
            self.last_success = Some(at);
            self.versions.snapshot = ticket;
        }
        if ticket > self.versions.led {
            self.device.led_on = status.led_on;
            self.versions.led = ticket;
        }
        if ticket > self.versions.pump {
            self.device.pump_on = status.pump_on;
            self.versions.pump = ticket;
        }
        if ticket > self.versions.message {
            self.message = status_line::ok_line(status);
            self.versions.message = ticket;
        }
    }

    fn apply_poll_failure(&mut self, ticket: u64) {
        self.end_poll();

        if ticket > self.versions.message {
            self.message = status_line::CONNECTION_ADVISORY.into();
            self.versions.message = ticket;
        }
    }

    fn apply_command(&mut self, ticket: u64, actuator: Actuator, on: bool, ok: bool) {
        if ok {
            let (flag, version) = match actuator {
                Actuator::Led => (&mut self.device.led_on, &mut self.versions.led),
                Actuator::Pump => (&mut self.device.pump_on, &mut self.versions.pump),
            };
            if ticket > *version {
                *flag = on;
                *version = ticket;
            }
        }

        if ticket > self.versions.message {
            self.message = if ok {
                status_line::with_command_note(
                    &self.message,
                    status_line::command_note(actuator, on),
                )
            } else {
                status_line::command_failure(actuator).into()
            };
            self.versions.message = ticket;
        }
    }
}

// ── DeviceLink ───────────────────────────────────────────────────

/// Handle to the camera device.
///
/// Cheaply cloneable via `Arc`. Polling only runs while a [`LinkSession`]
/// returned by [`activate()`](Self::activate) is alive.
#[derive(Clone)]
pub struct DeviceLink {
    inner: Arc<LinkInner>,
}

struct LinkInner {
    client: DeviceClient,
    stream_port: u16,
    /// Swapped wholesale on edit so every derived URL changes together.
    endpoints: ArcSwap<DeviceEndpoints>,
    status_interval: Duration,
    state: watch::Sender<LinkState>,
    next_ticket: AtomicU64,
    /// Token of the current polling session, if any.
    session: Mutex<Option<CancellationToken>>,
}

impl Drop for LinkInner {
    fn drop(&mut self) {
        let session = self
            .session
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = session {
            cancel.cancel();
        }
    }
}

impl DeviceLink {
    /// Build a link with its own HTTP client from `config`.
    pub fn new(config: &LinkConfig) -> Result<Self, CoreError> {
        let client = DeviceClient::new(&config.transport())?;
        Ok(Self::with_client(client, config))
    }

    /// Build a link around an existing client (tests, shared clients).
    pub fn with_client(client: DeviceClient, config: &LinkConfig) -> Self {
        let endpoints = DeviceEndpoints::new(config.device_address.as_str())
            .with_stream_port(config.stream_port);
        let (state, _) = watch::channel(LinkState::default());

        Self {
            inner: Arc::new(LinkInner {
                client,
                stream_port: config.stream_port,
                endpoints: ArcSwap::from_pointee(endpoints),
                status_interval: config.status_interval,
                state,
                next_ticket: AtomicU64::new(1),
                session: Mutex::new(None),
            }),
        }
    }

    // ── Address ──────────────────────────────────────────────────

    /// The device address currently in effect.
    pub fn address(&self) -> String {
        self.inner.endpoints.load().address().to_owned()
    }

    /// Commit a new device address.
    ///
    /// Requests already in flight keep their old address; everything
    /// issued afterwards (including the next poll tick) uses the new one.
    pub fn set_address(&self, address: &str) {
        let endpoints = DeviceEndpoints::new(address).with_stream_port(self.inner.stream_port);
        if endpoints.address() != self.inner.endpoints.load().address() {
            info!(address = %endpoints, "device address changed");
        }
        self.inner.endpoints.store(Arc::new(endpoints));
    }

    /// `http://{address}:81/stream` for the embedded video surface.
    pub fn stream_url(&self) -> String {
        self.inner.endpoints.load().stream_url()
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.inner.state.subscribe()
    }

    /// Current state snapshot.
    pub fn state(&self) -> LinkState {
        self.inner.state.borrow().clone()
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Start the periodic status loop: one poll immediately, then one
    /// every `status_interval`.
    ///
    /// Polling stops when the returned session is dropped. Activating
    /// again ends any previous session first. Must be called from within
    /// a Tokio runtime.
    pub fn activate(&self) -> LinkSession {
        let cancel = CancellationToken::new();

        let previous = self
            .inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(cancel.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let mut epoch = 0;
        self.inner.state.send_modify(|state| {
            state.epoch += 1;
            state.active = true;
            state.in_flight = 0;
            state.checking = false;
            epoch = state.epoch;
        });

        tokio::spawn(status_poll_task(
            Arc::downgrade(&self.inner),
            self.inner.status_interval,
            epoch,
            cancel.clone(),
        ));
        debug!(epoch, "device link activated");

        LinkSession {
            link: Arc::downgrade(&self.inner),
            cancel,
            epoch,
        }
    }

    /// Stop the status loop if one is running. In-flight results from the
    /// ended session are discarded.
    pub fn deactivate(&self) {
        let session = self
            .inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(cancel) = session {
            cancel.cancel();
        }
        let epoch = self.current_epoch();
        self.end_session(epoch);
    }

    pub fn is_active(&self) -> bool {
        self.inner.state.borrow().active
    }

    fn end_session(&self, epoch: u64) {
        let ended = self.inner.state.send_if_modified(|state| {
            if state.epoch != epoch || !state.active {
                return false;
            }
            state.epoch += 1;
            state.active = false;
            state.in_flight = 0;
            state.checking = false;
            true
        });
        if ended {
            debug!(epoch, "device link deactivated");
        }
    }

    // ── Operations ───────────────────────────────────────────────

    /// Poll `/status` once and apply the result.
    ///
    /// On failure the device snapshot is left untouched and only the status
    /// line changes. The error is returned for callers that want it (CLI);
    /// the poll loop ignores it.
    pub async fn poll_status(&self) -> Result<DeviceStatus, CoreError> {
        self.poll_in_epoch(self.current_epoch()).await
    }

    async fn poll_in_epoch(&self, epoch: u64) -> Result<DeviceStatus, CoreError> {
        let ticket = self.next_ticket();
        let endpoints = self.inner.endpoints.load_full();
        self.apply(epoch, LinkState::begin_poll);

        match self.inner.client.status(&endpoints).await {
            Ok(report) => {
                let status = DeviceStatus::from(report);
                let now = Utc::now();
                self.apply(epoch, |state| state.apply_poll_success(ticket, &status, now));
                Ok(status)
            }
            Err(e) => {
                debug!(error = %e, address = %endpoints, "status poll failed");
                self.apply(epoch, |state| state.apply_poll_failure(ticket));
                Err(e.into())
            }
        }
    }

    /// Switch the LED. On success `led_on` is set immediately without
    /// waiting for the next poll.
    pub async fn set_led(&self, on: bool) -> Result<(), CoreError> {
        self.command(Actuator::Led, on).await
    }

    /// Switch the pump. Same semantics as [`set_led`](Self::set_led).
    pub async fn set_pump(&self, on: bool) -> Result<(), CoreError> {
        self.command(Actuator::Pump, on).await
    }

    /// Flip the LED relative to the last-known state. Returns the target.
    pub async fn toggle_led(&self) -> Result<bool, CoreError> {
        self.toggle(Actuator::Led).await
    }

    /// Flip the pump relative to the last-known state. Returns the target.
    pub async fn toggle_pump(&self) -> Result<bool, CoreError> {
        self.toggle(Actuator::Pump).await
    }

    pub async fn toggle(&self, actuator: Actuator) -> Result<bool, CoreError> {
        let target = !actuator.is_on(&self.inner.state.borrow().device);
        self.command(actuator, target).await?;
        Ok(target)
    }

    pub async fn command(&self, actuator: Actuator, on: bool) -> Result<(), CoreError> {
        let epoch = self.current_epoch();
        let ticket = self.next_ticket();
        let endpoints = self.inner.endpoints.load_full();

        let result = match actuator {
            Actuator::Led => self.inner.client.set_led(&endpoints, on).await,
            Actuator::Pump => self.inner.client.set_pump(&endpoints, on).await,
        };

        let ok = result.is_ok();
        self.apply(epoch, |state| state.apply_command(ticket, actuator, on, ok));

        result.map_err(|e| {
            warn!(error = %e, %actuator, on, "command failed");
            e.into()
        })
    }

    /// Check that the MJPEG stream answers, without reading any frames.
    pub async fn probe_stream(&self) -> Result<StreamProbe, CoreError> {
        let endpoints = self.inner.endpoints.load_full();
        Ok(self.inner.client.probe_stream(&endpoints).await?)
    }

    // ── Internals ────────────────────────────────────────────────

    fn next_ticket(&self) -> u64 {
        self.inner.next_ticket.fetch_add(1, Ordering::Relaxed)
    }

    fn current_epoch(&self) -> u64 {
        self.inner.state.borrow().epoch
    }

    /// Mutate state only if `epoch` is still current. The check and the
    /// write happen under the same watch lock.
    fn apply(&self, epoch: u64, f: impl FnOnce(&mut LinkState)) -> bool {
        self.inner.state.send_if_modified(|state| {
            if state.epoch != epoch {
                return false;
            }
            f(state);
            true
        })
    }
}

// ── LinkSession ──────────────────────────────────────────────────

/// Scoped polling session. Dropping it cancels the loop and discards the
/// results of any poll or command still in flight from this session.
#[must_use = "status polling stops as soon as the session is dropped"]
pub struct LinkSession {
    link: Weak<LinkInner>,
    cancel: CancellationToken,
    epoch: u64,
}

impl LinkSession {
    /// End the session explicitly. Cancellation happens in `Drop`.
    pub fn deactivate(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(inner) = self.link.upgrade() {
            DeviceLink { inner }.end_session(self.epoch);
        }
    }
}

// ── Background task ──────────────────────────────────────────────

/// Poll `/status` on every tick until cancelled. The first tick fires
/// immediately. Holds only a weak reference between ticks so a forgotten
/// session cannot keep the link alive.
async fn status_poll_task(
    link: Weak<LinkInner>,
    period: Duration,
    epoch: u64,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let Some(inner) = link.upgrade() else { break };
                let link = DeviceLink { inner };
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = link.poll_in_epoch(epoch) => {}
                }
            }
        }
    }
    debug!(epoch, "status poll task exited");
}
