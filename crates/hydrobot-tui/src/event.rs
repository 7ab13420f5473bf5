//! Terminal input for the camera front-end.
//!
//! One background task merges crossterm input with the spinner tick and the
//! frame clock. Input is shaped before the app sees it: key releases and
//! bare pointer motion are dropped, a run of queued drag samples collapses
//! to the newest position, and losing terminal focus becomes
//! [`Event::PointerCancel`] so the joystick never stays deflected when the
//! button is released outside the window.

use std::time::Duration;

use crossterm::event::{
    Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Any pointer gesture in progress ended without a button release.
    PointerCancel,
    Resize(u16, u16),
    /// Spinner and toast clock.
    Tick,
    Render,
}

impl Event {
    fn is_drag(&self) -> bool {
        matches!(self, Self::Mouse(m) if matches!(m.kind, MouseEventKind::Drag(_)))
    }
}

/// Clock rates for the event loop.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    pub tick: Duration,
    pub frame: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            frame: Duration::from_millis(33),
        }
    }
}

/// Translate a raw terminal event, or `None` when the app has no use for it.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Mouse(mouse) if mouse.kind != MouseEventKind::Moved => {
            Some(Event::Mouse(mouse))
        }
        CrosstermEvent::FocusLost => Some(Event::PointerCancel),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

/// Receiving half of the event channel, with drag coalescing.
struct EventQueue {
    rx: mpsc::UnboundedReceiver<Event>,
    held: Option<Event>,
}

impl EventQueue {
    fn new(rx: mpsc::UnboundedReceiver<Event>) -> Self {
        Self { rx, held: None }
    }

    async fn next(&mut self) -> Option<Event> {
        let mut event = match self.held.take() {
            Some(event) => event,
            None => self.rx.recv().await?,
        };
        while event.is_drag() {
            match self.rx.try_recv() {
                Ok(newer) if newer.is_drag() => event = newer,
                Ok(other) => {
                    self.held = Some(other);
                    break;
                }
                Err(_) => break,
            }
        }
        Some(event)
    }
}

/// Owns the reader task. Dropping it stops the task.
pub struct EventReader {
    queue: EventQueue,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn spawn(cadence: Cadence) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_terminal(tx, cadence, cancel.clone()));
        Self {
            queue: EventQueue::new(rx),
            cancel,
        }
    }

    /// Next event, or `None` once the terminal stream has ended.
    pub async fn next(&mut self) -> Option<Event> {
        self.queue.next().await
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_terminal(
    tx: mpsc::UnboundedSender<Event>,
    cadence: Cadence,
    cancel: CancellationToken,
) {
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(cadence.tick);
    let mut frame = tokio::time::interval(cadence.frame);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = frame.tick() => Event::Render,
            raw = input.next() => match raw {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "terminal input error");
                    continue;
                }
                None => break,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}
