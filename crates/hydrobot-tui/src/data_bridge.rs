//! Data bridge: forwards published core state into the TUI action loop.
//!
//! Runs as a background task, subscribed to the device link and detection
//! poller watch channels, forwarding every change as an [`Action`].

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use hydrobot_core::{DetectionState, LinkState};

use crate::action::Action;

/// Forward every link / detection state change until cancelled.
///
/// The current values are sent first so screens render immediately. Ends
/// when either source is dropped.
pub async fn spawn_data_bridge(
    mut link: watch::Receiver<LinkState>,
    mut detection: watch::Receiver<DetectionState>,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::LinkUpdated(link.borrow_and_update().clone()));
    let _ = action_tx.send(Action::DetectionUpdated(
        detection.borrow_and_update().clone(),
    ));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            changed = link.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = link.borrow_and_update().clone();
                if action_tx.send(Action::LinkUpdated(state)).is_err() {
                    break;
                }
            }
            changed = detection.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = detection.borrow_and_update().clone();
                if action_tx.send(Action::DetectionUpdated(state)).is_err() {
                    break;
                }
            }
        }
    }

    debug!("data bridge shut down");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sends_snapshots_then_changes() {
        let (link_tx, link_rx) = watch::channel(LinkState::default());
        let (_det_tx, det_rx) = watch::channel(DetectionState::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(spawn_data_bridge(link_rx, det_rx, tx, cancel.clone()));

        assert!(matches!(rx.recv().await, Some(Action::LinkUpdated(_))));
        assert!(matches!(rx.recv().await, Some(Action::DetectionUpdated(_))));

        link_tx.send_modify(|s| s.message = "changed".into());
        match rx.recv().await {
            Some(Action::LinkUpdated(state)) => assert_eq!(state.message, "changed"),
            other => panic!("expected LinkUpdated, got {other:?}"),
        }

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test]
    async fn stops_when_a_source_closes() {
        let (link_tx, link_rx) = watch::channel(LinkState::default());
        let (_det_tx, det_rx) = watch::channel(DetectionState::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(spawn_data_bridge(
            link_rx,
            det_rx,
            tx,
            CancellationToken::new(),
        ));
        drop(link_tx);
        task.await.unwrap();
    }
}
