//! Side effects of starting a new round.

use std::time::Duration;

use reveal_core::Epoch;
use tokio::sync::watch;
use viewport_client::ViewportSlot;

use crate::config::WorldView;

/// What background round tasks watch: the live epoch and whether a reveal
/// has begun under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RoundSignal {
    pub epoch: Epoch,
    pub reveal_started: bool,
}

impl RoundSignal {
    pub(crate) fn new(epoch: Epoch) -> Self {
        Self {
            epoch,
            reveal_started: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecenterOutcome {
    Recentered,
    /// Viewport never became ready in time.
    Skipped,
    /// Another reset happened while waiting.
    Superseded,
    /// A reveal began first and owns the camera for this round.
    Preempted,
}

/// Return the map to the world view once the viewport is ready.
///
/// A viewport that never reports ready is not fatal: the recenter is skipped
/// after `ready_timeout` and the round carries on. Once a reveal has begun
/// the recenter is dropped, however late readiness arrives.
pub(crate) async fn recenter_after_reset(
    viewport: ViewportSlot,
    signal_rx: watch::Receiver<RoundSignal>,
    epoch: Epoch,
    view: WorldView,
    ready_timeout: Duration,
) -> RecenterOutcome {
    let ready = match viewport.wait_ready(ready_timeout).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::warn!(%epoch, error = %e, "Skipping recenter, viewport not ready");
            return RecenterOutcome::Skipped;
        }
    };

    // Held across the command so a reveal cannot begin in between.
    let signal = signal_rx.borrow();
    if signal.epoch != epoch {
        tracing::debug!(%epoch, "Recenter superseded by newer round");
        return RecenterOutcome::Superseded;
    }
    if signal.reveal_started {
        tracing::debug!(%epoch, "Recenter dropped, reveal already started");
        return RecenterOutcome::Preempted;
    }

    ready.fly_to(view.center, view.zoom, view.duration);
    drop(signal);
    tracing::debug!(%epoch, "Recentered to world view");
    RecenterOutcome::Recentered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use viewport_client::{MockViewport, ViewportCall};

    #[tokio::test(start_paused = true)]
    async fn test_recenter_flies_to_world_view() {
        let mock = MockViewport::new();
        let slot = ViewportSlot::with_viewport(Arc::new(mock.clone()));
        let (_tx, rx) = watch::channel(RoundSignal::new(Epoch(1)));
        let view = WorldView::default();

        let outcome =
            recenter_after_reset(slot, rx, Epoch(1), view, Duration::from_secs(1)).await;

        assert_eq!(outcome, RecenterOutcome::Recentered);
        assert_eq!(
            mock.calls(),
            vec![ViewportCall::FlyTo {
                center: view.center,
                zoom: view.zoom,
                duration: view.duration,
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_recenter_skipped_when_never_ready() {
        let mock = MockViewport::never_ready();
        let slot = ViewportSlot::with_viewport(Arc::new(mock.clone()));
        let (_tx, rx) = watch::channel(RoundSignal::new(Epoch(1)));

        let outcome = recenter_after_reset(
            slot,
            rx,
            Epoch(1),
            WorldView::default(),
            Duration::from_millis(300),
        )
        .await;

        assert_eq!(outcome, RecenterOutcome::Skipped);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recenter_skipped_without_viewport() {
        let (_tx, rx) = watch::channel(RoundSignal::new(Epoch(1)));
        let outcome = recenter_after_reset(
            ViewportSlot::new(),
            rx,
            Epoch(1),
            WorldView::default(),
            Duration::from_millis(300),
        )
        .await;
        assert_eq!(outcome, RecenterOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recenter_superseded_by_newer_epoch() {
        let mock = MockViewport::new();
        let slot = ViewportSlot::with_viewport(Arc::new(mock.clone()));
        let (_tx, rx) = watch::channel(RoundSignal::new(Epoch(2)));

        let outcome = recenter_after_reset(
            slot,
            rx,
            Epoch(1),
            WorldView::default(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcome, RecenterOutcome::Superseded);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_recenter_preempted_by_started_reveal() {
        let mock = MockViewport::new();
        let slot = ViewportSlot::with_viewport(Arc::new(mock.clone()));
        let (_tx, rx) = watch::channel(RoundSignal {
            epoch: Epoch(1),
            reveal_started: true,
        });

        let outcome = recenter_after_reset(
            slot,
            rx,
            Epoch(1),
            WorldView::default(),
            Duration::from_secs(1),
        )
        .await;

        assert_eq!(outcome, RecenterOutcome::Preempted);
        assert!(mock.calls().is_empty());
    }
}
