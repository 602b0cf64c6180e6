use std::sync::Arc;
use std::time::Duration;

use reveal_core::{Bounds, Coordinate};
use tokio::sync::watch;

use crate::error::{ViewportError, ViewportResult};
use crate::traits::ViewportController;

type Mounted = Option<Arc<dyn ViewportController>>;

/// Holder for the currently mounted viewport, if any. Cheap to clone; all
/// clones observe the same mount state.
#[derive(Clone)]
pub struct ViewportSlot {
    tx: Arc<watch::Sender<Mounted>>,
}

impl Default for ViewportSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ViewportSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportSlot")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl ViewportSlot {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Slot with a viewport already mounted.
    pub fn with_viewport(viewport: Arc<dyn ViewportController>) -> Self {
        let slot = Self::new();
        slot.attach(viewport);
        slot
    }

    pub fn attach(&self, viewport: Arc<dyn ViewportController>) {
        tracing::debug!("Viewport attached");
        self.tx.send_replace(Some(viewport));
    }

    pub fn detach(&self) {
        tracing::debug!("Viewport detached");
        self.tx.send_replace(None);
    }

    pub fn is_attached(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn current(&self) -> Option<Arc<dyn ViewportController>> {
        self.tx.borrow().clone()
    }

    /// Issue a fly-to on the mounted viewport.
    pub fn fly_to(&self, center: Coordinate, zoom: f64, duration: Duration) -> ViewportResult<()> {
        let viewport = self.current().ok_or(ViewportError::Unavailable)?;
        viewport.fly_to(center, zoom, duration);
        Ok(())
    }

    /// Issue a fit-bounds on the mounted viewport.
    pub fn fit_bounds(&self, bounds: Bounds, padding: u32, duration: Duration) -> ViewportResult<()> {
        let viewport = self.current().ok_or(ViewportError::Unavailable)?;
        viewport.fit_bounds(bounds, padding, duration);
        Ok(())
    }

    /// Wait until a viewport is mounted and reports ready.
    ///
    /// Waits on mount notifications rather than polling. Gives up with
    /// `ViewportError::ReadyTimeout` once `timeout` has elapsed.
    pub async fn wait_ready(
        &self,
        timeout: Duration,
    ) -> ViewportResult<Arc<dyn ViewportController>> {
        let mut rx = self.tx.subscribe();

        let wait = async move {
            let viewport = {
                let mounted = rx
                    .wait_for(|v| v.is_some())
                    .await
                    .map_err(|_| ViewportError::Detached)?;
                (*mounted).clone()
            };
            let viewport = viewport.ok_or(ViewportError::Unavailable)?;
            viewport.ready().await;
            Ok(viewport)
        };

        tokio::time::timeout(timeout, wait)
            .await
            .map_err(|_| ViewportError::ReadyTimeout(timeout))?
    }
}
