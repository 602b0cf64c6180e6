//! Console stand-ins for the map widget and the game store.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use reveal_core::{Bounds, Coordinate, Question};
use reveal_session::{BackendError, GameBackend};
use viewport_client::ViewportController;

/// A map widget that logs every camera move.
pub struct ConsoleViewport {
    ready_at: Instant,
}

impl ConsoleViewport {
    /// The widget reports ready `mount_delay` after construction.
    pub fn new(mount_delay: Duration) -> Self {
        Self {
            ready_at: Instant::now() + mount_delay,
        }
    }
}

#[async_trait]
impl ViewportController for ConsoleViewport {
    async fn ready(&self) {
        tokio::time::sleep_until(self.ready_at).await;
    }

    fn fly_to(&self, center: Coordinate, zoom: f64, duration: Duration) {
        tracing::info!(target: "viewport", %center, zoom, ?duration, "fly_to");
    }

    fn fit_bounds(&self, bounds: Bounds, padding: u32, duration: Duration) {
        tracing::info!(
            target: "viewport",
            min_lng = bounds.min_lng,
            min_lat = bounds.min_lat,
            max_lng = bounds.max_lng,
            max_lat = bounds.max_lat,
            padding,
            ?duration,
            "fit_bounds"
        );
    }
}

/// In-memory game store. Optionally rejects the first finalize of one
/// round so the retry path can be watched.
#[derive(Default)]
pub struct ConsoleBackend {
    fail_finalize: Option<usize>,
    failed: Mutex<HashSet<usize>>,
}

impl ConsoleBackend {
    pub fn new(fail_finalize: Option<usize>) -> Self {
        Self {
            fail_finalize,
            failed: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl GameBackend for ConsoleBackend {
    async fn finalize_reveal(
        &self,
        round_index: usize,
        question: &Question,
    ) -> Result<(), BackendError> {
        if self.fail_finalize == Some(round_index) {
            let mut failed = self
                .failed
                .lock()
                .map_err(|_| BackendError::new("store lock poisoned"))?;
            if failed.insert(round_index) {
                tracing::warn!(round_index, "Rejecting finalize once");
                return Err(BackendError::new("store unavailable"));
            }
        }
        tracing::info!(round_index, round_id = question.round_id, "Round finalized");
        Ok(())
    }

    async fn advance_round(&self, round_index: usize) -> Result<(), BackendError> {
        tracing::info!(round_index, "Advancing game");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            round_id: 1,
            lat: 0.0,
            lng: 0.0,
            prompt: String::new(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_backend_fails_requested_round_once() {
        let backend = ConsoleBackend::new(Some(1));
        assert!(backend.finalize_reveal(0, &question()).await.is_ok());

        let err = backend.finalize_reveal(1, &question()).await.unwrap_err();
        assert_eq!(err.to_string(), "store unavailable");
        assert!(backend.finalize_reveal(1, &question()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_viewport_ready_after_mount_delay() {
        let viewport = ConsoleViewport::new(Duration::from_millis(300));
        let start = Instant::now();
        viewport.ready().await;
        assert_eq!(start.elapsed(), Duration::from_millis(300));

        // Already mounted: resolves immediately.
        viewport.ready().await;
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }
}
