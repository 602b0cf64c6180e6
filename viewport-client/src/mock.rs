//! Mock ViewportController implementation for testing

use crate::traits::ViewportController;
use async_trait::async_trait;
use reveal_core::{Bounds, Coordinate};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

/// Recording viewport - only compiled in test mode or with mock feature.
/// Clones share the same call log and readiness flag.
#[derive(Clone)]
pub struct MockViewport {
    call_log: Arc<Mutex<Vec<ViewportCall>>>,
    ready: Arc<watch::Sender<bool>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCall {
    FlyTo {
        center: Coordinate,
        zoom: f64,
        duration: Duration,
    },
    FitBounds {
        bounds: Bounds,
        padding: u32,
        duration: Duration,
    },
}

impl Default for MockViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockViewport {
    /// A viewport that is ready straight away.
    pub fn new() -> Self {
        Self::with_ready(true)
    }

    /// A viewport whose `ready()` never resolves until `set_ready` is called.
    pub fn never_ready() -> Self {
        Self::with_ready(false)
    }

    fn with_ready(ready: bool) -> Self {
        let (tx, _) = watch::channel(ready);
        Self {
            call_log: Arc::new(Mutex::new(Vec::new())),
            ready: Arc::new(tx),
        }
    }

    pub fn set_ready(&self) {
        self.ready.send_replace(true);
    }

    /// Every command received so far, oldest first.
    pub fn calls(&self) -> Vec<ViewportCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn fly_to_calls(&self) -> Vec<ViewportCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ViewportCall::FlyTo { .. }))
            .collect()
    }

    pub fn fit_bounds_calls(&self) -> Vec<ViewportCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, ViewportCall::FitBounds { .. }))
            .collect()
    }

    pub fn clear(&self) {
        self.call_log.lock().unwrap().clear();
    }

    fn record(&self, call: ViewportCall) {
        self.call_log.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ViewportController for MockViewport {
    async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as self, so this only returns once ready.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    fn fly_to(&self, center: Coordinate, zoom: f64, duration: Duration) {
        self.record(ViewportCall::FlyTo {
            center,
            zoom,
            duration,
        });
    }

    fn fit_bounds(&self, bounds: Bounds, padding: u32, duration: Duration) {
        self.record(ViewportCall::FitBounds {
            bounds,
            padding,
            duration,
        });
    }
}
