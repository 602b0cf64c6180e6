//! ViewportController trait abstraction for map widgets

use async_trait::async_trait;
use reveal_core::{Bounds, Coordinate};
use std::time::Duration;

/// Camera commands the reveal issues to a map widget.
/// Implemented by real widget bridges and by MockViewport.
///
/// Commands are fire-and-forget: callers pace themselves by the duration
/// they ask for, since no completion signal is guaranteed.
#[async_trait]
pub trait ViewportController: Send + Sync {
    /// Resolves once the widget can accept camera commands.
    async fn ready(&self);

    /// Animate the camera to `center` at `zoom`.
    fn fly_to(&self, center: Coordinate, zoom: f64, duration: Duration);

    /// Animate the camera so that `bounds` is visible with `padding` pixels
    /// on every side.
    fn fit_bounds(&self, bounds: Bounds, padding: u32, duration: Duration);
}
