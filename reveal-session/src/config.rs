//! Timing and camera tunables for the reveal.
//!
//! Every value has a compile-time default matching the map animations and can
//! be overridden at runtime via a dedicated environment variable. Values that
//! fail to parse fall back to the default.

use std::str::FromStr;
use std::time::Duration;

use reveal_core::Coordinate;

/// Default fly-to animation length for stage 1 (in milliseconds).
const DEFAULT_FLY_DURATION_MS: u64 = 2000;

/// Default zoom level when flying to the correct location.
const DEFAULT_CLOSE_ZOOM: f64 = 6.0;

/// Default time the correct marker is shown alone (in milliseconds).
const DEFAULT_CORRECT_DWELL_MS: u64 = 1000;

/// Default fit-bounds animation length (in milliseconds).
const DEFAULT_FIT_DURATION_MS: u64 = 1500;

/// Default padding around fitted bounds (in pixels).
const DEFAULT_FIT_PADDING_PX: u32 = 50;

/// Default wait for the viewport to report ready after a reset (in milliseconds).
const DEFAULT_READY_TIMEOUT_MS: u64 = 3000;

const WORLD_VIEW_CENTER: Coordinate = Coordinate { lat: 20.0, lng: 0.0 };
const WORLD_VIEW_ZOOM: f64 = 1.5;
const WORLD_VIEW_DURATION_MS: u64 = 500;

/// Camera position the map returns to at the start of every round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldView {
    pub center: Coordinate,
    pub zoom: f64,
    pub duration: Duration,
}

impl Default for WorldView {
    fn default() -> Self {
        Self {
            center: WORLD_VIEW_CENTER,
            zoom: WORLD_VIEW_ZOOM,
            duration: Duration::from_millis(WORLD_VIEW_DURATION_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    pub fly_duration: Duration,
    pub close_zoom: f64,
    pub correct_dwell: Duration,
    pub fit_duration: Duration,
    pub fit_padding: u32,
    pub ready_timeout: Duration,
    pub world_view: WorldView,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            fly_duration: Duration::from_millis(DEFAULT_FLY_DURATION_MS),
            close_zoom: DEFAULT_CLOSE_ZOOM,
            correct_dwell: Duration::from_millis(DEFAULT_CORRECT_DWELL_MS),
            fit_duration: Duration::from_millis(DEFAULT_FIT_DURATION_MS),
            fit_padding: DEFAULT_FIT_PADDING_PX,
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            world_view: WorldView::default(),
        }
    }
}

impl RevealConfig {
    /// Defaults with any environment overrides applied.
    pub fn from_env() -> Self {
        Self {
            fly_duration: Duration::from_millis(get_fly_duration_ms()),
            close_zoom: get_close_zoom(),
            correct_dwell: Duration::from_millis(get_correct_dwell_ms()),
            fit_duration: Duration::from_millis(get_fit_duration_ms()),
            fit_padding: get_fit_padding_px(),
            ready_timeout: Duration::from_millis(get_ready_timeout_ms()),
            world_view: WorldView::default(),
        }
    }

    /// Multiply every duration by `factor`. Non-positive or non-finite
    /// factors leave the config unchanged.
    pub fn scaled(mut self, factor: f64) -> Self {
        if !(factor.is_finite() && factor > 0.0) {
            return self;
        }
        self.fly_duration = self.fly_duration.mul_f64(factor);
        self.correct_dwell = self.correct_dwell.mul_f64(factor);
        self.fit_duration = self.fit_duration.mul_f64(factor);
        self.ready_timeout = self.ready_timeout.mul_f64(factor);
        self.world_view.duration = self.world_view.duration.mul_f64(factor);
        self
    }

    /// Shortest time a full, uninterrupted reveal takes.
    pub fn reveal_duration(&self) -> Duration {
        self.fly_duration + self.correct_dwell + self.fit_duration
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(value) => value.parse().unwrap_or(default),
        Err(_) => default,
    }
}

/// Get the stage-1 fly-to duration in milliseconds.
///
/// Priority:
/// 1. `MAPREVEAL_FLY_DURATION_MS` env variable if set and parseable
/// 2. `2000` ms as fallback
pub fn get_fly_duration_ms() -> u64 {
    env_or("MAPREVEAL_FLY_DURATION_MS", DEFAULT_FLY_DURATION_MS)
}

/// Get the close zoom level (`MAPREVEAL_CLOSE_ZOOM`, default `6.0`).
pub fn get_close_zoom() -> f64 {
    env_or("MAPREVEAL_CLOSE_ZOOM", DEFAULT_CLOSE_ZOOM)
}

/// Get the correct-marker dwell in milliseconds
/// (`MAPREVEAL_CORRECT_DWELL_MS`, default `1000`).
pub fn get_correct_dwell_ms() -> u64 {
    env_or("MAPREVEAL_CORRECT_DWELL_MS", DEFAULT_CORRECT_DWELL_MS)
}

/// Get the fit-bounds duration in milliseconds
/// (`MAPREVEAL_FIT_DURATION_MS`, default `1500`).
pub fn get_fit_duration_ms() -> u64 {
    env_or("MAPREVEAL_FIT_DURATION_MS", DEFAULT_FIT_DURATION_MS)
}

/// Get the fit-bounds padding in pixels (`MAPREVEAL_FIT_PADDING_PX`, default `50`).
pub fn get_fit_padding_px() -> u32 {
    env_or("MAPREVEAL_FIT_PADDING_PX", DEFAULT_FIT_PADDING_PX)
}

/// Get the viewport readiness timeout in milliseconds.
///
/// Priority:
/// 1. `MAPREVEAL_READY_TIMEOUT_MS` env variable if set and parseable
/// 2. `3000` ms as fallback
pub fn get_ready_timeout_ms() -> u64 {
    env_or("MAPREVEAL_READY_TIMEOUT_MS", DEFAULT_READY_TIMEOUT_MS)
}
