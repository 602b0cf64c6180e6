//! Bounding regions for fitting the map around a set of points.

use serde::{Deserialize, Serialize};

use crate::error::RevealError;
use crate::types::Coordinate;

/// Span (in degrees) given to an axis that would otherwise have zero width,
/// e.g. when every point shares the same longitude.
pub const DEGENERATE_SPAN_DEG: f64 = 4.0;

/// Axis-aligned region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_lng - self.min_lng
    }

    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.lng >= self.min_lng
            && point.lng <= self.max_lng
            && point.lat >= self.min_lat
            && point.lat <= self.max_lat
    }

    /// `[[min_lng, min_lat], [max_lng, max_lat]]`, the shape map widgets accept.
    pub fn to_corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lng, self.min_lat], [self.max_lng, self.max_lat]]
    }
}

/// Smallest region containing every point.
///
/// An axis with zero extent is widened to [`DEGENERATE_SPAN_DEG`] around its
/// value, so a single point still yields a region with non-zero area. The
/// widened latitude range is shifted, not clipped, to stay within the poles.
pub fn calculate_bounds(points: &[Coordinate]) -> Result<Bounds, RevealError> {
    let first = points.first().ok_or(RevealError::EmptyBounds)?;

    let mut bounds = Bounds {
        min_lng: first.lng,
        min_lat: first.lat,
        max_lng: first.lng,
        max_lat: first.lat,
    };
    for p in &points[1..] {
        bounds.min_lng = bounds.min_lng.min(p.lng);
        bounds.max_lng = bounds.max_lng.max(p.lng);
        bounds.min_lat = bounds.min_lat.min(p.lat);
        bounds.max_lat = bounds.max_lat.max(p.lat);
    }

    if bounds.width() == 0.0 {
        let (lo, hi) = widen(bounds.min_lng, -180.0, 180.0);
        bounds.min_lng = lo;
        bounds.max_lng = hi;
    }
    if bounds.height() == 0.0 {
        let (lo, hi) = widen(bounds.min_lat, -90.0, 90.0);
        bounds.min_lat = lo;
        bounds.max_lat = hi;
    }

    Ok(bounds)
}

fn widen(value: f64, floor: f64, ceil: f64) -> (f64, f64) {
    let half = DEGENERATE_SPAN_DEG / 2.0;
    let (mut lo, mut hi) = (value - half, value + half);
    if lo < floor {
        hi += floor - lo;
        lo = floor;
    }
    if hi > ceil {
        lo -= hi - ceil;
        hi = ceil;
    }
    (lo, hi)
}
