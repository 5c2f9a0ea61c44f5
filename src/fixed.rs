//! Fixed-point scaling for the geometry backend
//!
//! Boolean polygon algorithms are only robust on an integer lattice. Every
//! coordinate entering the clipping backend is multiplied by [`SCALE`] and
//! rounded; every coordinate leaving it is divided by [`SCALE`]. The factor
//! is a single global constant so results from different operations stay
//! numerically commensurable without re-normalization.

use clipper2::PointScaler;

use crate::model::Point2;

/// Global fixed-point scaling factor: 3 decimal digits of millimeter
/// precision
pub const SCALE: f64 = 1000.0;

/// Clipper2 point scaler carrying [`SCALE`]
///
/// Passed as the type parameter to every clipping call, so the backend
/// itself performs the scale/round on the way in and the unscale on the way
/// out.
#[derive(Debug, Clone, Copy, PartialEq, Default, Hash)]
pub struct Milli;

impl PointScaler for Milli {
    const MULTIPLIER: f64 = SCALE;
}

/// Scale one coordinate onto the integer lattice
pub fn scale_coord(value: f64) -> i64 {
    (value * SCALE).round() as i64
}

/// Map one lattice coordinate back to millimeters
pub fn unscale_coord(value: i64) -> f64 {
    value as f64 / SCALE
}

/// Scale a point onto the integer lattice
pub fn scale_point(p: Point2) -> (i64, i64) {
    (scale_coord(p.x), scale_coord(p.y))
}

/// Map a lattice point back to millimeters
pub fn unscale_point(p: (i64, i64)) -> Point2 {
    Point2::new(unscale_coord(p.0), unscale_coord(p.1))
}
