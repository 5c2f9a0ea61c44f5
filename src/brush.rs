//! Brush stroke construction
//!
//! Turns a path of patient-space input points plus a radius into the
//! multipolygon covered by the brush. The primary strategy offsets the
//! stroke polyline with round joins and round open ends in a single call;
//! when that yields nothing (a degenerate path, or an offset backend that
//! cannot handle open polylines) the path is re-covered by stamping discs
//! at a bounded number of sample points and unioning them.

use log::debug;

use crate::clipping;
use crate::model::{MultiPolygon, Point2, Ring};

/// Vertex count of the polygonal brush footprint
///
/// A 32-gon is visually indistinguishable from a circle at editing zoom
/// levels while keeping boolean operations cheap.
pub const BRUSH_SEGMENTS: usize = 32;

/// Maximum number of stamp points when falling back to disc stamping
pub const MAX_STAMP_SAMPLES: usize = 10;

/// Consecutive input points closer than this are treated as one, millimeters
const DEDUP_TOLERANCE_MM: f64 = 1e-6;

/// A regular-polygon approximation of the circular brush footprint
pub fn disc(center: Point2, radius: f64) -> MultiPolygon {
    if radius <= 0.0 {
        return MultiPolygon::new();
    }
    let ring: Ring = (0..BRUSH_SEGMENTS)
        .map(|i| {
            let angle = (i as f64) * std::f64::consts::TAU / (BRUSH_SEGMENTS as f64);
            Point2::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect();
    MultiPolygon::from_rings(vec![ring])
}

/// Drop consecutive duplicate points from a stroke path
fn dedup_path(path: &[Point2]) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(path.len());
    for &p in path {
        match out.last() {
            Some(last) if last.distance_to(&p) <= DEDUP_TOLERANCE_MM => {}
            _ => out.push(p),
        }
    }
    out
}

/// Build the inked region of a brush stroke
///
/// An empty path yields an empty result; a single distinct point (a click
/// with no drag) yields a full disc of the given radius; anything longer is
/// offset as an open polyline.
///
/// # Arguments
///
/// * `path` - Stroke points in patient millimeters, in input order
/// * `radius` - Brush radius (half the brush size), millimeters
///
/// # Returns
///
/// The multipolygon covered by sweeping the brush along the path.
pub fn stroke_polygon(path: &[Point2], radius: f64) -> MultiPolygon {
    if radius <= 0.0 {
        return MultiPolygon::new();
    }
    let path = dedup_path(path);
    match path.len() {
        0 => MultiPolygon::new(),
        1 => disc(path[0], radius),
        _ => {
            let offset = clipping::offset_open_path(&path, radius);
            if offset.is_empty() {
                debug!(
                    "open-path offset produced nothing for {} points, stamping discs",
                    path.len()
                );
                stamp_discs(&path, radius)
            } else {
                offset
            }
        }
    }
}

/// Fallback stroke coverage: union discs stamped along the path
///
/// Samples at most [`MAX_STAMP_SAMPLES`] points, always including both
/// endpoints.
fn stamp_discs(path: &[Point2], radius: f64) -> MultiPolygon {
    let samples = sample_indices(path.len(), MAX_STAMP_SAMPLES);
    let mut result = MultiPolygon::new();
    for i in samples {
        result = clipping::union(&result, &disc(path[i], radius));
    }
    result
}

/// Evenly spread `count` indices over `0..len`, endpoints included
fn sample_indices(len: usize, count: usize) -> Vec<usize> {
    if len <= count {
        return (0..len).collect();
    }
    (0..count)
        .map(|i| i * (len - 1) / (count - 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipping::{area, point_in_multipolygon};

    #[test]
    fn test_click_produces_disc() {
        let stroke = stroke_polygon(&[Point2::new(5.0, 5.0)], 2.5);
        assert_eq!(stroke.ring_count(), 1);
        assert_eq!(stroke.rings[0].len(), BRUSH_SEGMENTS);
        // 32-gon area is slightly under the circle's
        let circle_area = std::f64::consts::PI * 2.5 * 2.5;
        let a = area(&stroke);
        assert!(a > circle_area * 0.98 && a < circle_area * 1.001, "area {}", a);
    }

    #[test]
    fn test_repeated_point_click_still_a_disc() {
        let p = Point2::new(-3.0, 8.0);
        let stroke = stroke_polygon(&[p, p, p], 1.0);
        assert_eq!(stroke.ring_count(), 1);
        assert!(point_in_multipolygon(p, &stroke).inside);
    }

    #[test]
    fn test_empty_path_is_a_no_op() {
        assert!(stroke_polygon(&[], 5.0).is_empty());
    }

    #[test]
    fn test_zero_radius_is_a_no_op() {
        assert!(stroke_polygon(&[Point2::new(0.0, 0.0)], 0.0).is_empty());
    }

    #[test]
    fn test_dragged_stroke_covers_path() {
        let path = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(8.0, 2.0),
            Point2::new(12.0, 2.0),
        ];
        let stroke = stroke_polygon(&path, 1.5);
        assert!(!stroke.is_empty());
        for p in &path {
            assert!(
                point_in_multipolygon(*p, &stroke).inside,
                "path point {:?} not covered",
                p
            );
        }
        // Well away from the path stays uncovered
        assert!(!point_in_multipolygon(Point2::new(6.0, 8.0), &stroke).inside);
    }

    #[test]
    fn test_stamped_fallback_covers_endpoints() {
        let path: Vec<Point2> = (0..40)
            .map(|i| Point2::new(i as f64 * 0.5, (i as f64 * 0.3).sin()))
            .collect();
        let stroke = stamp_discs(&path, 2.0);
        assert!(!stroke.is_empty());
        assert!(point_in_multipolygon(path[0], &stroke).inside);
        assert!(point_in_multipolygon(path[39], &stroke).inside);
    }

    #[test]
    fn test_sample_indices_bounds() {
        assert_eq!(sample_indices(3, 10), vec![0, 1, 2]);
        let spread = sample_indices(100, 10);
        assert_eq!(spread.len(), 10);
        assert_eq!(spread[0], 0);
        assert_eq!(spread[9], 99);
        assert!(spread.windows(2).all(|w| w[0] < w[1]));
    }
}
