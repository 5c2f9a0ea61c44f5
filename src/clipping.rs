//! Boolean polygon operations for contour editing
//!
//! This module wraps the Clipper2 library (a Rust port of Angus Johnson's
//! Clipper2, the successor to the polyclipping library) and owns every
//! policy decision around it: fixed-point scaling (see [`crate::fixed`]),
//! the NonZero fill rule, and result cleanup. Repeated brush edits feed
//! results back into further boolean operations, so every result is cleaned
//! (vertex merge at [`CLEAN_TOLERANCE_MM`]) and simplified before it leaves
//! this module; degenerate self-intersections would otherwise accumulate
//! across strokes.
//!
//! Failure policy: the clipping backend failing is never fatal to an edit
//! session. `union`, `intersection` and `offset` degrade to returning the
//! first operand unchanged (a logged no-op), `difference` with an empty
//! subtrahend returns the minuend, and a failed point-in-polygon test
//! reports "outside" so a broken backend can never silently grant an
//! additive edit on top of existing anatomy.

use clipper2::{EndType, FillRule, JoinType, Paths};
use log::warn;

use crate::fixed::{Milli, SCALE};
use crate::model::{MultiPolygon, Point2, ring_signed_area};

/// Vertex-merge tolerance applied to every boolean result, millimeters
///
/// Two scaled units on the fixed-point lattice.
pub const CLEAN_TOLERANCE_MM: f64 = 2.0 / SCALE;

/// Where a point lies relative to a multipolygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointLocation {
    /// Inside the filled region (odd ring-hit parity)
    pub inside: bool,
    /// Within [`CLEAN_TOLERANCE_MM`] of some ring boundary
    pub on_boundary: bool,
}

/// Convert a multipolygon to Clipper2's path format
fn multipolygon_to_paths(polygons: &MultiPolygon) -> Vec<Vec<(f64, f64)>> {
    polygons
        .rings
        .iter()
        .map(|ring| ring.iter().map(|p| (p.x, p.y)).collect())
        .collect()
}

/// Convert Clipper2 paths back to a multipolygon
///
/// Rings left with fewer than 3 vertices are dropped.
fn paths_to_multipolygon(paths: Vec<Vec<(f64, f64)>>) -> MultiPolygon {
    let rings = paths
        .into_iter()
        .filter(|path| path.len() >= 3)
        .map(|path| path.into_iter().map(|(x, y)| Point2::new(x, y)).collect())
        .collect();
    MultiPolygon::from_rings(rings)
}

/// Merge vertices closer than `tolerance` and drop degenerate rings
///
/// Stable fixed point: `clean(clean(a)) == clean(a)`.
pub fn clean(polygons: &MultiPolygon, tolerance: f64) -> MultiPolygon {
    let mut rings = Vec::with_capacity(polygons.rings.len());
    for ring in &polygons.rings {
        let mut kept: Vec<Point2> = Vec::with_capacity(ring.len());
        for &p in ring {
            match kept.last() {
                Some(last) if last.distance_to(&p) <= tolerance => {}
                _ => kept.push(p),
            }
        }
        // The closing edge is implicit; merge across it too
        while kept.len() >= 2 && kept[0].distance_to(&kept[kept.len() - 1]) <= tolerance {
            kept.pop();
        }
        if kept.len() >= 3 {
            rings.push(kept);
        }
    }
    MultiPolygon::from_rings(rings)
}

/// Remove self-intersections and near-collinear vertices
pub fn simplify(polygons: &MultiPolygon) -> MultiPolygon {
    if polygons.is_empty() {
        return MultiPolygon::new();
    }
    let paths = multipolygon_to_paths(polygons);
    let simplified = clipper2::simplify::<Milli>(paths, CLEAN_TOLERANCE_MM, false);
    paths_to_multipolygon(simplified.into())
}

/// Cleanup applied to every boolean result before it leaves this module
fn finalize(polygons: MultiPolygon) -> MultiPolygon {
    simplify(&clean(&polygons, CLEAN_TOLERANCE_MM))
}

/// Union of two multipolygons
///
/// Also the normalization pass: unioning against an empty operand merges any
/// overlapping rings of the other under the NonZero rule.
pub fn union(a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
    if a.is_empty() && b.is_empty() {
        return MultiPolygon::new();
    }
    let (subject, clip) = if a.is_empty() {
        (multipolygon_to_paths(b), Vec::new())
    } else {
        (multipolygon_to_paths(a), multipolygon_to_paths(b))
    };
    match clipper2::union::<Milli>(subject, clip, FillRule::NonZero) {
        Ok(result) => finalize(paths_to_multipolygon(result.into())),
        Err(e) => {
            warn!("union failed, keeping first operand: {:?}", e);
            a.clone()
        }
    }
}

/// Difference of two multipolygons (`a` minus `b`)
///
/// An empty subtrahend returns the minuend unchanged.
pub fn difference(a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
    if a.is_empty() {
        return MultiPolygon::new();
    }
    if b.is_empty() {
        return a.clone();
    }
    let subject = multipolygon_to_paths(a);
    let clip = multipolygon_to_paths(b);
    match clipper2::difference::<Milli>(subject, clip, FillRule::NonZero) {
        Ok(result) => finalize(paths_to_multipolygon(result.into())),
        Err(e) => {
            warn!("difference failed, keeping minuend: {:?}", e);
            a.clone()
        }
    }
}

/// Intersection of two multipolygons
pub fn intersection(a: &MultiPolygon, b: &MultiPolygon) -> MultiPolygon {
    if a.is_empty() || b.is_empty() {
        return MultiPolygon::new();
    }
    let subject = multipolygon_to_paths(a);
    let clip = multipolygon_to_paths(b);
    match clipper2::intersect::<Milli>(subject, clip, FillRule::NonZero) {
        Ok(result) => finalize(paths_to_multipolygon(result.into())),
        Err(e) => {
            warn!("intersection failed, keeping first operand: {:?}", e);
            a.clone()
        }
    }
}

/// Offset (inflate or deflate) a multipolygon by `delta` millimeters
///
/// Positive `delta` grows the region, negative shrinks it; round joins. A
/// region shrunk past its medial axis legitimately vanishes.
pub fn offset(polygons: &MultiPolygon, delta: f64) -> MultiPolygon {
    if polygons.is_empty() {
        return MultiPolygon::new();
    }
    let paths: Paths<Milli> = multipolygon_to_paths(polygons).into();
    let inflated = clipper2::inflate(paths, delta, JoinType::Round, EndType::Polygon, 2.0);
    finalize(paths_to_multipolygon(inflated.into()))
}

/// Offset an open polyline by `radius`, producing the swept "inked" region
///
/// Round joins and round open ends, so the result covers every point within
/// `radius` of the polyline.
pub(crate) fn offset_open_path(path: &[Point2], radius: f64) -> MultiPolygon {
    if path.len() < 2 || radius <= 0.0 {
        return MultiPolygon::new();
    }
    let tuples: Vec<(f64, f64)> = path.iter().map(|p| (p.x, p.y)).collect();
    let paths: Paths<Milli> = vec![tuples].into();
    let inflated = clipper2::inflate(paths, radius, JoinType::Round, EndType::Round, 2.0);
    finalize(paths_to_multipolygon(inflated.into()))
}

/// Ray-casting test of one ring, ignoring winding direction
fn point_in_ring(point: Point2, ring: &[Point2]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let vi = ring[i];
        let vj = ring[j];
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Distance from a point to the segment `a`..`b`
fn point_segment_distance(p: Point2, a: Point2, b: Point2) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    if len2 == 0.0 {
        return p.distance_to(&a);
    }
    let t = (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0.0, 1.0);
    p.distance_to(&Point2::new(a.x + t * abx, a.y + t * aby))
}

/// Whether a point lies within `tolerance` of the ring's boundary
fn point_on_ring_boundary(point: Point2, ring: &[Point2], tolerance: f64) -> bool {
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        if point_segment_distance(point, ring[j], ring[i]) <= tolerance {
            return true;
        }
        j = i;
    }
    false
}

/// Locate a point relative to a multipolygon
///
/// Counts ring-level inside hits across all rings and reports inside iff the
/// count is odd, so a point inside a hole ring tests outside. Degenerate
/// rings are skipped rather than failing the whole test; with no testable
/// rings the result is "outside" (fail-closed).
pub fn point_in_multipolygon(point: Point2, polygons: &MultiPolygon) -> PointLocation {
    let mut hits = 0usize;
    let mut on_boundary = false;
    for ring in &polygons.rings {
        if ring.len() < 3 {
            continue;
        }
        if point_on_ring_boundary(point, ring, CLEAN_TOLERANCE_MM) {
            on_boundary = true;
        }
        if point_in_ring(point, ring) {
            hits += 1;
        }
    }
    PointLocation {
        inside: hits % 2 == 1,
        on_boundary,
    }
}

/// Net enclosed area of a multipolygon, square millimeters
///
/// Hole rings wind opposite the solids they sit in, so summing signed ring
/// areas yields the net filled area.
pub fn area(polygons: &MultiPolygon) -> f64 {
    polygons
        .rings
        .iter()
        .map(|ring| ring_signed_area(ring))
        .sum::<f64>()
        .abs()
}

/// Area-weighted centroid of a multipolygon
///
/// `None` when the net area is degenerate.
pub fn centroid(polygons: &MultiPolygon) -> Option<Point2> {
    let mut total_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for ring in &polygons.rings {
        if ring.len() < 3 {
            continue;
        }
        let a = ring_signed_area(ring);
        let (mut rx, mut ry) = (0.0, 0.0);
        let mut j = ring.len() - 1;
        for i in 0..ring.len() {
            let cross = ring[j].x * ring[i].y - ring[i].x * ring[j].y;
            rx += (ring[j].x + ring[i].x) * cross;
            ry += (ring[j].y + ring[i].y) * cross;
            j = i;
        }
        // Ring centroid times 6*signed_area, accumulated area-weighted
        cx += rx / 6.0;
        cy += ry / 6.0;
        total_area += a;
    }
    if total_area.abs() < 1e-12 {
        return None;
    }
    Some(Point2::new(cx / total_area, cy / total_area))
}

/// Axis-aligned bounding box over all rings
pub fn bounding_box(polygons: &MultiPolygon) -> Option<(Point2, Point2)> {
    let mut min: Option<Point2> = None;
    let mut max: Option<Point2> = None;
    for p in polygons.rings.iter().flatten() {
        match (&mut min, &mut max) {
            (Some(lo), Some(hi)) => {
                lo.x = lo.x.min(p.x);
                lo.y = lo.y.min(p.y);
                hi.x = hi.x.max(p.x);
                hi.y = hi.y.max(p.y);
            }
            _ => {
                min = Some(*p);
                max = Some(*p);
            }
        }
    }
    min.zip(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<Point2> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + size, y0),
            Point2::new(x0 + size, y0 + size),
            Point2::new(x0, y0 + size),
        ]
    }

    #[test]
    fn test_union_two_squares() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let b = MultiPolygon::from_rings(vec![square(5.0, 5.0, 10.0)]);
        let result = union(&a, &b);
        assert!(!result.is_empty());
        // 100 + 100 - 25 overlap
        assert!((area(&result) - 175.0).abs() < 0.5);
    }

    #[test]
    fn test_union_with_empty() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let empty = MultiPolygon::new();
        assert!((area(&union(&a, &empty)) - 100.0).abs() < 0.5);
        assert!((area(&union(&empty, &a)) - 100.0).abs() < 0.5);
    }

    #[test]
    fn test_union_monotonicity() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let b = MultiPolygon::from_rings(vec![square(3.0, 3.0, 10.0)]);
        let u = area(&union(&a, &b));
        assert!(u >= area(&a) - 0.01);
        assert!(u >= area(&b) - 0.01);
    }

    #[test]
    fn test_difference_two_squares() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let b = MultiPolygon::from_rings(vec![square(5.0, 5.0, 10.0)]);
        let result = difference(&a, &b);
        assert!((area(&result) - 75.0).abs() < 0.5);
        assert!(area(&result) <= area(&a));
    }

    #[test]
    fn test_difference_empty_subtrahend_is_identity() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let result = difference(&a, &MultiPolygon::new());
        assert_eq!(result, a);
    }

    #[test]
    fn test_difference_from_empty() {
        let b = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        assert!(difference(&MultiPolygon::new(), &b).is_empty());
    }

    #[test]
    fn test_intersection_two_squares() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let b = MultiPolygon::from_rings(vec![square(5.0, 5.0, 10.0)]);
        let result = intersection(&a, &b);
        assert!((area(&result) - 25.0).abs() < 0.5);
    }

    #[test]
    fn test_offset_grows_square() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let grown = offset(&a, 2.0);
        // 14x14 core plus rounded corners: between 14^2 and 14^2 + corner area
        let grown_area = area(&grown);
        assert!(grown_area > 180.0, "area {}", grown_area);
        assert!(grown_area < 200.0, "area {}", grown_area);

        let shrunk = offset(&a, -2.0);
        assert!((area(&shrunk) - 36.0).abs() < 0.5);
    }

    #[test]
    fn test_offset_shrinks_to_nothing() {
        let a = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        assert!(offset(&a, -6.0).is_empty());
    }

    #[test]
    fn test_clean_merges_close_vertices() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0005, 0.0005),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0001, 10.0),
        ];
        let cleaned = clean(&MultiPolygon::from_rings(vec![ring]), CLEAN_TOLERANCE_MM);
        assert_eq!(cleaned.rings[0].len(), 4);
    }

    #[test]
    fn test_clean_idempotent() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.001, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let polygons = MultiPolygon::from_rings(vec![ring]);
        let once = clean(&polygons, CLEAN_TOLERANCE_MM);
        let twice = clean(&once, CLEAN_TOLERANCE_MM);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_drops_degenerate_rings() {
        let sliver = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0005, 0.0),
            Point2::new(0.001, 0.0005),
        ];
        let cleaned = clean(&MultiPolygon::from_rings(vec![sliver]), CLEAN_TOLERANCE_MM);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_point_in_polygon_parity() {
        let simple = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        assert!(point_in_multipolygon(Point2::new(5.0, 5.0), &simple).inside);
        assert!(!point_in_multipolygon(Point2::new(15.0, 5.0), &simple).inside);
        assert!(!point_in_multipolygon(Point2::new(-5.0, 5.0), &simple).inside);
    }

    #[test]
    fn test_point_in_annulus() {
        // Outer 20x20, hole 8x8 centered: ring-hit parity makes the hole
        // interior test outside
        let annulus = MultiPolygon::from_rings(vec![square(0.0, 0.0, 20.0), square(6.0, 6.0, 8.0)]);
        assert!(point_in_multipolygon(Point2::new(3.0, 3.0), &annulus).inside);
        assert!(!point_in_multipolygon(Point2::new(10.0, 10.0), &annulus).inside);
        assert!(!point_in_multipolygon(Point2::new(30.0, 30.0), &annulus).inside);
    }

    #[test]
    fn test_point_on_boundary() {
        let simple = MultiPolygon::from_rings(vec![square(0.0, 0.0, 10.0)]);
        let location = point_in_multipolygon(Point2::new(10.0, 5.0), &simple);
        assert!(location.on_boundary);
        assert!(!point_in_multipolygon(Point2::new(5.0, 5.0), &simple).on_boundary);
    }

    #[test]
    fn test_point_in_empty_is_outside() {
        let location = point_in_multipolygon(Point2::new(0.0, 0.0), &MultiPolygon::new());
        assert!(!location.inside);
        assert!(!location.on_boundary);
    }

    #[test]
    fn test_area_with_hole() {
        let outer = square(0.0, 0.0, 20.0);
        let hole: Vec<Point2> = square(6.0, 6.0, 8.0).into_iter().rev().collect();
        let annulus = MultiPolygon::from_rings(vec![outer, hole]);
        assert!((area(&annulus) - (400.0 - 64.0)).abs() < 1e-6);
    }

    #[test]
    fn test_centroid_of_square() {
        let a = MultiPolygon::from_rings(vec![square(2.0, 4.0, 10.0)]);
        let c = centroid(&a).expect("centroid");
        assert!((c.x - 7.0).abs() < 1e-9);
        assert!((c.y - 9.0).abs() < 1e-9);
        assert!(centroid(&MultiPolygon::new()).is_none());
    }

    #[test]
    fn test_bounding_box() {
        let a = MultiPolygon::from_rings(vec![square(2.0, 4.0, 10.0), square(-3.0, 0.0, 1.0)]);
        let (lo, hi) = bounding_box(&a).expect("bbox");
        assert_eq!((lo.x, lo.y), (-3.0, 0.0));
        assert_eq!((hi.x, hi.y), (12.0, 14.0));
        assert!(bounding_box(&MultiPolygon::new()).is_none());
    }

    #[test]
    fn test_offset_open_path_covers_stroke() {
        let path = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let stroke = offset_open_path(&path, 2.0);
        assert!(!stroke.is_empty());
        // Capsule: 10x4 rectangle plus two half-discs of radius 2
        let expected = 40.0 + std::f64::consts::PI * 4.0;
        assert!((area(&stroke) - expected).abs() < 1.5);
        assert!(point_in_multipolygon(Point2::new(5.0, 0.0), &stroke).inside);
        assert!(!point_in_multipolygon(Point2::new(5.0, 3.0), &stroke).inside);
    }
}
