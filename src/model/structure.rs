//! Structure-set types
//!
//! A structure ("ROI") is a named region drawn as closed contours across
//! image slices. The types here mirror the shape in which an external load
//! collaborator hands the data over, and in which edited data is handed back
//! to the render callback and the persistence collaborator: each contour is
//! one closed ring, flattened to x,y,z triples with a constant z equal to
//! its slice position.

use super::geometry::{MultiPolygon, Point2, Ring, strip_closing_vertex};

/// Tolerance for matching a contour to the displayed slice, in millimeters
///
/// A contour belongs to the current slice iff
/// `|contour.slice_position - current_slice| <= SLICE_TOLERANCE_MM`.
/// The boundary is inclusive.
pub const SLICE_TOLERANCE_MM: f64 = 2.0;

/// An RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Create a new color
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One closed ring of a structure on one slice, in persisted form
///
/// `points` holds x,y,z triples in patient millimeters; z is constant and
/// equal to `slice_position`. `point_count` is the number of triples.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contour {
    /// Patient-space slice coordinate, millimeters
    pub slice_position: f64,
    /// Flat x,y,z triples
    pub points: Vec<f64>,
    /// Number of x,y,z triples in `points`
    pub point_count: usize,
}

impl Contour {
    /// Build a contour from an in-plane ring at the given slice position
    pub fn from_ring(slice_position: f64, ring: &[Point2]) -> Self {
        let mut points = Vec::with_capacity(ring.len() * 3);
        for p in ring {
            points.push(p.x);
            points.push(p.y);
            points.push(slice_position);
        }
        Self {
            slice_position,
            point_count: ring.len(),
            points,
        }
    }

    /// The in-plane ring, with any explicit closing vertex stripped
    pub fn ring(&self) -> Ring {
        let ring: Ring = self
            .points
            .chunks_exact(3)
            .map(|xyz| Point2::new(xyz[0], xyz[1]))
            .collect();
        strip_closing_vertex(ring)
    }

    /// Whether this contour belongs to the given slice
    pub fn matches_slice(&self, slice_position: f64) -> bool {
        (self.slice_position - slice_position).abs() <= SLICE_TOLERANCE_MM
    }
}

/// A named anatomical or target region with contours across slices
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Structure {
    /// Unique, stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Display color
    pub color: Color,
    /// Contours across all slices, one entry per closed ring
    pub contours: Vec<Contour>,
}

impl Structure {
    /// Create an empty structure
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: Color) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color,
            contours: Vec::new(),
        }
    }

    /// All rings matching the given slice, merged into one multipolygon
    pub fn slice_polygons(&self, slice_position: f64) -> MultiPolygon {
        let rings: Vec<Ring> = self
            .contours
            .iter()
            .filter(|c| c.matches_slice(slice_position))
            .map(|c| c.ring())
            .filter(|r| r.len() >= 3)
            .collect();
        MultiPolygon::from_rings(rings)
    }
}

/// The full set of structures for one editing session
///
/// Loaded once by an external collaborator; mutated only through committed
/// edits; discarded wholesale when the session ends.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructureSet {
    /// All structures, in load order
    pub structures: Vec<Structure>,
}

impl StructureSet {
    /// Create an empty structure set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a structure by id
    pub fn structure(&self, id: &str) -> Option<&Structure> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// Look up a structure by id, mutably
    pub fn structure_mut(&mut self, id: &str) -> Option<&mut Structure> {
        self.structures.iter_mut().find(|s| s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_ring(size: f64) -> Ring {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn test_contour_round_trip() {
        let ring = square_ring(10.0);
        let contour = Contour::from_ring(5.0, &ring);
        assert_eq!(contour.point_count, 4);
        assert_eq!(contour.points.len(), 12);
        assert_eq!(contour.points[2], 5.0);
        assert_eq!(contour.ring(), ring);
    }

    #[test]
    fn test_slice_tolerance_boundary() {
        let contour = Contour::from_ring(10.0, &square_ring(10.0));
        // Inclusive at exactly the tolerance
        assert!(contour.matches_slice(12.0));
        assert!(contour.matches_slice(8.0));
        // Excluded just past it
        assert!(!contour.matches_slice(12.0001));
        assert!(!contour.matches_slice(7.9999));
    }

    #[test]
    fn test_slice_polygons_merges_matching_contours() {
        let mut structure = Structure::new("ptv", "PTV", Color::new(255, 0, 0));
        structure.contours.push(Contour::from_ring(10.0, &square_ring(10.0)));
        structure.contours.push(Contour::from_ring(11.5, &square_ring(5.0)));
        structure.contours.push(Contour::from_ring(20.0, &square_ring(8.0)));

        let polygons = structure.slice_polygons(10.0);
        assert_eq!(polygons.ring_count(), 2);

        let polygons = structure.slice_polygons(20.0);
        assert_eq!(polygons.ring_count(), 1);
    }

    #[test]
    fn test_degenerate_contours_excluded() {
        let mut structure = Structure::new("oar", "Cord", Color::new(0, 255, 0));
        structure.contours.push(Contour {
            slice_position: 0.0,
            points: vec![1.0, 2.0, 0.0, 3.0, 4.0, 0.0],
            point_count: 2,
        });
        assert!(structure.slice_polygons(0.0).is_empty());
    }

    #[test]
    fn test_structure_lookup() {
        let mut set = StructureSet::new();
        set.structures
            .push(Structure::new("a", "A", Color::new(1, 2, 3)));
        assert!(set.structure("a").is_some());
        assert!(set.structure("b").is_none());
        set.structure_mut("a").unwrap().name = "renamed".to_string();
        assert_eq!(set.structure("a").unwrap().name, "renamed");
    }
}
