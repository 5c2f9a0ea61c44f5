//! Data model for contour editing
//!
//! Split into planar geometry ([`geometry`]), the structure set handed
//! across the crate boundary ([`structure`]), and per-image spatial
//! metadata ([`spatial`]).

pub mod geometry;
pub mod spatial;
pub mod structure;

pub use geometry::{MultiPolygon, Point2, Ring, ring_signed_area, strip_closing_vertex};
pub use spatial::ImageGeometry;
pub use structure::{Color, Contour, SLICE_TOLERANCE_MM, Structure, StructureSet};
