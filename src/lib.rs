//! # contouredit
//!
//! A contour editing engine for radiotherapy structure sets.
//!
//! Clinicians edit structure contours (closed 2D regions marking anatomy or
//! targets on cross-sectional images) by painting with a brush or drawing
//! polygons on an image slice. This crate is the editing core: the polygon
//! data model, the coordinate-transform pipeline between patient
//! millimeters, image pixels and display pixels, the fixed-point boolean
//! geometry used to merge strokes into existing contours, and the
//! interaction state machine that turns pointer input into committed edits.
//!
//! Image decoding, structure-set persistence and all UI chrome live in
//! external collaborators; the engine receives decoded spatial metadata and
//! a loaded structure set, and hands the updated set to a render callback
//! after every commit.
//!
//! ## Example
//!
//! ```
//! use contouredit::{
//!     BrushEditor, Color, ContourStore, ImageGeometry, Modifiers, Point2,
//!     PointerButton, Structure, StructureSet, Viewport,
//! };
//!
//! # fn main() -> contouredit::Result<()> {
//! let mut set = StructureSet::new();
//! set.structures
//!     .push(Structure::new("ptv", "PTV", Color::new(255, 0, 0)));
//!
//! let viewport = Viewport::new(512.0, 512.0, 512, 512);
//! let mut editor = BrushEditor::new(ContourStore::new(set), viewport, Box::new(|_set| {}));
//!
//! // Per-image spatial metadata arrives from the displayed slice
//! let geometry = ImageGeometry::axial([-256.0, -256.0, 0.0], [1.0, 1.0], 512, 512);
//! editor.set_image_geometry(&geometry)?;
//! editor.set_active_structure("ptv")?;
//! editor.set_slice(0.0);
//!
//! // A short stroke paints a new contour
//! editor.pointer_down(PointerButton::Primary, Point2::new(250.0, 256.0), Modifiers::default())?;
//! editor.pointer_move(Point2::new(262.0, 256.0), Modifiers::default())?;
//! editor.pointer_up(PointerButton::Primary, Point2::new(262.0, 256.0))?;
//!
//! assert!(editor.store().slice_area("ptv", 0.0)? > 0.0);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod brush;
pub mod classifier;
pub mod clipping;
pub mod editor;
pub mod error;
pub mod fixed;
pub mod model;
pub mod store;
pub mod transform;

pub use classifier::{ClassificationPolicy, OperationLock, StrokeOperation};
pub use clipping::PointLocation;
pub use editor::{
    BrushEditor, BrushOptions, EditorState, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, Modifiers,
    PointerButton, RenderCallback, StructureSaver,
};
pub use error::{Error, Result};
pub use model::{
    Color, Contour, ImageGeometry, MultiPolygon, Point2, Ring, SLICE_TOLERANCE_MM, Structure,
    StructureSet,
};
pub use store::ContourStore;
pub use transform::{CoordinateTransform, Viewport};
