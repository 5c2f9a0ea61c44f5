//! Interactive brush editing state machine
//!
//! Drives the whole pipeline from raw pointer input to committed contour
//! edits: display coordinates go through the transform to patient space,
//! the classifier locks an operation at stroke start, the brush builder
//! turns the accumulated path into a polygon at stroke end, and the contour
//! store commits it. Every collaborator is injected at construction: the
//! editor holds the transform, the viewport and the render callback
//! directly, and a save collaborator is passed explicitly to [`BrushEditor::save`].
//!
//! Event handling is single-threaded and synchronous: each pointer or key
//! event runs to completion (including the boolean-geometry commit) before
//! the next is processed, so a stroke's result is always visible before the
//! following stroke starts.

use log::debug;

use crate::brush;
use crate::classifier::{ClassificationPolicy, OperationLock, classify};
use crate::error::{Error, Result};
use crate::model::{ImageGeometry, MultiPolygon, Point2, StructureSet};
use crate::store::ContourStore;
use crate::transform::{CoordinateTransform, Viewport};

/// Smallest allowed brush size (diameter), millimeters
pub const MIN_BRUSH_SIZE: f64 = 1.0;

/// Largest allowed brush size (diameter), millimeters
pub const MAX_BRUSH_SIZE: f64 = 100.0;

/// Interaction state
///
/// Drawing (primary button) and Resizing (secondary button) are mutually
/// exclusive; separate buttons gate them, and events arriving for the other
/// state are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    /// No interaction in progress
    #[default]
    Idle,
    /// A stroke is being drawn
    Drawing,
    /// The brush is being resized by pointer drag
    Resizing,
}

/// Pointer buttons the editor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Draws strokes
    Primary,
    /// Resizes the brush
    Secondary,
}

/// Keyboard modifier state accompanying pointer events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Inverts the smart additive/subtractive decision
    pub invert: bool,
    /// Routes wheel movement to brush resizing
    pub resize: bool,
}

/// Brush configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushOptions {
    /// Brush diameter, millimeters; the stroke radius is half this
    pub brush_size: f64,
    /// Brush-size change per display pixel of resize drag
    pub resize_sensitivity: f64,
    /// Drop interior holes after additive commits
    pub fill_mode: bool,
    /// How strokes are classified
    pub policy: ClassificationPolicy,
}

impl Default for BrushOptions {
    fn default() -> Self {
        Self {
            brush_size: 10.0,
            resize_sensitivity: 0.25,
            fill_mode: false,
            policy: ClassificationPolicy::Smart,
        }
    }
}

/// Persistence collaborator for explicit saves
///
/// Transport is the collaborator's concern; the engine hands over the full
/// updated structure set and the id of the structure that was edited.
pub trait StructureSaver {
    /// Persist one structure out of the given set
    fn save_structure(&mut self, set: &StructureSet, structure_id: &str) -> Result<()>;
}

/// Callback fired with the updated structure set after every commit
pub type RenderCallback = Box<dyn FnMut(&StructureSet)>;

/// The interactive contour editor
pub struct BrushEditor {
    store: ContourStore,
    transform: Option<CoordinateTransform>,
    viewport: Viewport,
    render: RenderCallback,
    options: BrushOptions,
    active_structure: Option<String>,
    current_slice: f64,
    state: EditorState,
    stroke: Vec<Point2>,
    lock: OperationLock,
    resize_anchor: (f64, f64),
    polygon_draft: Option<Vec<Point2>>,
}

impl BrushEditor {
    /// Create an editor over a loaded structure set
    ///
    /// The render callback receives the full updated set after every commit.
    /// No transform is available until [`BrushEditor::set_image_geometry`]
    /// is called with the displayed image's metadata.
    pub fn new(store: ContourStore, viewport: Viewport, render: RenderCallback) -> Self {
        Self {
            store,
            transform: None,
            viewport,
            render,
            options: BrushOptions::default(),
            active_structure: None,
            current_slice: 0.0,
            state: EditorState::Idle,
            stroke: Vec::new(),
            lock: OperationLock::new(),
            resize_anchor: (0.0, 0.0),
            polygon_draft: None,
        }
    }

    /// Current interaction state
    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Current brush options
    pub fn options(&self) -> &BrushOptions {
        &self.options
    }

    /// Current brush diameter, millimeters
    pub fn brush_size(&self) -> f64 {
        self.options.brush_size
    }

    /// Set the brush diameter, clamped to the allowed range
    pub fn set_brush_size(&mut self, size: f64) {
        self.options.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    /// Select the stroke classification policy
    pub fn set_policy(&mut self, policy: ClassificationPolicy) {
        self.options.policy = policy;
    }

    /// Toggle fill mode
    pub fn set_fill_mode(&mut self, fill_mode: bool) {
        self.options.fill_mode = fill_mode;
    }

    /// The contour store (read access for rendering and inspection)
    pub fn store(&self) -> &ContourStore {
        &self.store
    }

    /// Mutable viewport access for zoom/pan driven by the host
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Supply spatial metadata for the displayed image
    ///
    /// Replaces the active transform; fails fast on unusable metadata,
    /// leaving no transform in place (edits then report `E1001` rather than
    /// guessing a scale).
    pub fn set_image_geometry(&mut self, geometry: &ImageGeometry) -> Result<()> {
        self.transform = None;
        self.transform = Some(CoordinateTransform::from_geometry(geometry)?);
        Ok(())
    }

    /// Drop the active transform (no image displayed)
    pub fn clear_image_geometry(&mut self) {
        self.transform = None;
    }

    /// Select the structure being edited
    pub fn set_active_structure(&mut self, structure_id: &str) -> Result<()> {
        self.store.structure(structure_id)?;
        self.active_structure = Some(structure_id.to_string());
        Ok(())
    }

    /// Set the displayed slice position, millimeters
    pub fn set_slice(&mut self, slice_position: f64) {
        self.current_slice = slice_position;
    }

    fn transform(&self) -> Result<&CoordinateTransform> {
        self.transform
            .as_ref()
            .ok_or_else(|| Error::no_transform("no spatial metadata for the displayed image"))
    }

    fn active_structure(&self) -> Result<&str> {
        self.active_structure
            .as_deref()
            .ok_or(Error::NoActiveStructure)
    }

    fn display_to_world(&self, display: Point2) -> Result<Point2> {
        Ok(self.transform()?.display_to_world(&self.viewport, display))
    }

    /// Handle a pointer-button press
    pub fn pointer_down(
        &mut self,
        button: PointerButton,
        display: Point2,
        modifiers: Modifiers,
    ) -> Result<()> {
        if self.state != EditorState::Idle {
            return Ok(());
        }
        match button {
            PointerButton::Primary => self.begin_stroke(display, modifiers),
            PointerButton::Secondary => {
                self.resize_anchor = (display.x, display.y);
                self.state = EditorState::Resizing;
                Ok(())
            }
        }
    }

    fn begin_stroke(&mut self, display: Point2, modifiers: Modifiers) -> Result<()> {
        let structure_id = self.active_structure()?.to_string();
        let world = self.display_to_world(display)?;
        let existing = self.store.slice_polygons(&structure_id, self.current_slice)?;
        let operation = classify(self.options.policy, world, &existing, modifiers.invert);
        self.lock.lock(operation);
        self.stroke.clear();
        self.stroke.push(world);
        self.state = EditorState::Drawing;
        debug!(
            "stroke started on '{}' slice {} as {:?}",
            structure_id, self.current_slice, operation
        );
        Ok(())
    }

    /// Handle pointer movement
    pub fn pointer_move(&mut self, display: Point2, _modifiers: Modifiers) -> Result<()> {
        match self.state {
            EditorState::Drawing => {
                let world = self.display_to_world(display)?;
                self.stroke.push(world);
                Ok(())
            }
            EditorState::Resizing => {
                let dx = display.x - self.resize_anchor.0;
                let dy = display.y - self.resize_anchor.1;
                let delta = (dx - dy) * self.options.resize_sensitivity;
                self.set_brush_size(self.options.brush_size + delta);
                self.resize_anchor = (display.x, display.y);
                Ok(())
            }
            EditorState::Idle => Ok(()),
        }
    }

    /// Handle a pointer-button release
    pub fn pointer_up(&mut self, button: PointerButton, display: Point2) -> Result<()> {
        match (self.state, button) {
            (EditorState::Drawing, PointerButton::Primary) => {
                if let Ok(world) = self.display_to_world(display) {
                    self.stroke.push(world);
                }
                self.finish_stroke()
            }
            (EditorState::Resizing, PointerButton::Secondary) => {
                self.state = EditorState::Idle;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Handle the pointer leaving the canvas; ends any stroke in progress
    pub fn pointer_leave(&mut self) -> Result<()> {
        match self.state {
            EditorState::Drawing => self.finish_stroke(),
            EditorState::Resizing => {
                self.state = EditorState::Idle;
                Ok(())
            }
            EditorState::Idle => Ok(()),
        }
    }

    /// Cancel the in-progress interaction without committing
    ///
    /// Discards accumulated stroke points and any polygon draft; committed
    /// contours are untouched.
    pub fn cancel(&mut self) {
        self.stroke.clear();
        self.lock.release();
        self.polygon_draft = None;
        self.state = EditorState::Idle;
    }

    /// Handle a scroll-wheel tick
    ///
    /// With the resize modifier held the wheel adjusts the brush size; this
    /// alternate gesture is ignored while a drag-resize is in progress.
    pub fn wheel(&mut self, delta: f64, modifiers: Modifiers) {
        if modifiers.resize && self.state != EditorState::Resizing {
            self.set_brush_size(self.options.brush_size + delta);
        }
    }

    /// The in-progress stroke polygon, for live preview rendering
    pub fn preview_stroke(&self) -> Option<MultiPolygon> {
        if self.state != EditorState::Drawing || self.stroke.is_empty() {
            return None;
        }
        Some(brush::stroke_polygon(
            &self.stroke,
            self.options.brush_size / 2.0,
        ))
    }

    fn finish_stroke(&mut self) -> Result<()> {
        let points = std::mem::take(&mut self.stroke);
        let operation = self.lock.current();
        self.lock.release();
        self.state = EditorState::Idle;

        // A click records its point on both down and up; fewer than 2
        // recorded points means the stroke never really started
        if points.len() < 2 {
            return Ok(());
        }
        let Some(operation) = operation else {
            return Ok(());
        };
        let stroke = brush::stroke_polygon(&points, self.options.brush_size / 2.0);
        let structure_id = self.active_structure()?.to_string();
        self.store.commit_stroke(
            &structure_id,
            self.current_slice,
            &stroke,
            operation,
            self.options.fill_mode,
        )?;
        (self.render)(self.store.structure_set());
        Ok(())
    }

    /// Start drafting a polygon with the polygon tool
    ///
    /// Drops any previous draft. Vertices are added with
    /// [`BrushEditor::push_polygon_vertex`] and the shape is committed by
    /// [`BrushEditor::close_polygon`].
    pub fn begin_polygon(&mut self) {
        self.polygon_draft = Some(Vec::new());
    }

    /// Append a vertex to the polygon draft
    ///
    /// Fails when no draft is in progress.
    pub fn push_polygon_vertex(&mut self, display: Point2) -> Result<()> {
        let world = self.display_to_world(display)?;
        let draft = self.polygon_draft.as_mut().ok_or_else(|| {
            Error::InvalidPolygon("no polygon draft in progress".to_string())
        })?;
        draft.push(world);
        Ok(())
    }

    /// Close and commit the drafted polygon
    ///
    /// Classified like a brush stroke, from the draft's first vertex. A
    /// draft with fewer than 3 vertices is discarded without committing.
    pub fn close_polygon(&mut self, modifiers: Modifiers) -> Result<()> {
        let Some(draft) = self.polygon_draft.take() else {
            return Ok(());
        };
        if draft.len() < 3 {
            debug!("polygon draft with {} vertices discarded", draft.len());
            return Ok(());
        }
        let structure_id = self.active_structure()?.to_string();
        let existing = self.store.slice_polygons(&structure_id, self.current_slice)?;
        let operation = classify(self.options.policy, draft[0], &existing, modifiers.invert);
        let polygon = MultiPolygon::from_rings(vec![draft]);
        self.store.commit_stroke(
            &structure_id,
            self.current_slice,
            &polygon,
            operation,
            self.options.fill_mode,
        )?;
        (self.render)(self.store.structure_set());
        Ok(())
    }

    /// Hand the current structure set to a persistence collaborator
    ///
    /// Saves the active structure; edits stay in memory until this is
    /// called.
    pub fn save(&mut self, saver: &mut dyn StructureSaver) -> Result<()> {
        let structure_id = self.active_structure()?.to_string();
        saver.save_structure(self.store.structure_set(), &structure_id)
    }
}
