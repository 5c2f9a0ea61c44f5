//! Coordinate transforms between patient, pixel and display space
//!
//! Three spaces are involved in every edit:
//!
//! - **patient/world**: millimeters, anchored to the imaging device's frame
//! - **pixel**: image-intrinsic column/row indices
//! - **display**: on-screen pixels, subject to zoom and pan
//!
//! The pixel/world mapping is the 2D affine map obtained by restricting the
//! image's direction-cosine matrix to the image plane, per the DICOM pixel
//! plane equation: a pixel at column `c`, row `r` sits at
//! `origin + c * col_spacing * row_cosines + r * row_spacing * col_cosines`.
//! The inverse is the 2x2 matrix inverse, so `world -> pixel -> world` is a
//! near-identity up to floating rounding. The transform is derived strictly
//! from the cosine matrix; no empirical axis swap or mirror is applied on
//! top of it.
//!
//! Construction fails fast on unusable metadata. Callers with no metadata at
//! all hold no transform and must report that, never guess a scale.

use nalgebra::{Matrix2, Vector2};

use crate::error::{Error, Result};
use crate::model::{ImageGeometry, Point2};

/// How far direction cosines may deviate from unit length
const COSINE_NORM_TOLERANCE: f64 = 0.01;

/// Determinant threshold below which the in-plane matrix counts as singular
const SINGULAR_EPSILON: f64 = 1e-9;

/// Pixel/world affine transform for one displayed image
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateTransform {
    origin: Vector2<f64>,
    pixel_to_world: Matrix2<f64>,
    world_to_pixel: Matrix2<f64>,
}

impl CoordinateTransform {
    /// Build the transform from per-image spatial metadata
    ///
    /// Fails with `E1002` when the spacing is non-positive or non-finite,
    /// the direction cosines are not unit vectors, or the image plane is
    /// perpendicular to the patient x/y plane (in-plane matrix singular).
    pub fn from_geometry(geometry: &ImageGeometry) -> Result<Self> {
        let [row_spacing, col_spacing] = geometry.pixel_spacing;
        for (name, spacing) in [("row spacing", row_spacing), ("column spacing", col_spacing)] {
            if !spacing.is_finite() || spacing <= 0.0 {
                return Err(Error::degenerate_geometry(
                    "pixel_spacing",
                    &format!("{} must be positive, got {}", name, spacing),
                ));
            }
        }

        let row_cos = geometry.row_cosines();
        let col_cos = geometry.col_cosines();
        for (name, cos) in [("row", row_cos), ("column", col_cos)] {
            let norm = (cos[0] * cos[0] + cos[1] * cos[1] + cos[2] * cos[2]).sqrt();
            if !norm.is_finite() || (norm - 1.0).abs() > COSINE_NORM_TOLERANCE {
                return Err(Error::degenerate_geometry(
                    "image_orientation_patient",
                    &format!("{} cosines are not a unit vector (norm {})", name, norm),
                ));
            }
        }

        // Column index advances along the row cosines, row index along the
        // column cosines
        let pixel_to_world = Matrix2::new(
            col_spacing * row_cos[0],
            row_spacing * col_cos[0],
            col_spacing * row_cos[1],
            row_spacing * col_cos[1],
        );
        if pixel_to_world.determinant().abs() < SINGULAR_EPSILON {
            return Err(Error::degenerate_geometry(
                "image_orientation_patient",
                "image plane is perpendicular to the patient x/y plane",
            ));
        }
        let world_to_pixel = pixel_to_world
            .try_inverse()
            .ok_or_else(|| {
                Error::degenerate_geometry("image_orientation_patient", "matrix not invertible")
            })?;

        Ok(Self {
            origin: Vector2::new(
                geometry.image_position_patient[0],
                geometry.image_position_patient[1],
            ),
            pixel_to_world,
            world_to_pixel,
        })
    }

    /// Map a pixel coordinate (x = column, y = row) to patient millimeters
    pub fn pixel_to_world(&self, pixel: Point2) -> Point2 {
        let world = self.origin + self.pixel_to_world * Vector2::new(pixel.x, pixel.y);
        Point2::new(world.x, world.y)
    }

    /// Map a patient-space point to pixel coordinates (x = column, y = row)
    pub fn world_to_pixel(&self, world: Point2) -> Point2 {
        let pixel = self.world_to_pixel * (Vector2::new(world.x, world.y) - self.origin);
        Point2::new(pixel.x, pixel.y)
    }

    /// Map a display-space point all the way to patient millimeters
    pub fn display_to_world(&self, viewport: &Viewport, display: Point2) -> Point2 {
        self.pixel_to_world(viewport.display_to_pixel(display))
    }

    /// Map a patient-space point all the way to display space
    pub fn world_to_display(&self, viewport: &Viewport, world: Point2) -> Point2 {
        viewport.pixel_to_display(self.world_to_pixel(world))
    }
}

/// Display-space view state: canvas size, zoom and pan
///
/// The image is fit to the canvas and centered by default; `zoom` scales on
/// top of the fit and `pan` translates in display pixels. The display/pixel
/// pair is a pure affine map and an exact inverse pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    /// Canvas width, display pixels
    pub canvas_width: f64,
    /// Canvas height, display pixels
    pub canvas_height: f64,
    /// Image width, pixel columns
    pub image_columns: f64,
    /// Image height, pixel rows
    pub image_rows: f64,
    /// Zoom factor on top of the fit-to-canvas scale
    pub zoom: f64,
    /// Pan offset, display pixels
    pub pan: (f64, f64),
}

impl Viewport {
    /// Create a viewport with zoom 1 and no pan
    pub fn new(canvas_width: f64, canvas_height: f64, image_columns: u32, image_rows: u32) -> Self {
        Self {
            canvas_width,
            canvas_height,
            image_columns: image_columns.max(1) as f64,
            image_rows: image_rows.max(1) as f64,
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }

    /// Effective display pixels per image pixel
    pub fn scale(&self) -> f64 {
        let fit = (self.canvas_width / self.image_columns)
            .min(self.canvas_height / self.image_rows);
        fit * self.zoom
    }

    /// Display-space position of pixel (0, 0)
    fn offset(&self) -> (f64, f64) {
        let scale = self.scale();
        (
            (self.canvas_width - scale * self.image_columns) / 2.0 + self.pan.0,
            (self.canvas_height - scale * self.image_rows) / 2.0 + self.pan.1,
        )
    }

    /// Map a pixel coordinate to display space
    pub fn pixel_to_display(&self, pixel: Point2) -> Point2 {
        let scale = self.scale();
        let (ox, oy) = self.offset();
        Point2::new(pixel.x * scale + ox, pixel.y * scale + oy)
    }

    /// Map a display-space point to pixel coordinates
    pub fn display_to_pixel(&self, display: Point2) -> Point2 {
        let scale = self.scale();
        let (ox, oy) = self.offset();
        Point2::new((display.x - ox) / scale, (display.y - oy) / scale)
    }

    /// Set the zoom factor, clamped to a sane positive range
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(0.01, 100.0);
    }

    /// Translate the view by a display-space delta
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }
}
