//! Contour store: committed polygons per structure and slice
//!
//! Owns the structure set for the editing session and implements the commit
//! protocol: fetch the current slice's polygons (slice-tolerance match),
//! combine with a stroke, clean up, and replace every matching contour with
//! the result. Replacement is always a full-slice overwrite, never an
//! incremental patch, and touches only the affected structure's contours;
//! no other structure or slice is cloned or rewritten.

use log::debug;

use crate::classifier::StrokeOperation;
use crate::clipping;
use crate::error::{Error, Result};
use crate::model::{Contour, MultiPolygon, Structure, StructureSet, ring_signed_area};

/// The contour store for one editing session
#[derive(Debug, Clone, Default)]
pub struct ContourStore {
    set: StructureSet,
}

impl ContourStore {
    /// Create a store over a loaded structure set
    pub fn new(set: StructureSet) -> Self {
        Self { set }
    }

    /// The current structure set, in external-interface shape
    pub fn structure_set(&self) -> &StructureSet {
        &self.set
    }

    /// Consume the store, returning the structure set
    pub fn into_structure_set(self) -> StructureSet {
        self.set
    }

    /// Look up a structure by id
    pub fn structure(&self, structure_id: &str) -> Result<&Structure> {
        self.set
            .structure(structure_id)
            .ok_or_else(|| Error::UnknownStructure(structure_id.to_string()))
    }

    fn structure_mut(&mut self, structure_id: &str) -> Result<&mut Structure> {
        self.set
            .structure_mut(structure_id)
            .ok_or_else(|| Error::UnknownStructure(structure_id.to_string()))
    }

    /// The structure's polygons on the given slice
    ///
    /// Merges every contour within the slice tolerance into one working
    /// multipolygon.
    pub fn slice_polygons(&self, structure_id: &str, slice_position: f64) -> Result<MultiPolygon> {
        Ok(self.structure(structure_id)?.slice_polygons(slice_position))
    }

    /// Net contoured area on the given slice, square millimeters
    pub fn slice_area(&self, structure_id: &str, slice_position: f64) -> Result<f64> {
        Ok(clipping::area(
            &self.slice_polygons(structure_id, slice_position)?,
        ))
    }

    /// Replace every contour matching the slice with the given polygons
    ///
    /// Rings with fewer than 3 vertices are dropped rather than persisted.
    pub fn replace_slice(
        &mut self,
        structure_id: &str,
        slice_position: f64,
        polygons: &MultiPolygon,
    ) -> Result<()> {
        let structure = self.structure_mut(structure_id)?;
        structure.contours.retain(|c| !c.matches_slice(slice_position));
        for ring in &polygons.rings {
            if ring.len() < 3 {
                debug!(
                    "dropping degenerate ring ({} points) on slice {}",
                    ring.len(),
                    slice_position
                );
                continue;
            }
            structure
                .contours
                .push(Contour::from_ring(slice_position, ring));
        }
        Ok(())
    }

    /// Commit one stroke against the structure's current slice
    ///
    /// Additive strokes union into the existing polygons, subtractive
    /// strokes carve out of them (a no-op when the slice is empty). With
    /// `fill_mode` set, an additive commit also drops interior hole rings so
    /// fully enclosed gaps end up filled. An empty stroke commits nothing.
    ///
    /// # Arguments
    ///
    /// * `structure_id` - Id of the structure being edited
    /// * `slice_position` - Displayed slice, millimeters; every stored
    ///   contour within the slice tolerance takes part and is replaced
    /// * `stroke` - The stroke polygon in patient millimeters
    /// * `operation` - Additive or subtractive, locked at stroke start
    /// * `fill_mode` - Drop hole rings after an additive union
    pub fn commit_stroke(
        &mut self,
        structure_id: &str,
        slice_position: f64,
        stroke: &MultiPolygon,
        operation: StrokeOperation,
        fill_mode: bool,
    ) -> Result<()> {
        if stroke.is_empty() {
            return Ok(());
        }
        let current = self.slice_polygons(structure_id, slice_position)?;
        let result = match operation {
            StrokeOperation::Additive => {
                let merged = clipping::union(&current, stroke);
                if fill_mode { remove_holes(merged) } else { merged }
            }
            StrokeOperation::Subtractive => {
                if current.is_empty() {
                    return Ok(());
                }
                clipping::difference(&current, stroke)
            }
        };
        self.replace_slice(structure_id, slice_position, &result)
    }
}

/// Drop hole rings, keeping exterior rings only
///
/// Holes are identified by winding orientation: their signed area has the
/// opposite sign of the dominant (largest-magnitude) ring. Ring order in the
/// backend's output carries no meaning and is never used here.
fn remove_holes(polygons: MultiPolygon) -> MultiPolygon {
    let areas: Vec<f64> = polygons
        .rings
        .iter()
        .map(|ring| ring_signed_area(ring))
        .collect();
    let dominant = areas
        .iter()
        .fold(0.0_f64, |acc, &a| if a.abs() > acc.abs() { a } else { acc });
    if dominant == 0.0 {
        return polygons;
    }
    let rings = polygons
        .rings
        .into_iter()
        .zip(areas)
        .filter(|(_, a)| a.signum() == dominant.signum())
        .map(|(ring, _)| ring)
        .collect();
    MultiPolygon::from_rings(rings)
}
