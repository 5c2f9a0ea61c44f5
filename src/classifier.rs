//! Additive/subtractive stroke classification
//!
//! Each stroke is either additive (unioned into the existing contour) or
//! subtractive (carved out of it). The decision is made exactly once, at
//! stroke start, and locked for the stroke's duration: a brush dragged
//! across the boundary it is editing must not flip operation mid-stroke.

use crate::clipping;
use crate::model::{MultiPolygon, Point2};

/// How the operation for a stroke is chosen
///
/// One brush tool parametrized by policy, selected at stroke start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassificationPolicy {
    /// Decide from where the stroke starts: inside the existing contour
    /// extends it, outside carves it down toward the cursor. A held
    /// modifier inverts the decision; an empty slice always paints.
    #[default]
    Smart,
    /// Always paint
    FixedAdditive,
    /// Always erase
    FixedSubtractive,
}

/// The committed effect of one stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeOperation {
    /// Union the stroke into the existing contour
    Additive,
    /// Subtract the stroke from the existing contour
    Subtractive,
}

impl StrokeOperation {
    /// The opposite operation
    pub fn inverted(self) -> Self {
        match self {
            StrokeOperation::Additive => StrokeOperation::Subtractive,
            StrokeOperation::Subtractive => StrokeOperation::Additive,
        }
    }
}

/// Classify a stroke from its start point
///
/// `existing` is the active structure's multipolygon on the current slice.
/// With nothing on the slice a smart stroke is forced additive regardless of
/// the modifier; the fixed policies keep their stated operation (a fixed
/// subtractive stroke on an empty slice commits as a no-op rather than
/// painting).
pub fn classify(
    policy: ClassificationPolicy,
    start: Point2,
    existing: &MultiPolygon,
    invert: bool,
) -> StrokeOperation {
    match policy {
        ClassificationPolicy::FixedAdditive => StrokeOperation::Additive,
        ClassificationPolicy::FixedSubtractive => StrokeOperation::Subtractive,
        ClassificationPolicy::Smart => {
            if existing.is_empty() {
                return StrokeOperation::Additive;
            }
            let location = clipping::point_in_multipolygon(start, existing);
            let operation = if location.inside {
                StrokeOperation::Additive
            } else {
                StrokeOperation::Subtractive
            };
            if invert { operation.inverted() } else { operation }
        }
    }
}

/// Per-stroke operation lock
///
/// Unlocked between strokes; locked from pointer-down to pointer-up. While
/// locked, further lock attempts keep the original decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationLock {
    locked: Option<StrokeOperation>,
}

impl OperationLock {
    /// A released lock
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock in an operation for the stroke; returns the operation that
    /// actually holds (the first one locked)
    pub fn lock(&mut self, operation: StrokeOperation) -> StrokeOperation {
        *self.locked.get_or_insert(operation)
    }

    /// The locked operation, if a stroke is in progress
    pub fn current(&self) -> Option<StrokeOperation> {
        self.locked
    }

    /// Whether a stroke currently holds the lock
    pub fn is_locked(&self) -> bool {
        self.locked.is_some()
    }

    /// Release at stroke end
    pub fn release(&mut self) {
        self.locked = None;
    }
}
