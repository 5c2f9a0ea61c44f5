//! Error types for contour editing
//!
//! All errors are local and recoverable: a failed stroke never takes down the
//! hosting application. Error codes follow the pattern `E<category><number>`:
//!
//! - **E1xxx**: spatial metadata and coordinate transforms
//! - **E2xxx**: polygon geometry
//! - **E3xxx**: structure-set data

use thiserror::Error;

/// Result type for contour editing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing contours
#[derive(Error, Debug)]
pub enum Error {
    /// No coordinate transform is available for the displayed image
    ///
    /// **Error Code**: E1001
    ///
    /// Raised when an edit is attempted before per-image spatial metadata has
    /// been supplied. The engine never falls back to a guessed scale, since
    /// that would misplace edits by an unknown amount.
    #[error("[E1001] no transform available: {0}")]
    NoTransform(String),

    /// The per-image spatial metadata cannot produce an invertible transform
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Non-positive or non-finite pixel spacing
    /// - Direction cosines that are not unit vectors
    /// - An image plane perpendicular to the patient x/y plane (the in-plane
    ///   2x2 matrix is singular)
    #[error("[E1002] degenerate image geometry: {0}")]
    DegenerateGeometry(String),

    /// Polygon input is structurally invalid or used out of sequence
    ///
    /// **Error Code**: E2001
    ///
    /// Malformed rings coming out of a boolean operation are dropped
    /// silently instead; this error is reserved for misuse of the polygon
    /// drafting API.
    #[error("[E2001] invalid polygon: {0}")]
    InvalidPolygon(String),

    /// A structure id does not exist in the loaded structure set
    ///
    /// **Error Code**: E3001
    #[error("[E3001] unknown structure: {0}")]
    UnknownStructure(String),

    /// No structure is active for editing
    ///
    /// **Error Code**: E3002
    #[error("[E3002] no active structure selected")]
    NoActiveStructure,

    /// Persisting an edited structure failed
    ///
    /// **Error Code**: E3003
    ///
    /// Returned by save collaborators; the in-memory edit is kept.
    #[error("[E3003] save failed for structure '{structure_id}': {message}")]
    SaveFailed {
        /// Id of the structure that could not be saved
        structure_id: String,
        /// Collaborator-provided description of the failure
        message: String,
    },
}

impl Error {
    /// Create a [`Error::NoTransform`] naming the missing metadata
    pub fn no_transform(what: impl Into<String>) -> Self {
        Error::NoTransform(what.into())
    }

    /// Create a [`Error::DegenerateGeometry`] with a field name and value
    pub fn degenerate_geometry(field: &str, detail: &str) -> Self {
        Error::DegenerateGeometry(format!("{}: {}", field, detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let no_transform = Error::no_transform("current image");
        assert!(no_transform.to_string().contains("[E1001]"));

        let degenerate = Error::degenerate_geometry("pixel_spacing", "must be positive");
        assert!(degenerate.to_string().contains("[E1002]"));
        assert!(degenerate.to_string().contains("pixel_spacing"));

        let invalid = Error::InvalidPolygon("no draft in progress".to_string());
        assert!(invalid.to_string().contains("[E2001]"));

        let unknown = Error::UnknownStructure("ptv-1".to_string());
        assert!(unknown.to_string().contains("[E3001]"));
        assert!(unknown.to_string().contains("ptv-1"));
    }

    #[test]
    fn test_save_failed_message() {
        let err = Error::SaveFailed {
            structure_id: "gtv".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("[E3003]"));
        assert!(err.to_string().contains("gtv"));
        assert!(err.to_string().contains("connection refused"));
    }
}
