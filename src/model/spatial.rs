//! Per-image spatial metadata
//!
//! Supplied per displayed slice by an external metadata collaborator,
//! already decoded from the image header. Field layout follows the DICOM
//! attributes of the same names.

/// Spatial metadata for one displayed image slice
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageGeometry {
    /// Patient-space coordinates of the center of the first (top-left)
    /// pixel, millimeters
    pub image_position_patient: [f64; 3],
    /// Direction cosines: the first three values are the unit vector along
    /// increasing column index (the image row direction), the last three the
    /// unit vector along increasing row index (the image column direction)
    pub image_orientation_patient: [f64; 6],
    /// Physical distance between pixel centers, millimeters:
    /// `[row_spacing, column_spacing]` (row spacing separates adjacent rows)
    pub pixel_spacing: [f64; 2],
    /// Number of pixel rows
    pub rows: u32,
    /// Number of pixel columns
    pub columns: u32,
}

impl ImageGeometry {
    /// An axial, unrotated geometry: identity orientation with the given
    /// origin and spacing. The common case for CT series.
    pub fn axial(origin: [f64; 3], pixel_spacing: [f64; 2], rows: u32, columns: u32) -> Self {
        Self {
            image_position_patient: origin,
            image_orientation_patient: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            pixel_spacing,
            rows,
            columns,
        }
    }

    /// Unit vector along increasing column index
    pub fn row_cosines(&self) -> [f64; 3] {
        let o = &self.image_orientation_patient;
        [o[0], o[1], o[2]]
    }

    /// Unit vector along increasing row index
    pub fn col_cosines(&self) -> [f64; 3] {
        let o = &self.image_orientation_patient;
        [o[3], o[4], o[5]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axial_geometry() {
        let geom = ImageGeometry::axial([-250.0, -250.0, 42.0], [0.977, 0.977], 512, 512);
        assert_eq!(geom.row_cosines(), [1.0, 0.0, 0.0]);
        assert_eq!(geom.col_cosines(), [0.0, 1.0, 0.0]);
        assert_eq!(geom.rows, 512);
    }
}
