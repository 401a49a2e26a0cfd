//! Mesh construction and processing options.

use std::f64::consts::{FRAC_PI_6, PI};

use crate::error::{MeshError, Result};

/// Default welding tolerance.
pub const DEFAULT_PRECISION: f64 = 1e-5;

/// Default dihedral angle above which an edge is sharp (30 degrees).
pub const DEFAULT_SHARP_ANGLE: f64 = FRAC_PI_6;

/// Options controlling how a [`TriangulatedMesh`](crate::mesh::TriangulatedMesh)
/// is built and processed.
///
/// # Example
///
/// ```
/// use weldmesh::config::MeshOptions;
///
/// let options = MeshOptions::default()
///     .with_precision(1e-4)
///     .with_sharp_angle_degrees(45.0)
///     .with_expected_triangles(1024)
///     .with_entity_label(301);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MeshOptions {
    /// Points closer than this are welded into one vertex.
    pub precision: f64,

    /// Dihedral angle (radians) above which an edge separates smoothing groups.
    pub sharp_angle: f64,

    /// Expected number of triangles, used to size internal tables.
    pub expected_triangles: usize,

    /// Identifier of the source entity, stamped onto diagnostics.
    pub entity_label: Option<i64>,

    /// Whether the batch driver processes entities in parallel (default: true).
    pub parallel: bool,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            sharp_angle: DEFAULT_SHARP_ANGLE,
            expected_triangles: 0,
            entity_label: None,
            parallel: true,
        }
    }
}

impl MeshOptions {
    /// Set the welding tolerance. Negative values are taken by magnitude.
    pub fn with_precision(mut self, precision: f64) -> Self {
        self.precision = precision.abs();
        self
    }

    /// Set the sharp-edge threshold in radians, clamped to `[0, π]`.
    pub fn with_sharp_angle(mut self, radians: f64) -> Self {
        self.sharp_angle = radians.clamp(0.0, PI);
        self
    }

    /// Set the sharp-edge threshold in degrees, clamped to `[0, 180]`.
    pub fn with_sharp_angle_degrees(self, degrees: f64) -> Self {
        self.with_sharp_angle(degrees.to_radians())
    }

    /// Set the expected triangle count.
    pub fn with_expected_triangles(mut self, triangles: usize) -> Self {
        self.expected_triangles = triangles;
        self
    }

    /// Set the entity label reported with diagnostics.
    pub fn with_entity_label(mut self, label: i64) -> Self {
        self.entity_label = Some(label);
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check values set directly on the public fields.
    pub fn validate(&self) -> Result<()> {
        if !self.precision.is_finite() || self.precision < 0.0 {
            return Err(MeshError::invalid_param(
                "precision",
                self.precision,
                "must be finite and non-negative",
            ));
        }
        if !(0.0..=PI).contains(&self.sharp_angle) {
            return Err(MeshError::invalid_param(
                "sharp_angle",
                self.sharp_angle,
                "must lie in [0, pi] radians",
            ));
        }
        Ok(())
    }

    /// Edge table capacity derived from the expected triangle count.
    pub(crate) fn expected_edges(&self) -> usize {
        self.expected_triangles + self.expected_triangles / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let options = MeshOptions::default();
        assert_eq!(options.precision, DEFAULT_PRECISION);
        assert_relative_eq!(options.sharp_angle, PI / 6.0);
        assert!(options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_builder_sanitises() {
        let options = MeshOptions::default()
            .with_precision(-0.5)
            .with_sharp_angle(10.0)
            .sequential();
        assert_eq!(options.precision, 0.5);
        assert_eq!(options.sharp_angle, PI);
        assert!(!options.parallel);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_degrees() {
        let options = MeshOptions::default().with_sharp_angle_degrees(90.0);
        assert_relative_eq!(options.sharp_angle, PI / 2.0);
    }

    #[test]
    fn test_validate_rejects_raw_fields() {
        let mut options = MeshOptions::default();
        options.precision = f64::NAN;
        assert!(matches!(
            options.validate(),
            Err(MeshError::InvalidParameter { name: "precision", .. })
        ));

        let mut options = MeshOptions::default();
        options.sharp_angle = -0.1;
        assert!(matches!(
            options.validate(),
            Err(MeshError::InvalidParameter { name: "sharp_angle", .. })
        ));
    }

    #[test]
    fn test_expected_edges() {
        let options = MeshOptions::default().with_expected_triangles(100);
        assert_eq!(options.expected_edges(), 150);
    }
}
