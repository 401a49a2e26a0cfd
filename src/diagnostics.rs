//! Diagnostic records for recoverable data faults.
//!
//! Faults found while building or processing a mesh are kept on the mesh as
//! [`Diagnostic`] values and also emitted as `tracing` warnings, so a shared
//! subscriber sees them from every worker thread.

use std::fmt;

use tracing::warn;

use crate::error::MeshError;
use crate::mesh::TriangleId;

/// One recoverable fault, attributed to its source entity and face.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Source entity label, if the mesh was given one.
    pub entity: Option<i64>,
    /// Source face identifier of the offending triangle.
    pub face_id: i32,
    /// The offending triangle.
    pub triangle: TriangleId,
    /// What went wrong.
    pub error: MeshError,
}

impl Diagnostic {
    /// Record a fault and emit it through `tracing`.
    pub(crate) fn report(
        entity: Option<i64>,
        face_id: i32,
        triangle: TriangleId,
        error: MeshError,
    ) -> Self {
        let d = Self {
            entity,
            face_id,
            triangle,
            error,
        };
        warn!(entity = ?d.entity, face = d.face_id, triangle = ?d.triangle, "{}", d.error);
        d
    }

    /// Whether this is an orientation conflict.
    pub fn is_orientation_conflict(&self) -> bool {
        matches!(self.error, MeshError::OrientationConflict { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entity {
            Some(entity) => write!(f, "#{} face {}: {}", entity, self.face_id, self.error),
            None => write!(f, "face {}: {}", self.face_id, self.error),
        }
    }
}
