//! Error types for weldmesh.
//!
//! Construction and processing of a mesh never abort on bad input data. The
//! variants describing data faults (degenerate triangles, non-manifold edges,
//! orientation conflicts) are recorded as [`Diagnostic`](crate::diagnostics::Diagnostic)
//! values on the mesh; only caller contract violations surface as `Err`.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors and faults that can occur while building or processing a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// The mesh has no triangles.
    #[error("mesh has no triangles")]
    EmptyMesh,

    /// A triangle references a vertex index that was never assigned.
    #[error("vertex index {vertex} is out of range (store has {vertex_count} vertices)")]
    InvalidVertexIndex {
        /// The invalid index.
        vertex: usize,
        /// Number of vertices in the store.
        vertex_count: usize,
    },

    /// The input holds more elements than the 32-bit arenas can address.
    #[error("too many {what}: {count} (limit {limit})")]
    CapacityExceeded {
        /// What overflowed.
        what: &'static str,
        /// Requested number of elements.
        count: usize,
        /// Largest supported number.
        limit: usize,
    },

    /// A triangle uses the same welded vertex more than once.
    #[error("triangle ({v0}, {v1}, {v2}) is degenerate (repeated vertex)")]
    DegenerateTriangle {
        /// First vertex.
        v0: usize,
        /// Second vertex.
        v1: usize,
        /// Third vertex.
        v2: usize,
    },

    /// An edge already has two incident half-edges.
    #[error("edge ({v0}, {v1}) has more than two incident triangles")]
    NonManifoldEdge {
        /// Start vertex of the rejected half-edge.
        v0: usize,
        /// End vertex of the rejected half-edge.
        v1: usize,
    },

    /// Two frozen triangles share an edge with the same direction.
    #[error("triangles sharing edge ({v0}, {v1}) cannot be oriented consistently")]
    OrientationConflict {
        /// Start vertex of the shared edge.
        v0: usize,
        /// End vertex of the shared edge.
        v1: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Whether this error describes a recoverable data fault rather than misuse.
    pub fn is_data_fault(&self) -> bool {
        matches!(
            self,
            MeshError::DegenerateTriangle { .. }
                | MeshError::NonManifoldEdge { .. }
                | MeshError::OrientationConflict { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MeshError::NonManifoldEdge { v0: 3, v1: 7 };
        assert_eq!(err.to_string(), "edge (3, 7) has more than two incident triangles");

        let err = MeshError::invalid_param("precision", -1.0, "must be non-negative");
        assert_eq!(
            err.to_string(),
            "invalid parameter: precision = -1 (must be non-negative)"
        );
    }

    #[test]
    fn test_data_fault_classification() {
        assert!(MeshError::OrientationConflict { v0: 0, v1: 1 }.is_data_fault());
        assert!(MeshError::DegenerateTriangle { v0: 0, v1: 0, v2: 1 }.is_data_fault());
        assert!(!MeshError::EmptyMesh.is_data_fault());
        let err = MeshError::CapacityExceeded { what: "triangles", count: 9, limit: 8 };
        assert!(!err.is_data_fault());
        assert_eq!(err.to_string(), "too many triangles: 9 (limit 8)");
        assert!(!MeshError::InvalidVertexIndex { vertex: 9, vertex_count: 3 }.is_data_fault());
    }
}
