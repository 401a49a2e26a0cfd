//! Mesh processing passes.
//!
//! - [`orient`]: consistent, outward-facing triangle winding
//! - [`normals`]: smoothing-group normals and packed shading buckets
//!
//! [`process`] runs both in the order they depend on each other.

pub mod normals;
pub mod orient;

pub use normals::{balance_normals, BalanceReport};
pub use orient::{is_facing_outward, unify_face_orientation, OrientationReport};

use crate::mesh::TriangulatedMesh;

/// Combined result of [`process`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    /// Orientation pass counters.
    pub orientation: OrientationReport,
    /// Normal balancing counters.
    pub balance: BalanceReport,
}

/// Unify orientation, then balance normals.
///
/// Balancing walks vertex fans across adjacency links, so it only sees full
/// fans once every neighbour is wound the same way.
pub fn process(mesh: &mut TriangulatedMesh) -> ProcessReport {
    mesh.log_construction_summary();
    let orientation = unify_face_orientation(mesh);
    let balance = balance_normals(mesh);
    ProcessReport {
        orientation,
        balance,
    }
}
