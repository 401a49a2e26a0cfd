//! # Weldmesh
//!
//! Builds render-ready triangle meshes from tessellated triangle soup.
//!
//! Triangles arrive one at a time with their corner positions and the id of
//! the face they were tessellated from. Weldmesh welds nearby positions into
//! shared vertices, links the triangles into a half-edge structure, makes the
//! winding of every connected part consistent and outward, and computes
//! per-corner normals that stay crisp across sharp edges. Triangles are then
//! bucketed by a two-byte quantised normal for shading.
//!
//! Faulty input (repeated corners, edges shared by three triangles, regions
//! whose winding cannot be reconciled) never aborts a build. The offending
//! triangles are kept, flagged, and reported as [`Diagnostic`]s.
//!
//! ## Quick Start
//!
//! ```
//! use weldmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = TriangulatedMesh::new(MeshOptions::default());
//! let a = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
//! let d = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
//!
//! // windings are mixed on purpose
//! mesh.add_triangle(a, b, c, 0).unwrap();
//! mesh.add_triangle(a, b, d, 1).unwrap();
//! mesh.add_triangle(b, c, d, 2).unwrap();
//! mesh.add_triangle(c, a, d, 3).unwrap();
//!
//! let report = weldmesh::algo::process(&mut mesh);
//! assert_eq!(report.orientation.conflicts, 0);
//! assert_eq!(mesh.boundary_halfedge_count(), 0);
//! assert_eq!(mesh.shading_groups().len(), 4);
//! ```
//!
//! ## Batches
//!
//! [`batch::process_entities`] runs the whole pipeline over many independent
//! entities on the rayon pool. See [`shapes`] for procedural inputs.
//!
//! [`Diagnostic`]: diagnostics::Diagnostic

#![warn(missing_docs)]
#![warn(clippy::all)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod algo;
pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod mesh;
pub mod shapes;

/// Prelude module for convenient imports.
///
/// ```
/// use weldmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{balance_normals, is_facing_outward, process, unify_face_orientation};
    pub use crate::batch::{build_from_triangles, build_mesh, process_entities, EntitySoup, SoupTriangle};
    pub use crate::config::MeshOptions;
    pub use crate::diagnostics::Diagnostic;
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        EdgeId, EdgeKey, HalfEdgeId, PackedNormal, TriangleId, TriangulatedMesh, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
