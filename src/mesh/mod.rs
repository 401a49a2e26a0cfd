//! Core mesh data structures.
//!
//! This module provides the half-edge representation used to turn triangle
//! soup into a consistent mesh.
//!
//! # Overview
//!
//! The primary type is [`TriangulatedMesh`]. Positions are welded by a
//! [`VertexStore`]; each triangle becomes three [`HalfEdge`] records in a flat
//! arena, and half-edges over the same undirected edge are paired through an
//! [`EdgeTable`].
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - a welded vertex
//! - [`HalfEdgeId`] - a half-edge in the arena
//! - [`TriangleId`] - a triangle, owning three consecutive half-edges
//!
//! Edges are identified by packed vertex pairs: [`EdgeId`] keeps direction,
//! [`EdgeKey`] does not.
//!
//! # Construction
//!
//! ```
//! use weldmesh::mesh::TriangulatedMesh;
//! use nalgebra::Point3;
//!
//! let mut mesh = TriangulatedMesh::with_capacity(2, 1e-6);
//! mesh.add_triangle_points(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     1,
//! );
//! mesh.add_triangle_points(
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//!     1,
//! );
//! assert_eq!(mesh.vertex_count(), 4);
//! assert_eq!(mesh.triangle_count(), 2);
//! ```

mod bounds;
mod edge_table;
mod halfedge;
mod index;
mod packed;
mod triangulated;
mod vertex;

pub use bounds::BoundingBox;
pub use edge_table::{EdgeSlot, EdgeTable};
pub use halfedge::{HalfEdge, Triangle};
pub use index::{EdgeId, EdgeKey, HalfEdgeId, TriangleId, VertexId, MAX_TRIANGLES, MAX_VERTICES};
pub use packed::{PackedNormal, PACK_SIZE};
pub use triangulated::TriangulatedMesh;
pub use vertex::VertexStore;
