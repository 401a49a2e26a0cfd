//! Half-edge and triangle records.
//!
//! Half-edges live in a flat arena owned by the mesh. Triangle `t` owns the
//! three consecutive slots `3t..3t + 3`; the `next` links inside those slots
//! form its 3-cycle and are the only source of truth for the current winding.
//!
//! # Links
//!
//! - `next` always points to another half-edge of the same triangle
//! - `adjacent` points to the opposing half-edge of the neighbouring triangle
//!   across the same undirected edge; invalid on boundary edges. Links are
//!   mutual and may be severed later but never redirected.

use nalgebra::Vector3;

use super::index::{HalfEdgeId, VertexId};
use super::packed::PackedNormal;

/// A directed side of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfEdge {
    /// The vertex this half-edge starts from.
    pub start: VertexId,

    /// The next half-edge around the triangle.
    pub next: HalfEdgeId,

    /// The opposing half-edge across the shared edge. Invalid on a boundary.
    pub adjacent: HalfEdgeId,

    /// Normal at the start vertex. `None` until computed, or when the owning
    /// triangle is degenerate.
    pub normal: Option<Vector3<f64>>,

    /// Orientation is locked. Set once by unification, never cleared.
    pub frozen: bool,
}

impl HalfEdge {
    /// Create an unlinked half-edge starting at `start`.
    pub fn new(start: VertexId) -> Self {
        Self {
            start,
            next: HalfEdgeId::invalid(),
            adjacent: HalfEdgeId::invalid(),
            normal: None,
            frozen: false,
        }
    }

    /// Whether no opposing half-edge is linked.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.adjacent.is_valid()
    }
}

impl Default for HalfEdge {
    fn default() -> Self {
        Self::new(VertexId::invalid())
    }
}

/// Per-triangle bookkeeping kept alongside the half-edge arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Source face identifier supplied by the tessellator.
    pub face_id: i32,

    /// Rejected from the adjacency graph during construction.
    pub faulty: bool,

    /// Quantised shading normal, [`PackedNormal::MIXED`] until balanced.
    pub packed_normal: PackedNormal,
}

impl Triangle {
    /// Create the record for a triangle from face `face_id`.
    pub fn new(face_id: i32) -> Self {
        Self {
            face_id,
            faulty: false,
            packed_normal: PackedNormal::MIXED,
        }
    }
}
