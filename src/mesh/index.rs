//! Index types for mesh elements.
//!
//! Vertices, half-edges and triangles live in flat arenas and are addressed by
//! type-safe `u32` wrappers. Edges are identified by packing two vertex indices
//! into a single `u64`, once direction-sensitive ([`EdgeId`]) and once
//! direction-insensitive ([`EdgeKey`]).

use std::fmt::{self, Debug};

const INVALID: u32 = u32::MAX;

/// Most triangles an arena can hold; their half-edge ids must stay below the
/// invalid sentinel.
pub const MAX_TRIANGLES: usize = (INVALID / 3) as usize;

/// Most vertices a store can hold.
pub const MAX_VERTICES: usize = INVALID as usize;

/// A type-safe vertex index, assigned by the vertex store on first insertion.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index into the half-edge arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe triangle index. Triangle `t` owns half-edges `3t`, `3t + 1`, `3t + 2`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TriangleId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            ///
            /// # Panics
            /// If `index` does not fit below the invalid sentinel. Use
            /// [`Self::try_new`] for indices derived from caller input.
            #[inline]
            pub fn new(index: usize) -> Self {
                match Self::try_new(index) {
                    Some(id) => id,
                    None => panic!("index {} too large", index),
                }
            }

            /// Create a new index, or `None` if `index` is out of range.
            #[inline]
            pub fn try_new(index: usize) -> Option<Self> {
                u32::try_from(index).ok().filter(|&i| i != INVALID).map(Self)
            }

            /// Create an invalid/null index.
            #[inline]
            pub const fn invalid() -> Self {
                Self(INVALID)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != INVALID
            }

            /// `Some(self)` if valid, `None` for the null index.
            #[inline]
            pub fn valid(self) -> Option<Self> {
                self.is_valid().then_some(self)
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.0)
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self::new(v)
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(TriangleId, "T");

impl HalfEdgeId {
    /// The triangle owning this half-edge.
    #[inline]
    pub fn triangle(self) -> TriangleId {
        TriangleId(self.0 / 3)
    }
}

impl TriangleId {
    /// The three half-edges owned by this triangle, in creation order.
    ///
    /// Creation order is not necessarily the current cyclic order; follow
    /// `next` links for that.
    #[inline]
    pub fn halfedges(self) -> [HalfEdgeId; 3] {
        let base = self.0 * 3;
        [HalfEdgeId(base), HalfEdgeId(base + 1), HalfEdgeId(base + 2)]
    }
}

/// Direction-sensitive edge identifier: `(start << 32) | end`.
///
/// Two half-edges that are supposed to be opposite each other but carry the
/// same `EdgeId` belong to triangles with inconsistent winding.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Pack a directed edge.
    #[inline]
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self(((start.0 as u64) << 32) | end.0 as u64)
    }

    /// Start vertex.
    #[inline]
    pub fn start(self) -> VertexId {
        VertexId((self.0 >> 32) as u32)
    }

    /// End vertex.
    #[inline]
    pub fn end(self) -> VertexId {
        VertexId(self.0 as u32)
    }

    /// The same edge walked the other way.
    #[inline]
    pub fn reversed(self) -> Self {
        Self::new(self.end(), self.start())
    }

    /// Direction-insensitive key of this edge.
    #[inline]
    pub fn key(self) -> EdgeKey {
        EdgeKey::new(self.start(), self.end())
    }

    /// The packed value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Direction-insensitive edge key: `(min << 32) | max`. Used to pair half-edges.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct EdgeKey(u64);

impl EdgeKey {
    /// Pack an undirected edge.
    #[inline]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        Self(((lo as u64) << 32) | hi as u64)
    }

    /// The two vertices, smaller index first.
    #[inline]
    pub fn vertices(self) -> (VertexId, VertexId) {
        (VertexId((self.0 >> 32) as u32), VertexId(self.0 as u32))
    }

    /// The packed value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}
