//! Undirected edge lookup used to pair half-edges.

use hashbrown::HashMap;

use super::index::{EdgeKey, HalfEdgeId};
use crate::error::{MeshError, Result};

/// The (at most two) half-edges registered under one edge key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSlot {
    /// First registered half-edge.
    pub first: HalfEdgeId,
    /// Second registered half-edge, if the edge is paired.
    pub second: Option<HalfEdgeId>,
}

/// Maps an [`EdgeKey`] to the half-edges that reference it.
///
/// An edge holds at most two occupants; a third registration is a
/// non-manifold conflict and is refused without touching the table.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    slots: HashMap<EdgeKey, EdgeSlot>,
}

impl EdgeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table sized for `edges` undirected edges.
    pub fn with_capacity(edges: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(edges),
        }
    }

    /// Number of distinct edge keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Occupants of `key`.
    #[inline]
    pub fn get(&self, key: EdgeKey) -> Option<&EdgeSlot> {
        self.slots.get(&key)
    }

    /// Register `he` under `key`.
    ///
    /// Returns `Ok(None)` when `he` becomes the sole occupant and
    /// `Ok(Some(partner))` when it pairs with an existing occupant; the caller
    /// links the pair. A key that is already paired yields
    /// [`MeshError::NonManifoldEdge`].
    pub fn register(&mut self, key: EdgeKey, he: HalfEdgeId) -> Result<Option<HalfEdgeId>> {
        match self.slots.get_mut(&key) {
            None => {
                self.slots.insert(
                    key,
                    EdgeSlot {
                        first: he,
                        second: None,
                    },
                );
                Ok(None)
            }
            Some(slot) if slot.second.is_none() => {
                slot.second = Some(he);
                Ok(Some(slot.first))
            }
            Some(_) => {
                let (v0, v1) = key.vertices();
                Err(MeshError::NonManifoldEdge {
                    v0: v0.index(),
                    v1: v1.index(),
                })
            }
        }
    }

    /// Undo a registration of `he` under `key`.
    ///
    /// Removing the sole occupant drops the key; removing the first of a pair
    /// promotes the second. Unknown keys and half-edges are ignored.
    pub fn remove(&mut self, key: EdgeKey, he: HalfEdgeId) {
        let Some(slot) = self.slots.get_mut(&key) else {
            return;
        };
        if slot.first == he {
            match slot.second.take() {
                Some(second) => slot.first = second,
                None => {
                    self.slots.remove(&key);
                }
            }
        } else if slot.second == Some(he) {
            slot.second = None;
        }
    }

    /// Iterate over all registered edges.
    pub fn iter(&self) -> impl Iterator<Item = (EdgeKey, &EdgeSlot)> + '_ {
        self.slots.iter().map(|(k, s)| (*k, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexId;

    fn key(a: usize, b: usize) -> EdgeKey {
        EdgeKey::new(VertexId::new(a), VertexId::new(b))
    }

    #[test]
    fn test_register_pairs() {
        let mut table = EdgeTable::new();
        let h0 = HalfEdgeId::new(0);
        let h1 = HalfEdgeId::new(5);

        assert_eq!(table.register(key(1, 2), h0), Ok(None));
        assert_eq!(table.register(key(2, 1), h1), Ok(Some(h0)));
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(key(1, 2)),
            Some(&EdgeSlot {
                first: h0,
                second: Some(h1)
            })
        );
    }

    #[test]
    fn test_third_registration_is_non_manifold() {
        let mut table = EdgeTable::new();
        table.register(key(1, 2), HalfEdgeId::new(0)).unwrap();
        table.register(key(1, 2), HalfEdgeId::new(3)).unwrap();

        let err = table.register(key(2, 1), HalfEdgeId::new(6)).unwrap_err();
        assert_eq!(err, MeshError::NonManifoldEdge { v0: 1, v1: 2 });
        // the table is untouched
        assert_eq!(table.get(key(1, 2)).unwrap().second, Some(HalfEdgeId::new(3)));
    }

    #[test]
    fn test_remove_sole_occupant() {
        let mut table = EdgeTable::new();
        let h = HalfEdgeId::new(0);
        table.register(key(1, 2), h).unwrap();
        table.remove(key(1, 2), h);
        assert!(table.is_empty());
    }

    #[test]
    fn test_remove_promotes_second() {
        let mut table = EdgeTable::new();
        let h0 = HalfEdgeId::new(0);
        let h1 = HalfEdgeId::new(3);
        table.register(key(1, 2), h0).unwrap();
        table.register(key(1, 2), h1).unwrap();

        table.remove(key(1, 2), h0);
        assert_eq!(
            table.get(key(1, 2)),
            Some(&EdgeSlot {
                first: h1,
                second: None
            })
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut table = EdgeTable::new();
        let h0 = HalfEdgeId::new(0);
        let h1 = HalfEdgeId::new(3);
        table.register(key(1, 2), h0).unwrap();
        table.register(key(1, 2), h1).unwrap();

        table.remove(key(1, 2), h1);
        table.remove(key(1, 2), h1);
        table.remove(key(7, 8), h1);
        assert_eq!(
            table.get(key(1, 2)),
            Some(&EdgeSlot {
                first: h0,
                second: None
            })
        );
    }
}
