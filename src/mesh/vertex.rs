//! Vertex welding store.
//!
//! [`VertexStore`] turns a stream of positions into unique, stably indexed
//! vertices. Two positions closer than the store's precision (Euclidean
//! distance, inclusive) are the same vertex. Lookup goes through a uniform grid
//! hashed by integer cell coordinates, so only the 27 cells around a query are
//! inspected.

use hashbrown::HashMap;
use nalgebra::Point3;

use super::index::VertexId;

/// Smallest grid cell used, so a zero precision still hashes finite coordinates.
const MIN_CELL_SIZE: f64 = 1e-9;

type Cell = (i64, i64, i64);

/// Welds near-duplicate points into unique indexed vertices.
#[derive(Debug, Clone)]
pub struct VertexStore {
    positions: Vec<Point3<f64>>,
    grid: HashMap<Cell, Vec<VertexId>>,
    precision: f64,
    inv_cell: f64,
}

impl VertexStore {
    /// Create an empty store welding within `precision`.
    pub fn new(precision: f64) -> Self {
        Self::with_capacity(precision, 0)
    }

    /// Create an empty store sized for roughly `capacity` vertices.
    pub fn with_capacity(precision: f64, capacity: usize) -> Self {
        let precision = if precision.is_finite() { precision.abs() } else { 0.0 };
        Self {
            positions: Vec::with_capacity(capacity),
            grid: HashMap::with_capacity(capacity),
            precision,
            inv_cell: 1.0 / precision.max(MIN_CELL_SIZE),
        }
    }

    /// The welding tolerance.
    #[inline]
    pub fn precision(&self) -> f64 {
        self.precision
    }

    /// Number of unique vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no vertex has been inserted yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of a vertex.
    ///
    /// # Panics
    /// Panics if `id` was not assigned by this store.
    #[inline]
    pub fn position(&self, id: VertexId) -> &Point3<f64> {
        &self.positions[id.index()]
    }

    /// Position of a vertex, or `None` for an unknown index.
    #[inline]
    pub fn get(&self, id: VertexId) -> Option<&Point3<f64>> {
        self.positions.get(id.index())
    }

    /// All positions, ordered by vertex index.
    #[inline]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Iterate over vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId, &Point3<f64>)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .map(|(i, p)| (VertexId::new(i), p))
    }

    /// Find the earliest vertex within tolerance of `position`.
    pub fn find(&self, position: &Point3<f64>) -> Option<VertexId> {
        let (cx, cy, cz) = self.cell_of(position);
        let mut best: Option<VertexId> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let cell = (
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    );
                    let Some(candidates) = self.grid.get(&cell) else {
                        continue;
                    };
                    for &id in candidates {
                        if best.is_some_and(|b| b < id) {
                            continue;
                        }
                        if (self.positions[id.index()] - position).norm() <= self.precision {
                            best = Some(id);
                        }
                    }
                }
            }
        }

        best
    }

    /// Insert a position, or find the vertex it welds to.
    ///
    /// Returns the vertex index and `true` if a new vertex was created.
    pub fn insert(&mut self, position: Point3<f64>) -> (VertexId, bool) {
        if let Some(id) = self.find(&position) {
            return (id, false);
        }

        let id = VertexId::new(self.positions.len());
        self.positions.push(position);
        self.grid.entry(self.cell_of(&position)).or_default().push(id);
        (id, true)
    }

    fn cell_of(&self, p: &Point3<f64>) -> Cell {
        (
            (p.x * self.inv_cell).floor() as i64,
            (p.y * self.inv_cell).floor() as i64,
            (p.z * self.inv_cell).floor() as i64,
        )
    }
}
