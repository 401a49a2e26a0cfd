//! The triangulated mesh accumulator.
//!
//! [`TriangulatedMesh`] receives welded triangles one at a time, pairs their
//! half-edges through an [`EdgeTable`], and keeps the bookkeeping the later
//! passes need: bounding box, the highest half-edge used to seed orientation,
//! the face and shading groupings, and the list of faulty triangles.
//!
//! Triangles are never removed. A triangle that cannot join the adjacency
//! graph (repeated vertex, third triangle on an edge) is still stored and
//! grouped under its face, but is flagged faulty, reported as a
//! [`Diagnostic`], and holds no adjacency links.

use std::collections::BTreeMap;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use super::bounds::BoundingBox;
use super::edge_table::EdgeTable;
use super::halfedge::{HalfEdge, Triangle};
use super::index::{EdgeId, EdgeKey, HalfEdgeId, TriangleId, VertexId, MAX_TRIANGLES};
use super::packed::PackedNormal;
use super::vertex::VertexStore;
use crate::config::MeshOptions;
use crate::diagnostics::Diagnostic;
use crate::error::{MeshError, Result};

/// Squared cross-product length below which three points count as collinear.
const COLLINEAR_EPSILON: f64 = 1e-18;

/// A half-edge triangle mesh built from welded triangle soup.
#[derive(Debug, Clone)]
pub struct TriangulatedMesh {
    pub(crate) options: MeshOptions,
    pub(crate) vertices: VertexStore,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) edges: EdgeTable,
    pub(crate) faces: BTreeMap<i32, Vec<TriangleId>>,
    pub(crate) shading: BTreeMap<PackedNormal, Vec<TriangleId>>,
    pub(crate) faulty: Vec<TriangleId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) bounds: BoundingBox,
    pub(crate) extreme_edge: HalfEdgeId,
}

impl Default for TriangulatedMesh {
    fn default() -> Self {
        Self::new(MeshOptions::default())
    }
}

impl TriangulatedMesh {
    /// Create an empty mesh.
    pub fn new(options: MeshOptions) -> Self {
        let expected = options.expected_triangles;
        Self {
            vertices: VertexStore::with_capacity(options.precision, expected / 2),
            halfedges: Vec::with_capacity(expected * 3),
            triangles: Vec::with_capacity(expected),
            edges: EdgeTable::with_capacity(options.expected_edges()),
            faces: BTreeMap::new(),
            shading: BTreeMap::new(),
            faulty: Vec::new(),
            diagnostics: Vec::new(),
            bounds: BoundingBox::empty(),
            extreme_edge: HalfEdgeId::invalid(),
            options,
        }
    }

    /// Create an empty mesh sized for `expected_triangles`, welding within `precision`.
    pub fn with_capacity(expected_triangles: usize, precision: f64) -> Self {
        Self::new(
            MeshOptions::default()
                .with_precision(precision)
                .with_expected_triangles(expected_triangles),
        )
    }

    // ==================== Construction ====================

    /// Weld a position into the vertex store and return its index.
    ///
    /// The bounding box grows only when a new vertex is created.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let (id, created) = self.vertices.insert(position);
        if created {
            self.bounds.include(&position);
        }
        id
    }

    /// Add a triangle over three existing vertices, tagged with its source face.
    ///
    /// The triangle is always stored and grouped under `face_id`. If it cannot
    /// join the adjacency graph it is flagged faulty and a diagnostic is
    /// recorded; that is not an error. `Err` is returned only when a vertex
    /// index was never assigned or the triangle arena is full.
    pub fn add_triangle(
        &mut self,
        v1: VertexId,
        v2: VertexId,
        v3: VertexId,
        face_id: i32,
    ) -> Result<TriangleId> {
        if self.triangles.len() >= MAX_TRIANGLES {
            return Err(MeshError::CapacityExceeded {
                what: "triangles",
                count: self.triangles.len() + 1,
                limit: MAX_TRIANGLES,
            });
        }
        for v in [v1, v2, v3] {
            if v.index() >= self.vertices.len() {
                return Err(MeshError::InvalidVertexIndex {
                    vertex: v.index(),
                    vertex_count: self.vertices.len(),
                });
            }
        }
        Ok(self.insert_triangle(v1, v2, v3, face_id))
    }

    /// Weld three positions and add the triangle they span.
    pub fn add_triangle_points(
        &mut self,
        p1: Point3<f64>,
        p2: Point3<f64>,
        p3: Point3<f64>,
        face_id: i32,
    ) -> TriangleId {
        let v1 = self.add_vertex(p1);
        let v2 = self.add_vertex(p2);
        let v3 = self.add_vertex(p3);
        self.insert_triangle(v1, v2, v3, face_id)
    }

    fn insert_triangle(&mut self, v1: VertexId, v2: VertexId, v3: VertexId, face_id: i32) -> TriangleId {
        let t = TriangleId::new(self.triangles.len());
        let [h0, h1, h2] = t.halfedges();

        for (start, next) in [(v1, h1), (v2, h2), (v3, h0)] {
            let mut he = HalfEdge::new(start);
            he.next = next;
            self.halfedges.push(he);
        }
        self.triangles.push(Triangle::new(face_id));
        self.faces.entry(face_id).or_default().push(t);

        match self.register_triangle(t, [v1, v2, v3]) {
            Ok(()) => {
                for h in [h0, h1, h2] {
                    self.consider_extreme(h);
                }
            }
            Err(error) => {
                self.triangles[t.index()].faulty = true;
                self.faulty.push(t);
                let d = Diagnostic::report(self.options.entity_label, face_id, t, error);
                self.diagnostics.push(d);
            }
        }
        t
    }

    /// Register all three half-edges of `t`, rolling back on the first refusal.
    fn register_triangle(&mut self, t: TriangleId, [v1, v2, v3]: [VertexId; 3]) -> Result<()> {
        if v1 == v2 || v2 == v3 || v1 == v3 {
            return Err(MeshError::DegenerateTriangle {
                v0: v1.index(),
                v1: v2.index(),
                v2: v3.index(),
            });
        }

        let hes = t.halfedges();
        for (i, &h) in hes.iter().enumerate() {
            if let Err(e) = self.add_edge(h) {
                for &done in &hes[..i] {
                    self.remove_edge(done);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn add_edge(&mut self, h: HalfEdgeId) -> Result<()> {
        let key = self.edge_key(h);
        if let Some(partner) = self.edges.register(key, h)? {
            self.halfedges[h.index()].adjacent = partner;
            self.halfedges[partner.index()].adjacent = h;
        }
        Ok(())
    }

    /// Undo the edge-table registration of `h` and clear its adjacency link.
    ///
    /// Never fails; removing an edge that is not registered is a no-op.
    pub fn remove_edge(&mut self, h: HalfEdgeId) {
        let key = self.edge_key(h);
        self.edges.remove(key, h);
        if let Some(partner) = self.adjacent(h) {
            if self.halfedges[partner.index()].adjacent == h {
                self.halfedges[partner.index()].adjacent = HalfEdgeId::invalid();
            }
            self.halfedges[h.index()].adjacent = HalfEdgeId::invalid();
        }
    }

    /// Track the half-edge whose start vertex is highest along Z.
    fn consider_extreme(&mut self, h: HalfEdgeId) {
        let Some(current) = self.extreme_edge.valid() else {
            self.extreme_edge = h;
            return;
        };
        let p = self.position(self.start(h));
        let q = self.position(self.start(current));
        let end = self.position(self.end(h));
        // NOTE: the second and third points are the same end vertex, so the
        // collinearity clause never rejects a higher candidate.
        if p.z > q.z && is_collinear(p, end, end) {
            self.extreme_edge = h;
        }
    }

    // ==================== Accessors ====================

    /// Options the mesh was created with.
    #[inline]
    pub fn options(&self) -> &MeshOptions {
        &self.options
    }

    /// The welding vertex store.
    #[inline]
    pub fn vertex_store(&self) -> &VertexStore {
        &self.vertices
    }

    /// Number of unique vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles, faulty ones included.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Number of half-edges (three per triangle).
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.halfedges.len()
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, h: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[h.index()]
    }

    /// Get a triangle record by ID.
    #[inline]
    pub fn triangle(&self, t: TriangleId) -> &Triangle {
        &self.triangles[t.index()]
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        self.vertices.position(v)
    }

    /// Iterate over all triangle IDs.
    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId> + '_ {
        (0..self.triangles.len()).map(TriangleId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Running bounding box of all welded vertices.
    #[inline]
    pub fn bounding_box(&self) -> &BoundingBox {
        &self.bounds
    }

    /// Centre of the bounding box, `None` for an empty mesh.
    #[inline]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        self.bounds.center()
    }

    /// The orientation seed: the half-edge with the highest start vertex.
    #[inline]
    pub fn extreme_edge(&self) -> Option<HalfEdgeId> {
        self.extreme_edge.valid()
    }

    /// Triangles grouped by source face identifier.
    #[inline]
    pub fn face_groups(&self) -> &BTreeMap<i32, Vec<TriangleId>> {
        &self.faces
    }

    /// Triangles grouped by packed shading normal. Empty until normals are balanced.
    #[inline]
    pub fn shading_groups(&self) -> &BTreeMap<PackedNormal, Vec<TriangleId>> {
        &self.shading
    }

    /// Triangles rejected from the adjacency graph.
    #[inline]
    pub fn faulty_triangles(&self) -> &[TriangleId] {
        &self.faulty
    }

    /// Recorded data faults, in the order they were found.
    #[inline]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The edge lookup table.
    #[inline]
    pub fn edge_table(&self) -> &EdgeTable {
        &self.edges
    }

    // ==================== Topology Queries ====================

    /// Start vertex of a half-edge.
    #[inline]
    pub fn start(&self, h: HalfEdgeId) -> VertexId {
        self.halfedge(h).start
    }

    /// End vertex of a half-edge (the start of its `next`).
    #[inline]
    pub fn end(&self, h: HalfEdgeId) -> VertexId {
        self.start(self.next(h))
    }

    /// Next half-edge around the triangle.
    #[inline]
    pub fn next(&self, h: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(h).next
    }

    /// Opposing half-edge, `None` on a boundary.
    #[inline]
    pub fn adjacent(&self, h: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedge(h).adjacent.valid()
    }

    /// Direction-sensitive identifier of a half-edge.
    #[inline]
    pub fn edge_id(&self, h: HalfEdgeId) -> EdgeId {
        EdgeId::new(self.start(h), self.end(h))
    }

    /// Direction-insensitive key of a half-edge.
    #[inline]
    pub fn edge_key(&self, h: HalfEdgeId) -> EdgeKey {
        EdgeKey::new(self.start(h), self.end(h))
    }

    /// The half-edges of a triangle in current cyclic order.
    pub fn triangle_halfedges(&self, t: TriangleId) -> [HalfEdgeId; 3] {
        let h0 = t.halfedges()[0];
        let h1 = self.next(h0);
        [h0, h1, self.next(h1)]
    }

    /// The vertices of a triangle in current winding order.
    pub fn triangle_vertices(&self, t: TriangleId) -> [VertexId; 3] {
        self.triangle_halfedges(t).map(|h| self.start(h))
    }

    /// The positions of a triangle's vertices in current winding order.
    pub fn triangle_positions(&self, t: TriangleId) -> [Point3<f64>; 3] {
        self.triangle_vertices(t).map(|v| *self.position(v))
    }

    /// Unit normal of the triangle containing `h`, following `h`'s winding.
    ///
    /// `None` for zero-area triangles.
    pub fn triangle_normal(&self, h: HalfEdgeId) -> Option<Vector3<f64>> {
        let b = self.next(h);
        let c = self.next(b);
        let p1 = self.position(self.start(h));
        let p2 = self.position(self.start(b));
        let p3 = self.position(self.start(c));
        (p2 - p1).cross(&(p3 - p1)).try_normalize(f64::EPSILON)
    }

    /// Number of half-edges without an adjacent half-edge.
    pub fn boundary_halfedge_count(&self) -> usize {
        self.halfedges.iter().filter(|he| he.is_boundary()).count()
    }

    // ==================== Validation ====================

    /// Check that connectivity is consistent.
    ///
    /// Every `next` cycle has length three and stays inside its triangle, every
    /// adjacency link is mutual and joins half-edges over the same edge key, and
    /// faulty triangles hold no links.
    pub fn is_valid(&self) -> bool {
        for t in self.triangle_ids() {
            let [h0, h1, h2] = self.triangle_halfedges(t);
            if self.next(h2) != h0 {
                return false;
            }
            if [h0, h1, h2].iter().any(|h| h.triangle() != t) {
                return false;
            }
            if self.triangle(t).faulty && [h0, h1, h2].iter().any(|&h| self.adjacent(h).is_some()) {
                return false;
            }
        }

        for h in self.halfedge_ids() {
            if let Some(adj) = self.adjacent(h) {
                if self.adjacent(adj) != Some(h) || self.edge_key(adj) != self.edge_key(h) {
                    return false;
                }
            }
        }

        true
    }

    // ==================== Export ====================

    /// Convert to positions plus triangle vertex indices in current winding.
    pub fn to_indexed(&self) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let vertices = self.vertices.positions().to_vec();
        let triangles = self
            .triangle_ids()
            .map(|t| self.triangle_vertices(t).map(|v| v.index()))
            .collect();
        (vertices, triangles)
    }

    pub(crate) fn log_construction_summary(&self) {
        debug!(
            entity = ?self.options.entity_label,
            vertices = self.vertex_count(),
            triangles = self.triangle_count(),
            faulty = self.faulty.len(),
            edges = self.edges.len(),
            "mesh constructed"
        );
    }
}

fn is_collinear(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> bool {
    (b - a).cross(&(c - a)).norm_squared() <= COLLINEAR_EPSILON
}
