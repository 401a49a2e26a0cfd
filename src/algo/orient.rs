//! Orientation unification.
//!
//! Makes the winding of every triangle consistent with its neighbours, one
//! connected component at a time, and points each component outward.
//!
//! # Algorithm
//!
//! 1. Seed from the mesh's extreme half-edge (highest start vertex). If its
//!    triangle does not face away from the mesh centroid, reverse it.
//! 2. Freeze the seed triangle and propagate breadth-first: a neighbour whose
//!    shared half-edge has the *same* direction as ours is reversed, then
//!    frozen and queued.
//! 3. When the neighbour is already frozen with the same direction the two
//!    cannot be reconciled; the adjacency link is severed on both sides and a
//!    diagnostic is recorded.
//! 4. Triangles left unfrozen belong to other components; each is seeded with
//!    its own outward test and propagated the same way.
//!
//! The outward test is a heuristic: it compares the triangle normal with the
//! direction from the bounding-box centre to the triangle, which is reliable
//! for convex and star-shaped parts but not for arbitrary concave ones. Only
//! seeds are tested; all other triangles follow their neighbours.
//!
//! # Example
//!
//! ```
//! use weldmesh::algo::orient::{is_facing_outward, unify_face_orientation};
//! use weldmesh::batch::build_mesh;
//! use weldmesh::config::MeshOptions;
//! use weldmesh::shapes;
//!
//! // every other triangle of the cube is wound inward
//! let soup: Vec<_> = shapes::cube(1.0)
//!     .into_iter()
//!     .enumerate()
//!     .map(|(i, t)| if i % 2 == 0 { t.flipped() } else { t })
//!     .collect();
//! let mut mesh = build_mesh(&soup, &MeshOptions::default());
//!
//! let report = unify_face_orientation(&mut mesh);
//! assert_eq!(report.conflicts, 0);
//! assert!(mesh
//!     .triangle_ids()
//!     .all(|t| is_facing_outward(&mesh, t.halfedges()[0])));
//! ```

use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::error::MeshError;
use crate::mesh::{HalfEdgeId, TriangleId, TriangulatedMesh};

/// Counters describing one unification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrientationReport {
    /// Number of seeded components.
    pub components: usize,
    /// Number of triangle reversals performed.
    pub reversed: usize,
    /// Number of adjacency links severed because of conflicting orientation.
    pub conflicts: usize,
}

/// Orient every triangle consistently and outward.
///
/// A mesh without a seed (no triangle joined the adjacency graph) is left
/// untouched. On return every triangle is frozen.
pub fn unify_face_orientation(mesh: &mut TriangulatedMesh) -> OrientationReport {
    let mut report = OrientationReport::default();
    let Some(seed) = mesh.extreme_edge() else {
        debug!(entity = ?mesh.options.entity_label, "no orientation seed, skipping unification");
        return report;
    };

    orient_component(mesh, seed, &mut report);

    for t in 0..mesh.triangle_count() {
        let h = TriangleId::new(t).halfedges()[0];
        if !mesh.halfedge(h).frozen {
            orient_component(mesh, h, &mut report);
        }
    }

    debug!(
        entity = ?mesh.options.entity_label,
        components = report.components,
        reversed = report.reversed,
        conflicts = report.conflicts,
        "orientation unified"
    );
    report
}

/// Whether the triangle containing `h` faces away from the mesh centroid.
///
/// False for degenerate triangles and for an empty mesh.
pub fn is_facing_outward(mesh: &TriangulatedMesh, h: HalfEdgeId) -> bool {
    let Some(normal) = mesh.triangle_normal(h) else {
        return false;
    };
    let Some(centroid) = mesh.centroid() else {
        return false;
    };
    let outward = mesh.position(mesh.start(h)) - centroid;
    outward.dot(&normal) > 0.0
}

/// Reverse the winding of the triangle containing `h`.
///
/// Each half-edge keeps its undirected edge but flips direction, so edge keys
/// and adjacency links stay valid. Frozen triangles are left unchanged and
/// `false` is returned.
pub fn reverse_triangle(mesh: &mut TriangulatedMesh, h: HalfEdgeId) -> bool {
    if mesh.halfedge(h).frozen {
        return false;
    }
    let a = h;
    let b = mesh.next(a);
    let c = mesh.next(b);
    let (pa, pb, pc) = (mesh.start(a), mesh.start(b), mesh.start(c));

    let hes = &mut mesh.halfedges;
    hes[a.index()].start = pb;
    hes[b.index()].start = pc;
    hes[c.index()].start = pa;
    hes[c.index()].next = b;
    hes[b.index()].next = a;
    hes[a.index()].next = c;
    true
}

/// Lock the orientation of all three half-edges of `t`.
pub fn freeze_triangle(mesh: &mut TriangulatedMesh, t: TriangleId) {
    for h in t.halfedges() {
        mesh.halfedges[h.index()].frozen = true;
    }
}

fn orient_component(mesh: &mut TriangulatedMesh, seed: HalfEdgeId, report: &mut OrientationReport) {
    report.components += 1;
    if !is_facing_outward(mesh, seed) && reverse_triangle(mesh, seed) {
        report.reversed += 1;
    }
    freeze_triangle(mesh, seed.triangle());

    let mut frontier = vec![seed.triangle()];
    while !frontier.is_empty() {
        frontier = unify_connected(mesh, &frontier, report);
    }
}

/// Process one level of the breadth-first front, returning the next level.
fn unify_connected(
    mesh: &mut TriangulatedMesh,
    triangles: &[TriangleId],
    report: &mut OrientationReport,
) -> Vec<TriangleId> {
    let mut next_level = Vec::new();

    for &t in triangles {
        for h in t.halfedges() {
            let Some(adj) = mesh.adjacent(h) else {
                continue;
            };

            if mesh.edge_id(adj) == mesh.edge_id(h) {
                if reverse_triangle(mesh, adj) {
                    report.reversed += 1;
                } else {
                    sever(mesh, h, adj);
                    report.conflicts += 1;
                    continue;
                }
            }

            if !mesh.halfedge(adj).frozen {
                freeze_triangle(mesh, adj.triangle());
                next_level.push(adj.triangle());
            }
        }
    }

    next_level
}

fn sever(mesh: &mut TriangulatedMesh, h: HalfEdgeId, adj: HalfEdgeId) {
    mesh.halfedges[h.index()].adjacent = HalfEdgeId::invalid();
    mesh.halfedges[adj.index()].adjacent = HalfEdgeId::invalid();

    let t = h.triangle();
    let error = MeshError::OrientationConflict {
        v0: mesh.start(h).index(),
        v1: mesh.end(h).index(),
    };
    let d = Diagnostic::report(mesh.options.entity_label, mesh.triangle(t).face_id, t, error);
    mesh.diagnostics.push(d);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::VertexId;
    use nalgebra::Point3;

    fn quad_pair(second_flipped: bool) -> (TriangulatedMesh, [TriangleId; 2]) {
        let mut mesh = TriangulatedMesh::with_capacity(2, 1e-6);
        let v: Vec<VertexId> = [
            [0.0, 0.0, 1.0],
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
        ]
        .iter()
        .map(|&[x, y, z]| mesh.add_vertex(Point3::new(x, y, z)))
        .collect();
        // an unused low vertex pulls the centroid below the quad
        mesh.add_vertex(Point3::new(0.5, 0.5, -5.0));
        let t0 = mesh.add_triangle(v[0], v[1], v[2], 0).unwrap();
        let t1 = if second_flipped {
            mesh.add_triangle(v[0], v[3], v[2], 0).unwrap()
        } else {
            mesh.add_triangle(v[0], v[2], v[3], 0).unwrap()
        };
        (mesh, [t0, t1])
    }

    #[test]
    fn test_reverse_keeps_edges() {
        let (mut mesh, [t0, _]) = quad_pair(false);
        let before: Vec<_> = t0.halfedges().iter().map(|&h| mesh.edge_id(h)).collect();
        let adjacency: Vec<_> = t0.halfedges().iter().map(|&h| mesh.adjacent(h)).collect();

        assert!(reverse_triangle(&mut mesh, t0.halfedges()[0]));

        for (i, &h) in t0.halfedges().iter().enumerate() {
            assert_eq!(mesh.edge_id(h), before[i].reversed());
            assert_eq!(mesh.adjacent(h), adjacency[i]);
        }
        let [a, b, c] = mesh.triangle_vertices(t0);
        assert_eq!([a.index(), b.index(), c.index()], [1, 0, 2]);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_frozen_triangle_is_not_reversed() {
        let (mut mesh, [t0, _]) = quad_pair(false);
        freeze_triangle(&mut mesh, t0);
        let before = mesh.triangle_vertices(t0);
        assert!(!reverse_triangle(&mut mesh, t0.halfedges()[1]));
        assert_eq!(mesh.triangle_vertices(t0), before);
    }

    #[test]
    fn test_flipped_neighbour_is_reversed() {
        let (mut mesh, [t0, t1]) = quad_pair(true);
        let report = unify_face_orientation(&mut mesh);

        assert_eq!(report.components, 1);
        assert_eq!(report.conflicts, 0);
        assert_eq!(report.reversed, 1);

        let n0 = mesh.triangle_normal(t0.halfedges()[0]).unwrap();
        let n1 = mesh.triangle_normal(t1.halfedges()[0]).unwrap();
        assert!((n0 - n1).norm() < 1e-12);
        assert!(n0.z > 0.0);
        for h in mesh.halfedge_ids() {
            assert!(mesh.halfedge(h).frozen);
        }
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_frozen_conflict_is_severed() {
        let (mut mesh, [t0, t1]) = quad_pair(true);
        freeze_triangle(&mut mesh, t0);
        freeze_triangle(&mut mesh, t1);
        let shared = t0
            .halfedges()
            .into_iter()
            .find(|&h| mesh.adjacent(h).is_some())
            .unwrap();
        let other = mesh.adjacent(shared).unwrap();
        assert_eq!(mesh.edge_id(shared), mesh.edge_id(other));

        let report = unify_face_orientation(&mut mesh);

        assert_eq!(report.conflicts, 1);
        assert_eq!(mesh.adjacent(shared), None);
        assert_eq!(mesh.adjacent(other), None);
        assert!(mesh.is_valid());
        assert_eq!(mesh.diagnostics().len(), 1);
        assert!(mesh.diagnostics()[0].is_orientation_conflict());
    }

    #[test]
    fn test_disconnected_components_are_each_seeded() {
        let mut mesh = TriangulatedMesh::with_capacity(2, 1e-6);
        // two separate triangles on opposite sides of the centroid, both inward
        mesh.add_triangle_points(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            0,
        );
        mesh.add_triangle_points(
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(0.0, 1.0, -1.0),
            1,
        );

        let report = unify_face_orientation(&mut mesh);
        assert_eq!(report.components, 2);
        assert_eq!(report.reversed, 2);
        for t in mesh.triangle_ids() {
            assert!(is_facing_outward(&mesh, t.halfedges()[0]));
        }
    }

    #[test]
    fn test_empty_mesh_is_noop() {
        let mut mesh = TriangulatedMesh::default();
        assert_eq!(unify_face_orientation(&mut mesh), OrientationReport::default());
    }
}
