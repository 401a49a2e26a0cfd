//! Normal balancing.
//!
//! Computes per-corner normals that are smooth across soft edges and crisp
//! across sharp ones, then buckets triangles by their quantised normal.
//!
//! # Phases
//!
//! 1. **Triangle normals**: every half-edge takes the unit normal of its
//!    triangle. Zero-area triangles get no normal and contribute nothing.
//! 2. **Smoothing groups**: the half-edges leaving each vertex are walked
//!    around the vertex fan (`next.next.adjacent`). A half-edge whose normal
//!    differs from its fan neighbour's by more than the sharp angle starts a
//!    new group. Groups with more than one member get the normalised sum of
//!    their normals.
//! 3. **Shading buckets**: each triangle's corners are quantised to a
//!    [`PackedNormal`]; triangles whose corners agree are filed under that
//!    value, the rest under [`PackedNormal::MIXED`].
//!
//! Balancing expects unified orientation: across an inconsistently wound edge
//! the fan walk stops, since the opposing half-edge no longer starts at the
//! vertex being processed. The broken-off part of the fan is walked again as
//! a group of its own.
//!
//! # Example
//!
//! ```
//! use weldmesh::algo::{normals::balance_normals, orient::unify_face_orientation};
//! use weldmesh::batch::build_mesh;
//! use weldmesh::config::MeshOptions;
//! use weldmesh::shapes;
//!
//! let mut mesh = build_mesh(&shapes::cube(2.0), &MeshOptions::default());
//! unify_face_orientation(&mut mesh);
//! let report = balance_normals(&mut mesh);
//!
//! // 90 degree edges are sharp: one shading bucket per cube side
//! assert_eq!(report.shading_groups, 6);
//! assert_eq!(report.mixed_triangles, 0);
//! ```

use hashbrown::HashSet;
use nalgebra::Vector3;
use tracing::debug;

use crate::mesh::{HalfEdgeId, PackedNormal, TriangleId, TriangulatedMesh, VertexId};

/// Counters describing one balancing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceReport {
    /// Triangles without a usable normal.
    pub degenerate_triangles: usize,
    /// Smoothing groups found over all vertices.
    pub smoothing_groups: usize,
    /// Groups with two or more members whose normals were averaged.
    pub averaged_groups: usize,
    /// Distinct packed-normal buckets.
    pub shading_groups: usize,
    /// Triangles filed under [`PackedNormal::MIXED`].
    pub mixed_triangles: usize,
}

/// Run all three balancing phases using the mesh's configured sharp angle.
pub fn balance_normals(mesh: &mut TriangulatedMesh) -> BalanceReport {
    let threshold = mesh.options.sharp_angle;
    let mut report = BalanceReport {
        degenerate_triangles: compute_triangle_normals(mesh),
        ..Default::default()
    };

    for (v, fan) in halfedges_by_vertex(mesh).into_iter().enumerate() {
        let groups = smoothing_groups(mesh, VertexId::new(v), &fan, threshold);
        report.smoothing_groups += groups.len();
        for group in groups.iter().filter(|g| g.len() > 1) {
            if average_group(mesh, group) {
                report.averaged_groups += 1;
            }
        }
    }

    let (shading_groups, mixed_triangles) = regroup_by_packed_normal(mesh);
    report.shading_groups = shading_groups;
    report.mixed_triangles = mixed_triangles;

    debug!(
        entity = ?mesh.options.entity_label,
        degenerate = report.degenerate_triangles,
        groups = report.smoothing_groups,
        averaged = report.averaged_groups,
        buckets = report.shading_groups,
        mixed = report.mixed_triangles,
        "normals balanced"
    );
    report
}

/// Assign every half-edge the flat normal of its triangle.
///
/// Returns the number of degenerate triangles, whose half-edges get `None`.
pub fn compute_triangle_normals(mesh: &mut TriangulatedMesh) -> usize {
    let mut degenerate = 0;
    for t in 0..mesh.triangle_count() {
        let hes = TriangleId::new(t).halfedges();
        let normal = mesh.triangle_normal(hes[0]);
        if normal.is_none() {
            degenerate += 1;
        }
        for h in hes {
            mesh.halfedges[h.index()].normal = normal;
        }
    }
    degenerate
}

/// Angle between the normal at `h` and the normal of the neighbouring corner
/// across `h`'s edge.
///
/// Zero on a boundary or when either normal is missing.
pub fn edge_angle(mesh: &TriangulatedMesh, h: HalfEdgeId) -> f64 {
    let Some(adj) = mesh.adjacent(h) else {
        return 0.0;
    };
    match (mesh.halfedge(h).normal, mesh.halfedge(mesh.next(adj)).normal) {
        (Some(a), Some(b)) => a.angle(&b),
        _ => 0.0,
    }
}

/// Partition the half-edges leaving `vertex` into smoothing groups.
///
/// `fan` must hold every half-edge starting at `vertex`. Walks begin at
/// boundary half-edges when there are any; around a closed fan the walk
/// begins at the first sharp edge so that no group wraps across it. Every
/// half-edge of `fan` ends up in exactly one group.
pub fn smoothing_groups(
    mesh: &TriangulatedMesh,
    vertex: VertexId,
    fan: &[HalfEdgeId],
    threshold: f64,
) -> Vec<Vec<HalfEdgeId>> {
    let mut groups = Vec::new();
    let mut assigned: HashSet<HalfEdgeId> = HashSet::with_capacity(fan.len());
    let mut remaining = fan.to_vec();

    while !remaining.is_empty() {
        for seed in walk_seeds(mesh, vertex, &remaining, &assigned, threshold) {
            if !assigned.insert(seed) {
                continue;
            }
            let mut group = vec![seed];
            let mut current = seed;
            while let Some(next) = fan_step(mesh, vertex, current) {
                if !assigned.insert(next) {
                    break;
                }
                if edge_angle(mesh, next) > threshold {
                    groups.push(std::mem::take(&mut group));
                }
                group.push(next);
                current = next;
            }
            groups.push(group);
        }
        remaining.retain(|h| !assigned.contains(h));
    }

    groups
}

/// Starting points for fan walks over the unassigned half-edges in `remaining`.
///
/// Never returns an assigned half-edge, so every round of
/// [`smoothing_groups`] assigns at least one more.
fn walk_seeds(
    mesh: &TriangulatedMesh,
    vertex: VertexId,
    remaining: &[HalfEdgeId],
    assigned: &HashSet<HalfEdgeId>,
    threshold: f64,
) -> Vec<HalfEdgeId> {
    let free: Vec<HalfEdgeId> = remaining
        .iter()
        .copied()
        .filter(|&h| mesh.adjacent(h).is_none())
        .collect();
    if !free.is_empty() {
        return free;
    }

    // closed fan: start at the first sharp edge, or anywhere if none.
    // The walk stops at earlier groups, which is where a badly wound fan
    // breaks off.
    let first = remaining[0];
    let mut visited = HashSet::new();
    let mut current = first;
    loop {
        visited.insert(current);
        let Some(next) = fan_step(mesh, vertex, current) else {
            break;
        };
        if visited.contains(&next) || assigned.contains(&next) {
            break;
        }
        if edge_angle(mesh, next) > threshold {
            return vec![next];
        }
        current = next;
    }
    vec![first]
}

/// The next half-edge leaving `vertex` around its fan, if the fan continues.
fn fan_step(mesh: &TriangulatedMesh, vertex: VertexId, h: HalfEdgeId) -> Option<HalfEdgeId> {
    let incoming = mesh.next(mesh.next(h));
    mesh.adjacent(incoming)
        .filter(|&adj| mesh.start(adj) == vertex)
}

/// Give every member of `group` the normalised sum of the members' normals.
///
/// Returns `false` and leaves the group untouched when the sum vanishes.
fn average_group(mesh: &mut TriangulatedMesh, group: &[HalfEdgeId]) -> bool {
    let sum = group
        .iter()
        .filter_map(|&h| mesh.halfedge(h).normal)
        .fold(Vector3::zeros(), |acc, n| acc + n);
    let Some(average) = sum.try_normalize(f64::EPSILON) else {
        return false;
    };
    for &h in group {
        mesh.halfedges[h.index()].normal = Some(average);
    }
    true
}

/// Half-edges grouped by start vertex, in arena order.
fn halfedges_by_vertex(mesh: &TriangulatedMesh) -> Vec<Vec<HalfEdgeId>> {
    let mut fans = vec![Vec::new(); mesh.vertex_count()];
    for h in mesh.halfedge_ids() {
        fans[mesh.start(h).index()].push(h);
    }
    fans
}

/// The shading value of a triangle: its corners' common packed normal, or
/// [`PackedNormal::MIXED`] if any two corners disagree.
pub fn triangle_packed_normal(mesh: &TriangulatedMesh, t: TriangleId) -> PackedNormal {
    let [a, b, c] = t
        .halfedges()
        .map(|h| PackedNormal::from_option(mesh.halfedge(h).normal.as_ref()));
    if a == b && b == c {
        a
    } else {
        PackedNormal::MIXED
    }
}

/// Rebuild the shading grouping from the current half-edge normals.
///
/// The face grouping is left as is. Returns the number of buckets and the
/// number of mixed triangles.
pub fn regroup_by_packed_normal(mesh: &mut TriangulatedMesh) -> (usize, usize) {
    mesh.shading.clear();
    let mut mixed = 0;
    for t in 0..mesh.triangle_count() {
        let t = TriangleId::new(t);
        let packed = triangle_packed_normal(mesh, t);
        if packed.is_mixed() {
            mixed += 1;
        }
        mesh.triangles[t.index()].packed_normal = packed;
        mesh.shading.entry(packed).or_default().push(t);
    }
    (mesh.shading.len(), mixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::orient::unify_face_orientation;
    use crate::batch::{build_mesh, SoupTriangle};
    use crate::config::MeshOptions;
    use crate::shapes;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_6, PI};

    /// Two triangles sharing edge (0, 1), folded by `angle` radians.
    fn hinge(angle: f64) -> TriangulatedMesh {
        let mut mesh = TriangulatedMesh::with_capacity(2, 1e-9);
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let v2 = mesh.add_vertex(Point3::new(0.5, 1.0, 0.0));
        let v3 = mesh.add_vertex(Point3::new(0.5, -angle.cos(), angle.sin()));
        mesh.add_triangle(v0, v1, v2, 0).unwrap();
        mesh.add_triangle(v1, v0, v3, 1).unwrap();
        mesh
    }

    #[test]
    fn test_triangle_normals() {
        let mut mesh = hinge(0.0);
        assert_eq!(compute_triangle_normals(&mut mesh), 0);
        for h in mesh.halfedge_ids() {
            assert_relative_eq!(mesh.halfedge(h).normal.unwrap(), Vector3::z(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let mut mesh = TriangulatedMesh::with_capacity(1, 1e-9);
        mesh.add_triangle_points(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            0,
        );
        let report = balance_normals(&mut mesh);
        assert_eq!(report.degenerate_triangles, 1);
        assert!(mesh.halfedge(HalfEdgeId::new(0)).normal.is_none());
        assert_eq!(report.mixed_triangles, 1);
    }

    #[test]
    fn test_edge_angle() {
        let mut mesh = hinge(FRAC_PI_2);
        compute_triangle_normals(&mut mesh);
        let shared = HalfEdgeId::new(0);
        assert!(mesh.adjacent(shared).is_some());
        assert_relative_eq!(edge_angle(&mesh, shared), FRAC_PI_2, epsilon = 1e-9);
        // boundary edge
        assert_eq!(edge_angle(&mesh, HalfEdgeId::new(1)), 0.0);
    }

    #[test]
    fn test_soft_hinge_is_smoothed() {
        let mut mesh = hinge(0.2);
        unify_face_orientation(&mut mesh);
        balance_normals(&mut mesh);

        let n0 = mesh.triangle_normal(HalfEdgeId::new(0)).unwrap();
        let n1 = mesh.triangle_normal(HalfEdgeId::new(3)).unwrap();
        let expected = (n0 + n1).normalize();
        let apexes = [VertexId::new(2), VertexId::new(3)];
        for h in mesh.halfedge_ids() {
            let normal = mesh.halfedge(h).normal.unwrap();
            if apexes.contains(&mesh.start(h)) {
                let flat = mesh.triangle_normal(h).unwrap();
                assert_relative_eq!(normal, flat, epsilon = 1e-9);
            } else {
                // corners on the shared edge are averaged
                assert_relative_eq!(normal, expected, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_sharp_hinge_is_not_smoothed() {
        let mut mesh = hinge(FRAC_PI_2);
        unify_face_orientation(&mut mesh);
        balance_normals(&mut mesh);

        for h in mesh.halfedge_ids() {
            let flat = mesh.triangle_normal(h).unwrap();
            assert_relative_eq!(mesh.halfedge(h).normal.unwrap(), flat, epsilon = 1e-12);
        }
        assert_eq!(mesh.shading_groups().len(), 2);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let mut mesh = hinge(FRAC_PI_2);
        mesh.options.sharp_angle = 100f64.to_radians();
        unify_face_orientation(&mut mesh);
        let report = balance_normals(&mut mesh);
        // both shared-edge vertices form one averaged group
        assert_eq!(report.averaged_groups, 2);
    }

    #[test]
    fn test_groups_partition_fan() {
        let mut mesh = hinge(FRAC_PI_2);
        compute_triangle_normals(&mut mesh);
        let v0 = VertexId::new(0);
        let fan: Vec<HalfEdgeId> = mesh.halfedge_ids().filter(|&h| mesh.start(h) == v0).collect();
        let groups = smoothing_groups(&mesh, v0, &fan, FRAC_PI_6);

        let mut members: Vec<HalfEdgeId> = groups.concat();
        members.sort();
        assert_eq!(members, fan);
        assert_eq!(groups.len(), 2);
    }

    /// Three triangles around the origin. The first two meet at a right angle;
    /// the third shares the first one's edge (0, 1) with the same direction.
    fn miswound_fan() -> TriangulatedMesh {
        let mut mesh = TriangulatedMesh::with_capacity(3, 1e-9);
        let v = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        let a = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        let c = mesh.add_vertex(Point3::new(0.0, 0.0, 1.0));
        let d = mesh.add_vertex(Point3::new(0.0, -1.0, 0.0));
        mesh.add_triangle(v, a, b, 0).unwrap();
        mesh.add_triangle(v, b, c, 1).unwrap();
        mesh.add_triangle(v, a, d, 2).unwrap();
        mesh
    }

    fn fan_of(mesh: &TriangulatedMesh, vertex: VertexId) -> Vec<HalfEdgeId> {
        mesh.halfedge_ids().filter(|&h| mesh.start(h) == vertex).collect()
    }

    #[test]
    fn test_miswound_fan_is_partitioned() {
        let mut mesh = miswound_fan();
        compute_triangle_normals(&mut mesh);
        let v = VertexId::new(0);
        let fan = fan_of(&mesh, v);
        // no half-edge leaving v is on a boundary, yet the fan is not a cycle
        assert!(fan.iter().all(|&h| mesh.adjacent(h).is_some()));

        let groups = smoothing_groups(&mesh, v, &fan, FRAC_PI_6);
        let mut members: Vec<HalfEdgeId> = groups.concat();
        members.sort();
        assert_eq!(members, fan);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_balance_without_unified_orientation() {
        let mut mesh = miswound_fan();
        let report = balance_normals(&mut mesh);

        assert_eq!(report.degenerate_triangles, 0);
        assert_eq!(report.averaged_groups, 0);
        // +z, +x and -z
        assert_eq!(report.shading_groups, 3);
        assert_eq!(report.mixed_triangles, 0);
        for h in mesh.halfedge_ids() {
            assert_eq!(mesh.halfedge(h).normal, mesh.triangle_normal(h));
        }
    }

    #[test]
    fn test_bowtie_vertex_has_one_group_per_fan() {
        let apex = Point3::new(1.0, 1.0, 1.0);
        let mut soup = shapes::tetrahedron();
        // the same tetrahedron mirrored through the apex, touching only there
        let mirrored: Vec<SoupTriangle> = soup
            .iter()
            .map(|t| {
                let [p1, p2, p3] = t.points.map(|p| Point3::from(apex.coords * 2.0 - p.coords));
                SoupTriangle::new(p1, p2, p3, t.face_id + 4).flipped()
            })
            .collect();
        soup.extend(mirrored);
        let mut mesh = build_mesh(&soup, &MeshOptions::default());
        assert_eq!(mesh.vertex_count(), 7);
        compute_triangle_normals(&mut mesh);

        let v = mesh.vertex_store().find(&apex).unwrap();
        let fan = fan_of(&mesh, v);
        assert_eq!(fan.len(), 6);

        // nothing is sharp: each closed fan is one group
        let groups = smoothing_groups(&mesh, v, &fan, PI);
        assert_eq!(groups.len(), 2);
        for group in &groups {
            assert_eq!(group.len(), 3);
            let first_half = group[0].triangle().index() < 4;
            assert!(group.iter().all(|h| (h.triangle().index() < 4) == first_half));
        }

        // every tetrahedron edge is sharp: each corner stands alone
        let groups = smoothing_groups(&mesh, v, &fan, FRAC_PI_6);
        let mut members: Vec<HalfEdgeId> = groups.concat();
        members.sort();
        assert_eq!(members, fan);
        assert_eq!(groups.len(), 6);
    }

    #[test]
    fn test_mixed_triangle_bucket() {
        let mut mesh = hinge(0.2);
        unify_face_orientation(&mut mesh);
        let report = balance_normals(&mut mesh);

        // each triangle has two averaged corners and one flat apex
        assert_eq!(report.mixed_triangles, 2);
        assert_eq!(mesh.shading_groups().len(), 1);
        assert_eq!(mesh.shading_groups()[&PackedNormal::MIXED].len(), 2);
        for t in mesh.triangle_ids() {
            assert!(mesh.triangle(t).packed_normal.is_mixed());
        }
        // the face grouping is kept
        assert_eq!(mesh.face_groups().len(), 2);
    }
}
