//! Per-entity batch driver.
//!
//! Each entity's triangle soup is welded, oriented and balanced into its own
//! [`TriangulatedMesh`]. Entities share nothing, so they are processed on the
//! rayon pool when [`MeshOptions::parallel`] is set.
//!
//! # Example
//!
//! ```
//! use weldmesh::batch::{process_entities, EntitySoup};
//! use weldmesh::config::MeshOptions;
//! use weldmesh::shapes;
//!
//! let entities = vec![
//!     EntitySoup::new(10, shapes::tetrahedron()),
//!     EntitySoup::new(11, shapes::cube(1.0)),
//! ];
//! let processed = process_entities(entities, &MeshOptions::default()).unwrap();
//!
//! assert_eq!(processed[0].label, 10);
//! assert_eq!(processed[1].summary().triangles, 12);
//! ```

use std::fmt;

use nalgebra::Point3;
use rayon::prelude::*;
use tracing::info;

use crate::algo::{self, ProcessReport};
use crate::config::MeshOptions;
use crate::error::{MeshError, Result};
use crate::mesh::{TriangulatedMesh, VertexId, MAX_TRIANGLES, MAX_VERTICES};

/// One tessellated triangle: three positions and the face it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoupTriangle {
    /// Corner positions in winding order.
    pub points: [Point3<f64>; 3],
    /// Source face identifier.
    pub face_id: i32,
}

impl SoupTriangle {
    /// Create a triangle from three corners.
    pub fn new(p1: Point3<f64>, p2: Point3<f64>, p3: Point3<f64>, face_id: i32) -> Self {
        Self {
            points: [p1, p2, p3],
            face_id,
        }
    }

    /// The same triangle wound the other way.
    pub fn flipped(self) -> Self {
        let [a, b, c] = self.points;
        Self {
            points: [a, c, b],
            face_id: self.face_id,
        }
    }
}

/// The triangle soup of one labelled entity.
#[derive(Debug, Clone, Default)]
pub struct EntitySoup {
    /// Entity label, stamped onto the entity's diagnostics.
    pub label: i64,
    /// Unwelded triangles.
    pub triangles: Vec<SoupTriangle>,
}

impl EntitySoup {
    /// Create an entity from its label and triangles.
    pub fn new(label: i64, triangles: Vec<SoupTriangle>) -> Self {
        Self { label, triangles }
    }
}

/// A processed entity.
#[derive(Debug, Clone)]
pub struct ProcessedEntity {
    /// Entity label.
    pub label: i64,
    /// The welded, oriented and balanced mesh.
    pub mesh: TriangulatedMesh,
    /// Counters from orientation and balancing.
    pub report: ProcessReport,
}

impl ProcessedEntity {
    /// Headline numbers for reporting.
    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            label: self.label,
            vertices: self.mesh.vertex_count(),
            triangles: self.mesh.triangle_count(),
            faulty: self.mesh.faulty_triangles().len(),
            conflicts: self.report.orientation.conflicts,
            shading_groups: self.mesh.shading_groups().len(),
        }
    }
}

/// Headline numbers of a processed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSummary {
    /// Entity label.
    pub label: i64,
    /// Unique vertices after welding.
    pub vertices: usize,
    /// Triangles, faulty ones included.
    pub triangles: usize,
    /// Triangles rejected from the adjacency graph.
    pub faulty: usize,
    /// Adjacency links severed during orientation.
    pub conflicts: usize,
    /// Distinct packed shading normals.
    pub shading_groups: usize,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}: {} vertices, {} triangles, {} faulty, {} conflicts, {} shading groups",
            self.label, self.vertices, self.triangles, self.faulty, self.conflicts, self.shading_groups
        )
    }
}

/// Weld a triangle soup into a mesh without running any further passes.
///
/// The edge table is sized from the larger of the configured hint and the
/// soup length.
pub fn build_mesh(soup: &[SoupTriangle], options: &MeshOptions) -> TriangulatedMesh {
    let expected = options.expected_triangles.max(soup.len());
    let mut mesh = TriangulatedMesh::new(options.clone().with_expected_triangles(expected));
    for tri in soup {
        let [p1, p2, p3] = tri.points;
        mesh.add_triangle_points(p1, p2, p3, tri.face_id);
    }
    mesh
}

/// Build a mesh from shared positions and index triples.
///
/// Positions are welded in order, so indices that name positions within the
/// weld tolerance end up on the same vertex. Triangle `i` gets face id `i`.
///
/// # Errors
/// [`MeshError::EmptyMesh`] when there are no triangles,
/// [`MeshError::InvalidVertexIndex`] when an index is out of range and
/// [`MeshError::CapacityExceeded`] when the input cannot be addressed. Nothing
/// is built in any of these cases.
///
/// # Example
/// ```
/// use weldmesh::batch::build_from_triangles;
/// use weldmesh::config::MeshOptions;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh = build_from_triangles(&vertices, &[[0, 1, 2]], &MeshOptions::default()).unwrap();
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
pub fn build_from_triangles(
    vertices: &[Point3<f64>],
    triangles: &[[usize; 3]],
    options: &MeshOptions,
) -> Result<TriangulatedMesh> {
    if triangles.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    check_capacity("vertices", vertices.len(), MAX_VERTICES)?;
    check_capacity("triangles", triangles.len(), MAX_TRIANGLES)?;
    if let Some(&vertex) = triangles.iter().flatten().find(|&&v| v >= vertices.len()) {
        return Err(MeshError::InvalidVertexIndex {
            vertex,
            vertex_count: vertices.len(),
        });
    }

    let expected = options.expected_triangles.max(triangles.len());
    let mut mesh = TriangulatedMesh::new(options.clone().with_expected_triangles(expected));
    let ids: Vec<VertexId> = vertices.iter().map(|&p| mesh.add_vertex(p)).collect();
    for (i, &[a, b, c]) in triangles.iter().enumerate() {
        mesh.add_triangle(ids[a], ids[b], ids[c], face_id(i)?)?;
    }
    Ok(mesh)
}

fn check_capacity(what: &'static str, count: usize, limit: usize) -> Result<()> {
    if count > limit {
        return Err(MeshError::CapacityExceeded { what, count, limit });
    }
    Ok(())
}

/// Face id of the triangle at `index` in an indexed input.
fn face_id(index: usize) -> Result<i32> {
    i32::try_from(index).map_err(|_| MeshError::CapacityExceeded {
        what: "face ids",
        count: index.saturating_add(1),
        limit: i32::MAX as usize + 1,
    })
}

/// Build, orient and balance one entity.
///
/// # Errors
/// [`MeshError::InvalidParameter`] if `options` do not validate. Faults in the
/// entity's triangles are recorded on the mesh instead.
pub fn process_entity(entity: EntitySoup, options: &MeshOptions) -> Result<ProcessedEntity> {
    options.validate()?;
    Ok(run_entity(entity, options))
}

fn run_entity(entity: EntitySoup, options: &MeshOptions) -> ProcessedEntity {
    let options = options.clone().with_entity_label(entity.label);
    let mut mesh = build_mesh(&entity.triangles, &options);
    let report = algo::process(&mut mesh);

    info!(
        entity = entity.label,
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        faulty = mesh.faulty_triangles().len(),
        conflicts = report.orientation.conflicts,
        "entity processed"
    );

    ProcessedEntity {
        label: entity.label,
        mesh,
        report,
    }
}

/// Process every entity independently.
///
/// Output order matches input order whether or not the work runs in parallel.
/// Fails only if `options` are invalid.
pub fn process_entities(entities: Vec<EntitySoup>, options: &MeshOptions) -> Result<Vec<ProcessedEntity>> {
    options.validate()?;

    let processed = if options.parallel {
        entities
            .into_par_iter()
            .map(|entity| run_entity(entity, options))
            .collect()
    } else {
        entities
            .into_iter()
            .map(|entity| run_entity(entity, options))
            .collect()
    };
    Ok(processed)
}
