//! Mesh construction utilities.
//!
//! This module builds half-edge meshes from face-vertex lists, the form in
//! which meshes arrive from OBJ files and from external mesh generators.

use std::collections::HashMap;

use nalgebra::Point3;
use tracing::debug;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh};
use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// Build a half-edge mesh from vertices and triangle faces.
///
/// Three half-edges are created per face and linked into a loop. Twins are
/// found by matching each directed edge `(a, b)` with its reverse `(b, a)`;
/// edges with no reverse stay unpaired and form the mesh boundary.
///
/// # Errors
///
/// All checks run before a mesh is returned, so a failure never leaves a
/// partially built mesh behind.
///
/// - [`MeshError::EmptyMesh`] if `faces` is empty
/// - [`MeshError::InvalidVertexIndex`] if a face references a missing vertex
/// - [`MeshError::DegenerateFace`] if a face repeats a vertex
/// - [`MeshError::NonManifoldEdge`] if a directed edge is used twice, which
///   happens when an edge borders more than two faces or when adjacent faces
///   have inconsistent winding
/// - [`MeshError::NonManifoldVertex`] if the faces around a vertex form
///   more than one fan, so no single walk around it reaches all of them
///
/// # Example
/// ```
/// use fairmesh::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let faces = vec![[0, 1, 2]];
///
/// let mesh = build_from_triangles(&vertices, &faces).unwrap();
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
pub fn build_from_triangles(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<HalfEdgeMesh> {
    if faces.is_empty() {
        return Err(MeshError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        for &vi in face {
            if vi >= vertices.len() {
                return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
            }
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(MeshError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    for &p in vertices {
        mesh.add_vertex(p);
    }

    // Directed edge (origin, destination) -> half-edge
    let mut edge_map: HashMap<(usize, usize), HalfEdgeId> = HashMap::with_capacity(faces.len() * 3);
    let mut out_degree = vec![0usize; vertices.len()];

    for (fi, face) in faces.iter().enumerate() {
        let base = mesh.halfedges.len();
        let face_id = FaceId::new(fi);

        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            let he = HalfEdgeId::new(base + k);
            if edge_map.insert((a, b), he).is_some() {
                return Err(MeshError::NonManifoldEdge { v0: a, v1: b });
            }
            mesh.halfedges.push(HalfEdge {
                vertex: VertexId::new(b),
                twin: None,
                next: HalfEdgeId::new(base + (k + 1) % 3),
                face: face_id,
            });
            mesh.vertices[a].halfedge = Some(he);
            out_degree[a] += 1;
        }

        mesh.faces.push(Face {
            halfedge: HalfEdgeId::new(base),
        });
    }

    for (&(a, b), &he) in &edge_map {
        if let Some(&twin) = edge_map.get(&(b, a)) {
            mesh.halfedges[he.index()].twin = Some(twin);
            mesh.paired += 1;
        }
    }

    anchor_fan_starts(&mut mesh);

    if let Some(v) = mesh
        .vertex_ids()
        .find(|&v| mesh.outgoing_halfedges(v).count() != out_degree[v.index()])
    {
        return Err(MeshError::NonManifoldVertex { vertex: v.index() });
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        edges = mesh.edge_count(),
        boundary_halfedges = mesh.halfedge_count() - mesh.paired,
        "built half-edge mesh"
    );

    Ok(mesh)
}

/// Move each boundary vertex's anchor to the first outgoing half-edge of its
/// fan, so a forward `twin -> next` walk covers the whole fan before it
/// reaches the free edge.
fn anchor_fan_starts(mesh: &mut HalfEdgeMesh) {
    let limit = mesh.halfedge_count();

    for vi in 0..mesh.vertex_count() {
        let Some(start) = mesh.vertices[vi].halfedge else {
            continue;
        };

        // Step backwards: the previous outgoing half-edge is the twin of the
        // half-edge entering the vertex in the current face.
        let mut he = start;
        for _ in 0..limit {
            match mesh.twin(mesh.prev(he)) {
                None => break,
                Some(back) if back == start => {
                    he = start;
                    break;
                }
                Some(back) => he = back,
            }
        }

        mesh.vertices[vi].halfedge = Some(he);
    }
}

/// Convert a half-edge mesh back to a face-vertex representation.
///
/// Returns (vertices, faces) tuple, both in table order.
pub fn to_face_vertex(mesh: &HalfEdgeMesh) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
    (mesh.vertex_positions(), mesh.face_indices())
}
