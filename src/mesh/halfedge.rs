//! Half-edge mesh data structure.
//!
//! This module provides a half-edge representation for triangle meshes.
//! All elements live in tables owned by [`HalfEdgeMesh`] and refer to each
//! other through index handles, never through references.
//!
//! # Structure
//!
//! - Each triangle owns exactly three **half-edges**, linked by `next` into a
//!   closed loop
//! - Each half-edge stores its **destination** vertex; the origin is the
//!   destination of the previous half-edge in the same face
//! - Two half-edges running in opposite directions along the same edge are
//!   **twins** of each other
//! - Each vertex stores one outgoing half-edge (its *anchor*)
//!
//! # Boundary Handling
//!
//! No half-edges are created outside of faces. An edge on the mesh boundary
//! is a half-edge without a twin. Walking around a boundary vertex therefore
//! stops when it reaches a half-edge whose twin is missing; the builder
//! anchors boundary vertices at the start of their fan so that such a walk
//! still visits every incident face.

use nalgebra::{Point2, Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// Accumulated normal, refreshed by [`HalfEdgeMesh::update_normals`].
    pub normal: Vector3<f64>,

    /// Optional texture coordinate. Not persisted by the OBJ writer.
    pub tex_coord: Option<Point2<f64>>,

    id: VertexId,

    /// One outgoing half-edge. `None` for isolated vertices.
    pub(crate) halfedge: Option<HalfEdgeId>,
}

impl Vertex {
    fn new(id: VertexId, position: Point3<f64>) -> Self {
        Self {
            position,
            normal: Vector3::zeros(),
            tex_coord: None,
            id,
            halfedge: None,
        }
    }

    /// The identifier of this vertex, equal to its position in the vertex table.
    #[inline]
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The outgoing half-edge this vertex is anchored at.
    #[inline]
    pub fn halfedge(&self) -> Option<HalfEdgeId> {
        self.halfedge
    }
}

/// A directed half-edge bordering one triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfEdge {
    /// The vertex this half-edge points to.
    pub vertex: VertexId,

    /// The oppositely directed half-edge on the same edge, if one exists.
    pub twin: Option<HalfEdgeId>,

    /// The next half-edge around the face.
    pub next: HalfEdgeId,

    /// The face this half-edge borders.
    pub face: FaceId,
}

impl HalfEdge {
    /// Whether this half-edge lies on the mesh boundary (has no twin).
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.twin.is_none()
    }
}

/// A triangular face in the half-edge mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// One of the three half-edges bounding this face.
    pub halfedge: HalfEdgeId,
}

/// Element counts of a mesh, as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSummary {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of undirected edges.
    pub edges: usize,
    /// Number of faces.
    pub faces: usize,
    /// Number of vertices whose ring is not closed.
    pub boundary_vertices: usize,
}

/// A half-edge mesh data structure for triangle meshes.
///
/// Build one with [`build_from_triangles`](super::build_from_triangles) or
/// load one with [`crate::io::load`]. Once built, topology never changes;
/// only vertex positions, normals, and texture coordinates are mutable.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) halfedges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
    /// Number of half-edges that have a twin.
    pub(crate) paired: usize,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_faces * 3),
            faces: Vec::with_capacity(num_faces),
            paired: 0,
        }
    }

    pub(crate) fn add_vertex(&mut self, position: Point3<f64>) -> VertexId {
        let id = VertexId::new(self.vertices.len());
        self.vertices.push(Vertex::new(id, position));
        id
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn halfedge_count(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of undirected edges.
    ///
    /// Paired half-edges contribute one edge per pair; a boundary half-edge
    /// is an edge on its own.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.paired / 2 + (self.halfedges.len() - self.paired)
    }

    /// Get the number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Set the position of a vertex.
    ///
    /// Normals are not recomputed; call [`update_normals`](Self::update_normals)
    /// when they are needed.
    #[inline]
    pub fn set_position(&mut self, v: VertexId, pos: Point3<f64>) {
        self.vertices[v.index()].position = pos;
    }

    /// Get the texture coordinate of a vertex, if one was assigned.
    #[inline]
    pub fn tex_coord(&self, v: VertexId) -> Option<Point2<f64>> {
        self.vertex(v).tex_coord
    }

    /// Assign a texture coordinate to a vertex.
    #[inline]
    pub fn set_tex_coord(&mut self, v: VertexId, uv: Option<Point2<f64>>) {
        self.vertices[v.index()].tex_coord = uv;
    }

    // ==================== Topology Queries ====================

    /// Get the twin (opposite) half-edge.
    #[inline]
    pub fn twin(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedge(he).twin
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.next(self.next(he))
    }

    /// Get the destination vertex of a half-edge.
    #[inline]
    pub fn dest(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).vertex
    }

    /// Get the origin vertex of a half-edge.
    #[inline]
    pub fn origin(&self, he: HalfEdgeId) -> VertexId {
        self.dest(self.prev(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge is on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_boundary()
    }

    /// Check if a vertex is on the boundary.
    ///
    /// Isolated vertices count as boundary.
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        let mut ring = self.outgoing_halfedges(v);
        for _ in ring.by_ref() {}
        ring.hit_boundary()
    }

    /// True iff every half-edge has a twin, i.e. the surface has no free edge.
    pub fn is_manifold_closed(&self) -> bool {
        self.paired == self.halfedges.len()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.vertices.iter()
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Walk the outgoing half-edges around a vertex (`twin` then `next`).
    ///
    /// The walk ends when it returns to the anchor, or when it reaches a
    /// half-edge without a twin. After exhaustion,
    /// [`OutgoingHalfEdges::hit_boundary`] tells which of the two happened.
    pub fn outgoing_halfedges(&self, v: VertexId) -> OutgoingHalfEdges<'_> {
        OutgoingHalfEdges::new(self, v)
    }

    /// Iterate over the vertices adjacent to `v`, one per ring step.
    ///
    /// The sequence is lazy and can be restarted by calling this again. For a
    /// boundary vertex it is partial: it stops at the first free edge. Use
    /// [`crate::algo::boundary::walk_ring`] when the full neighbourhood of a
    /// boundary vertex matters.
    pub fn ring_neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + Clone + '_ {
        self.outgoing_halfedges(v).map(move |he| self.dest(he))
    }

    /// Iterate over faces incident to a vertex.
    pub fn vertex_faces(&self, v: VertexId) -> impl Iterator<Item = FaceId> + '_ {
        self.outgoing_halfedges(v).map(move |he| self.face_of(he))
    }

    /// The three half-edges of a face, starting at its stored half-edge.
    pub fn face_halfedges(&self, f: FaceId) -> [HalfEdgeId; 3] {
        let he0 = self.face(f).halfedge;
        let he1 = self.next(he0);
        let he2 = self.next(he1);
        [he0, he1, he2]
    }

    /// Get the three vertices of a face, in winding order.
    pub fn face_triangle(&self, f: FaceId) -> [VertexId; 3] {
        let [he0, he1, he2] = self.face_halfedges(f);
        [self.dest(he2), self.dest(he0), self.dest(he1)]
    }

    /// Get the positions of the three vertices of a face.
    pub fn face_positions(&self, f: FaceId) -> [Point3<f64>; 3] {
        let [v0, v1, v2] = self.face_triangle(f);
        [*self.position(v0), *self.position(v1), *self.position(v2)]
    }

    /// Every vertex position, in table order.
    pub fn vertex_positions(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Every face as a triple of 0-based vertex indices, in table order.
    pub fn face_indices(&self) -> Vec<[usize; 3]> {
        self.face_ids()
            .map(|f| self.face_triangle(f).map(VertexId::index))
            .collect()
    }

    // ==================== Geometry ====================

    /// Compute the unit normal of a face. Degenerate faces yield a zero vector.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Compute the area-weighted unit normal at a vertex from its incident faces.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        let mut normal = Vector3::zeros();
        for f in self.vertex_faces(v) {
            let [p0, p1, p2] = self.face_positions(f);
            normal += (p1 - p0).cross(&(p2 - p0));
        }
        normal
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Recompute the stored normal of every vertex.
    pub fn update_normals(&mut self) {
        let mut accum = vec![Vector3::zeros(); self.vertices.len()];
        for f in self.face_ids() {
            let [p0, p1, p2] = self.face_positions(f);
            let weighted = (p1 - p0).cross(&(p2 - p0));
            for v in self.face_triangle(f) {
                accum[v.index()] += weighted;
            }
        }
        for (vertex, n) in self.vertices.iter_mut().zip(accum) {
            vertex.normal = n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros);
        }
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.inf(&v.position), max.sup(&v.position))
        }))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    /// Element counts for display.
    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            vertices: self.vertex_count(),
            edges: self.edge_count(),
            faces: self.face_count(),
            boundary_vertices: self
                .vertex_ids()
                .filter(|&v| self.is_boundary_vertex(v))
                .count(),
        }
    }

    // ==================== Validation ====================

    /// Check every connectivity invariant, reporting the first violation.
    pub fn validate(&self) -> Result<()> {
        let nv = self.vertices.len();
        let nh = self.halfedges.len();
        let nf = self.faces.len();
        let fail = |msg: String| Err(MeshError::InvalidTopology(msg));

        for (i, v) in self.vertices.iter().enumerate() {
            if v.id.index() != i {
                return fail(format!("vertex at slot {} has id {:?}", i, v.id));
            }
            if v.halfedge.is_some_and(|he| he.index() >= nh) {
                return fail(format!("vertex {} anchor out of range", i));
            }
        }

        for (i, he) in self.halfedges.iter().enumerate() {
            if he.vertex.index() >= nv || he.next.index() >= nh || he.face.index() >= nf {
                return fail(format!("half-edge {} has an out-of-range reference", i));
            }
            if he.twin.is_some_and(|t| t.index() >= nh) {
                return fail(format!("half-edge {} twin out of range", i));
            }
        }

        for f in self.face_ids() {
            let start = self.face(f).halfedge;
            if start.index() >= nh {
                return fail(format!("{:?} half-edge out of range", f));
            }
            let mut he = start;
            for step in 0..3 {
                if self.face_of(he) != f {
                    return fail(format!("{:?} loop visits {:?} of another face", f, he));
                }
                he = self.next(he);
                if he == start && step < 2 {
                    return fail(format!("{:?} loop closes after {} steps", f, step + 1));
                }
            }
            if he != start {
                return fail(format!("{:?} loop does not close after 3 steps", f));
            }
        }

        let mut paired = 0;
        for he in self.halfedge_ids() {
            let Some(twin) = self.twin(he) else { continue };
            paired += 1;
            if twin == he || self.twin(twin) != Some(he) {
                return fail(format!("{:?} and {:?} are not mutual twins", he, twin));
            }
            if self.dest(twin) != self.origin(he) || self.dest(he) != self.origin(twin) {
                return fail(format!("{:?} and {:?} disagree on endpoints", he, twin));
            }
        }
        if paired != self.paired {
            return fail(format!("cached pair count {} != {}", self.paired, paired));
        }

        for v in self.vertex_ids() {
            if let Some(he) = self.vertex(v).halfedge {
                if self.origin(he) != v {
                    return fail(format!("{:?} anchor {:?} does not leave it", v, he));
                }
            }
        }

        Ok(())
    }

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Iterator over the outgoing half-edges around a vertex.
///
/// Produced by [`HalfEdgeMesh::outgoing_halfedges`].
#[derive(Clone)]
pub struct OutgoingHalfEdges<'a> {
    mesh: &'a HalfEdgeMesh,
    start: Option<HalfEdgeId>,
    current: Option<HalfEdgeId>,
    steps: usize,
    open: bool,
}

impl<'a> OutgoingHalfEdges<'a> {
    fn new(mesh: &'a HalfEdgeMesh, v: VertexId) -> Self {
        let start = mesh.vertex(v).halfedge;
        Self {
            mesh,
            start,
            current: start,
            steps: 0,
            open: start.is_none(),
        }
    }

    /// Whether the walk stopped at a half-edge without a twin.
    ///
    /// Only meaningful once the iterator is exhausted. Isolated vertices
    /// report `true`.
    pub fn hit_boundary(&self) -> bool {
        self.open
    }
}

impl Iterator for OutgoingHalfEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let he = self.current?;
        self.steps += 1;

        // twin(he) comes back into the vertex; the half-edge after it in its
        // face leaves the vertex again.
        self.current = match self.mesh.twin(he) {
            None => {
                self.open = true;
                None
            }
            Some(twin) => {
                let next = self.mesh.next(twin);
                if Some(next) == self.start || self.steps >= self.mesh.halfedge_count() {
                    None
                } else {
                    Some(next)
                }
            }
        };

        Some(he)
    }
}
