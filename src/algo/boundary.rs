//! Boundary classification.
//!
//! A vertex is on the boundary when the walk around it (`twin` then `next`)
//! meets an edge without a twin before it gets back to where it started.
//! Both fairing solvers hold boundary vertices fixed, so they classify the
//! whole mesh once up front with [`classify`] and read neighbourhoods with
//! [`walk_ring`], which never runs past a free edge.

use crate::mesh::{HalfEdgeMesh, VertexId};

/// Per-vertex boundary flags, indexed by vertex id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryMap {
    flags: Vec<bool>,
}

impl BoundaryMap {
    /// Whether `v` lies on the boundary.
    #[inline]
    pub fn is_boundary(&self, v: VertexId) -> bool {
        self.flags[v.index()]
    }

    /// Number of classified vertices.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// True if the mesh had no vertices.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Number of boundary vertices.
    pub fn boundary_count(&self) -> usize {
        self.flags.iter().filter(|&&b| b).count()
    }

    /// Number of interior vertices.
    pub fn interior_count(&self) -> usize {
        self.flags.len() - self.boundary_count()
    }

    /// Iterate over boundary vertices in id order.
    pub fn boundary_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &b)| b)
            .map(|(i, _)| VertexId::new(i))
    }

    /// Iterate over interior vertices in id order.
    pub fn interior_vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &b)| !b)
            .map(|(i, _)| VertexId::new(i))
    }

    /// The raw flags, one per vertex.
    pub fn as_slice(&self) -> &[bool] {
        &self.flags
    }
}

/// Classify every vertex of `mesh` as boundary or interior.
///
/// Runs in O(degree) per vertex. Isolated vertices are reported as boundary.
pub fn classify(mesh: &HalfEdgeMesh) -> BoundaryMap {
    BoundaryMap {
        flags: mesh
            .vertex_ids()
            .map(|v| mesh.is_boundary_vertex(v))
            .collect(),
    }
}

/// The neighbourhood of a vertex as seen by a boundary-safe ring walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RingWalk {
    /// Neighbouring vertices, one per ring step, in walk order.
    ///
    /// When the walk hits the boundary, the neighbour across the free edge
    /// at the start of the fan is appended last.
    pub neighbors: Vec<VertexId>,

    /// Whether the walk stopped at an edge without a twin.
    pub hit_boundary: bool,
}

impl RingWalk {
    /// Number of ring steps (counting repeats).
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }
}

/// Walk around `v` without ever following a missing twin.
///
/// For an interior vertex this visits every neighbour once and returns to
/// the anchor. For a boundary vertex it visits the fan from its first to its
/// last face and then reports `hit_boundary`. The walk is bounded by the
/// number of half-edges, so it terminates on any input.
pub fn walk_ring(mesh: &HalfEdgeMesh, v: VertexId) -> RingWalk {
    let mut ring = mesh.outgoing_halfedges(v);
    let mut neighbors: Vec<VertexId> = ring.by_ref().map(|he| mesh.dest(he)).collect();
    let hit_boundary = ring.hit_boundary();

    if hit_boundary {
        if let Some(anchor) = mesh.vertex(v).halfedge() {
            neighbors.push(mesh.origin(mesh.prev(anchor)));
        }
    }

    RingWalk {
        neighbors,
        hit_boundary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::test_meshes;

    #[test]
    fn test_classify_grid() {
        let mesh = test_meshes::grid(2);
        let map = classify(&mesh);

        assert_eq!(map.len(), 9);
        assert_eq!(map.boundary_count(), 8);
        assert_eq!(map.interior_count(), 1);
        assert_eq!(map.interior_vertices().collect::<Vec<_>>(), vec![VertexId::new(4)]);
        assert!(map.boundary_vertices().all(|v| v != VertexId::new(4)));
    }

    #[test]
    fn test_classify_closed_and_open() {
        let closed = classify(&test_meshes::tetrahedron());
        assert_eq!(closed.boundary_count(), 0);

        let open = classify(&test_meshes::single_triangle());
        assert_eq!(open.interior_count(), 0);
        assert_eq!(open.as_slice(), &[true, true, true]);
    }

    #[test]
    fn test_walk_interior() {
        let mesh = test_meshes::grid(2);
        let walk = walk_ring(&mesh, VertexId::new(4));

        assert!(!walk.hit_boundary);
        assert_eq!(walk.degree(), 4);
        let mut neighbors = walk.neighbors.clone();
        neighbors.sort();
        assert_eq!(
            neighbors,
            vec![VertexId::new(1), VertexId::new(3), VertexId::new(5), VertexId::new(7)]
        );
    }

    #[test]
    fn test_walk_boundary_sees_whole_fan() {
        let mesh = test_meshes::grid(2);

        // Bottom edge midpoint touches 0, 2, 4 and the two diagonal ends.
        let walk = walk_ring(&mesh, VertexId::new(1));
        assert!(walk.hit_boundary);
        let mut neighbors = walk.neighbors.clone();
        neighbors.sort();
        assert_eq!(
            neighbors,
            vec![
                VertexId::new(0),
                VertexId::new(2),
                VertexId::new(3),
                VertexId::new(4),
                VertexId::new(5)
            ]
        );
    }

    #[test]
    fn test_walk_single_triangle() {
        let mesh = test_meshes::single_triangle();
        for v in mesh.vertex_ids() {
            let walk = walk_ring(&mesh, v);
            assert!(walk.hit_boundary);
            assert_eq!(walk.degree(), 2);
            assert!(!walk.neighbors.contains(&v));
        }
    }

    #[test]
    fn test_walk_matches_ring_neighbors_when_closed() {
        let mesh = test_meshes::tetrahedron();
        for v in mesh.vertex_ids() {
            let walk = walk_ring(&mesh, v);
            assert!(!walk.hit_boundary);
            assert_eq!(walk.neighbors, mesh.ring_neighbors(v).collect::<Vec<_>>());
        }
    }
}
