//! # fairmesh
//!
//! Half-edge triangle meshes and membrane fairing.
//!
//! fairmesh loads a triangle mesh from OBJ, builds an index-based half-edge
//! structure, and smooths the interior of the surface while holding its
//! boundary fixed. Two solvers are provided:
//!
//! - **Local fairing**: damped umbrella-operator relaxation, parallel with rayon
//! - **Global fairing**: one sparse solve of the uniform Laplace system
//!
//! Both drive every interior vertex to the centroid of its neighbours.
//!
//! ## Quick Start
//!
//! ```no_run
//! use fairmesh::prelude::*;
//!
//! let mut mesh = fairmesh::io::load("patch.obj").unwrap();
//! println!("{} vertices, {} edges, {} faces",
//!     mesh.vertex_count(), mesh.edge_count(), mesh.face_count());
//!
//! let report = global_fairing(&mut mesh).unwrap();
//! println!("moved at most {}", report.max_displacement);
//!
//! fairmesh::io::save(&mesh, "faired.obj").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use fairmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1],  // bottom
//!     [0, 1, 3],  // front
//!     [1, 2, 3],  // right
//!     [2, 0, 3],  // left
//! ];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.vertex_count(), 4);
//! assert_eq!(mesh.edge_count(), 6);
//! assert!(mesh.is_manifold_closed());
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use fairmesh::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let faces = vec![[0, 1, 2]];
//! # let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! let v = VertexId::new(0);
//! for neighbor in mesh.ring_neighbors(v) {
//!     println!("Neighbor: {:?}", neighbor);
//! }
//!
//! let f = FaceId::new(0);
//! let [v0, v1, v2] = mesh.face_triangle(f);
//! assert_eq!([v0.index(), v1.index(), v2.index()], [0, 1, 2]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;
pub mod session;

/// Prelude module for convenient imports.
///
/// ```
/// use fairmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::boundary::{classify, walk_ring, BoundaryMap};
    pub use crate::algo::fairing::{
        global_fairing, local_fairing, GlobalFairingReport, LocalFairingOptions,
        LocalFairingOutcome,
    };
    pub use crate::error::{ErrorKind, MeshError, Result};
    pub use crate::mesh::{
        build_from_triangles, to_face_vertex, Face, FaceId, HalfEdge, HalfEdgeId, HalfEdgeMesh,
        Vertex, VertexId,
    };
    pub use crate::session::{FairingEvent, FairingRequest, Session};
}

// Re-export nalgebra types for convenience
pub use nalgebra;
