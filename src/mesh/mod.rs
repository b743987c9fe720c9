//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and related types
//! for representing and manipulating triangle meshes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which stores vertices, half-edges,
//! and faces in owned tables and links them with index handles. This gives
//! O(1) adjacency queries without shared pointers, and lets a mesh be torn
//! down and rebuilt wholesale.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex (dense, usable as a matrix index)
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use fairmesh::mesh::build_from_triangles;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh = build_from_triangles(&vertices, &faces).unwrap();
//! assert_eq!(mesh.edge_count(), 3);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_triangles, to_face_vertex};
pub use halfedge::{Face, HalfEdge, HalfEdgeMesh, MeshSummary, OutgoingHalfEdges, Vertex};
pub use index::{FaceId, HalfEdgeId, VertexId};
