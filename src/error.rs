//! Error types for fairmesh.
//!
//! Every fallible operation in the crate returns [`MeshError`]. Variants are
//! grouped into broad categories by [`MeshError::kind`] so callers can react
//! to "the file was bad" differently from "the solve was ill-posed".

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Broad category of a [`MeshError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file could not be opened, read, or written.
    Io,
    /// The file contents were malformed.
    Parse,
    /// The face list does not describe a valid manifold triangle mesh.
    Topology,
    /// A fairing solve was ill-posed or numerically singular.
    Solve,
    /// An option was out of range.
    Parameter,
}

/// Errors that can occur during mesh operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A malformed record in a mesh file.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the record.
        message: String,
    },

    /// A face record references a vertex that does not exist.
    #[error("line {line}: face index {index} is out of range (file has {count} vertices)")]
    FaceIndexOutOfRange {
        /// 1-based line number of the face record.
        line: usize,
        /// The index as written in the file.
        index: i64,
        /// Number of vertices in the file.
        count: usize,
    },

    /// Unsupported file format.
    #[error("unsupported file format for {path}")]
    UnsupportedFormat {
        /// The offending path.
        path: PathBuf,
    },

    /// The mesh has no faces, or no vertices to operate on.
    #[error("mesh is empty")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has duplicate vertex indices.
    #[error("face {face} is degenerate (has duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    ///
    /// This happens when an edge is shared by more than two faces, or when
    /// two neighbouring faces disagree on winding.
    #[error("directed edge ({v0} -> {v1}) is used by more than one face")]
    NonManifoldEdge {
        /// Origin vertex of the edge.
        v0: usize,
        /// Destination vertex of the edge.
        v1: usize,
    },

    /// A vertex joins several separate fans of faces (a pinch point).
    #[error("vertex {vertex} is non-manifold: its incident faces form more than one fan")]
    NonManifoldVertex {
        /// The pinched vertex.
        vertex: usize,
    },

    /// A connectivity invariant does not hold.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// Global fairing needs at least one fixed vertex.
    #[error("mesh has no boundary vertices; no Dirichlet constraint exists")]
    NoBoundary,

    /// The fairing system could not be factored or produced non-finite values.
    #[error("fairing system is singular: {details}")]
    SingularSystem {
        /// Description of the failure.
        details: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        MeshError::Parse {
            line,
            message: message.into(),
        }
    }

    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::Io(_) => ErrorKind::Io,
            MeshError::Parse { .. }
            | MeshError::FaceIndexOutOfRange { .. }
            | MeshError::UnsupportedFormat { .. } => ErrorKind::Parse,
            MeshError::EmptyMesh
            | MeshError::InvalidVertexIndex { .. }
            | MeshError::DegenerateFace { .. }
            | MeshError::NonManifoldEdge { .. }
            | MeshError::NonManifoldVertex { .. }
            | MeshError::InvalidTopology(_) => ErrorKind::Topology,
            MeshError::NoBoundary | MeshError::SingularSystem { .. } => ErrorKind::Solve,
            MeshError::InvalidParameter { .. } => ErrorKind::Parameter,
        }
    }
}
