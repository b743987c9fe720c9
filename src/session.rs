//! An owned mesh plus a queue of one-shot fairing requests.
//!
//! A front end (viewer, CLI, script) asks for fairing with
//! [`Session::request_fairing`] whenever it likes; the work happens on the
//! next [`Session::update`], which runs each queued request exactly once and
//! reports what happened. A request never lingers as a flag that could fire
//! again on a later update.
//!
//! ```
//! use fairmesh::session::{FairingEvent, FairingRequest, Session};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]];
//!
//! let mut session = Session::new();
//! session.rebuild_from_arrays(&vertices, &faces).unwrap();
//! session.request_fairing(FairingRequest::Global);
//!
//! let events = session.update();
//! assert!(matches!(events[0], FairingEvent::Global(_)));
//! assert!(session.update().is_empty());
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::algo::fairing::{
    global_fairing, local_fairing_with_progress, GlobalFairingReport, LocalFairingOptions,
    LocalFairingOutcome,
};
use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::io;
use crate::mesh::{build_from_triangles, HalfEdgeMesh};

/// Which fairing to run on the next update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FairingRequest {
    /// Iterative umbrella smoothing.
    Local,
    /// Direct sparse solve.
    Global,
}

impl fmt::Display for FairingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FairingRequest::Local => f.write_str("local"),
            FairingRequest::Global => f.write_str("global"),
        }
    }
}

/// What happened to one request during [`Session::update`].
#[derive(Debug)]
pub enum FairingEvent {
    /// Local fairing ran or exited early.
    Local(LocalFairingOutcome),
    /// Global fairing succeeded.
    Global(GlobalFairingReport),
    /// The request failed; the mesh was not changed.
    Failed {
        /// The request that failed.
        request: FairingRequest,
        /// Why it failed.
        error: MeshError,
    },
}

impl FairingEvent {
    /// Whether the request failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, FairingEvent::Failed { .. })
    }
}

/// Exclusive owner of the working mesh.
#[derive(Debug, Default)]
pub struct Session {
    mesh: Option<HalfEdgeMesh>,
    pending: VecDeque<FairingRequest>,
    local_options: LocalFairingOptions,
    progress: Progress,
}

impl Session {
    /// Create a session with no mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given options for every local fairing request.
    pub fn with_local_options(mut self, options: LocalFairingOptions) -> Self {
        self.local_options = options;
        self
    }

    /// Report local fairing progress to `progress`.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// The current mesh, if one is loaded.
    pub fn mesh(&self) -> Option<&HalfEdgeMesh> {
        self.mesh.as_ref()
    }

    /// Options used for local fairing.
    pub fn local_options(&self) -> &LocalFairingOptions {
        &self.local_options
    }

    /// Replace the options used for local fairing.
    pub fn set_local_options(&mut self, options: LocalFairingOptions) {
        self.local_options = options;
    }

    /// Load a mesh from `path`, replacing the current one only on success.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<&HalfEdgeMesh> {
        let path = path.as_ref();
        let mesh = io::load(path).inspect_err(|e| warn!("failed to load {}: {}", path.display(), e))?;
        info!(path = %path.display(), "loaded mesh");
        Ok(self.install(mesh))
    }

    /// Save the current mesh to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mesh = self.mesh.as_ref().ok_or(MeshError::EmptyMesh)?;
        io::save(mesh, path)
    }

    /// Take ownership of `mesh`, dropping the previous one.
    pub fn install(&mut self, mut mesh: HalfEdgeMesh) -> &HalfEdgeMesh {
        mesh.update_normals();
        let summary = mesh.summary();
        debug!(
            vertices = summary.vertices,
            edges = summary.edges,
            faces = summary.faces,
            boundary = summary.boundary_vertices,
            "installed mesh"
        );
        self.mesh.insert(mesh)
    }

    /// Rebuild the mesh from raw arrays, replacing the current one only on
    /// success.
    pub fn rebuild_from_arrays(
        &mut self,
        vertices: &[Point3<f64>],
        faces: &[[usize; 3]],
    ) -> Result<&HalfEdgeMesh> {
        let mesh = build_from_triangles(vertices, faces)?;
        Ok(self.install(mesh))
    }

    /// Queue a fairing request for the next [`update`](Self::update).
    pub fn request_fairing(&mut self, request: FairingRequest) {
        debug!(%request, "fairing requested");
        self.pending.push_back(request);
    }

    /// Number of requests waiting for the next update.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Run every queued request once, in the order they were made.
    pub fn update(&mut self) -> Vec<FairingEvent> {
        let mut events = Vec::with_capacity(self.pending.len());
        while let Some(request) = self.pending.pop_front() {
            let event = match self.run(request) {
                Ok(event) => event,
                Err(error) => {
                    warn!(%request, %error, "fairing request failed");
                    FairingEvent::Failed { request, error }
                }
            };
            events.push(event);
        }
        events
    }

    fn run(&mut self, request: FairingRequest) -> Result<FairingEvent> {
        let mesh = self.mesh.as_mut().ok_or(MeshError::EmptyMesh)?;

        let event = match request {
            FairingRequest::Local => FairingEvent::Local(local_fairing_with_progress(
                mesh,
                &self.local_options,
                &self.progress,
            )?),
            FairingRequest::Global => FairingEvent::Global(global_fairing(mesh)?),
        };

        mesh.update_normals();
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::test_meshes;
    use std::io::Write;

    fn grid_session() -> Session {
        let mut session = Session::new();
        session.install(test_meshes::bumpy_grid(4));
        session
    }

    #[test]
    fn test_request_runs_once() {
        let mut session = grid_session();
        session.request_fairing(FairingRequest::Global);
        assert_eq!(session.pending(), 1);

        let events = session.update();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], FairingEvent::Global(_)));
        assert_eq!(session.pending(), 0);

        let before = session.mesh().unwrap().vertex_positions();
        assert!(session.update().is_empty());
        assert_eq!(session.mesh().unwrap().vertex_positions(), before);
    }

    #[test]
    fn test_requests_run_in_order() {
        let mut session = grid_session()
            .with_local_options(LocalFairingOptions::default().with_iterations(5));
        session.request_fairing(FairingRequest::Local);
        session.request_fairing(FairingRequest::Global);

        let events = session.update();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            FairingEvent::Local(LocalFairingOutcome::Completed { iterations: 5, .. })
        ));
        assert!(matches!(events[1], FairingEvent::Global(_)));
    }

    #[test]
    fn test_update_without_mesh_fails() {
        let mut session = Session::new();
        session.request_fairing(FairingRequest::Local);

        let events = session.update();
        assert!(events[0].is_failure());
        assert!(matches!(
            events[0],
            FairingEvent::Failed { request: FairingRequest::Local, error: MeshError::EmptyMesh }
        ));
    }

    #[test]
    fn test_failed_global_leaves_mesh() {
        let mut session = Session::new();
        session.install(test_meshes::tetrahedron());
        let before = session.mesh().unwrap().vertex_positions();

        session.request_fairing(FairingRequest::Global);
        let events = session.update();

        assert!(matches!(
            events[0],
            FairingEvent::Failed { error: MeshError::NoBoundary, .. }
        ));
        assert_eq!(session.mesh().unwrap().vertex_positions(), before);
    }

    #[test]
    fn test_failed_rebuild_keeps_mesh() {
        let mut session = grid_session();
        let before = session.mesh().unwrap().vertex_positions();

        let result = session.rebuild_from_arrays(&[Point3::origin()], &[[0, 0, 0]]);
        assert!(result.is_err());
        assert_eq!(session.mesh().unwrap().vertex_positions(), before);
    }

    #[test]
    fn test_failed_load_keeps_mesh() {
        let mut session = grid_session();
        let before = session.mesh().unwrap().vertex_positions();

        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        writeln!(file, "v 0 0 0\nf 1 2 3").unwrap();

        assert!(session.load(file.path()).is_err());
        assert_eq!(session.mesh().unwrap().vertex_positions(), before);
    }

    #[test]
    fn test_load_fair_save() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.obj");
        let output = dir.path().join("out.obj");
        io::save(&test_meshes::bumpy_grid(3), &input).unwrap();

        let mut session = Session::new();
        session.load(&input).unwrap();
        session.request_fairing(FairingRequest::Global);
        assert!(!session.update()[0].is_failure());
        session.save(&output).unwrap();

        let faired = io::load(&output).unwrap();
        assert!(faired.vertex_positions().iter().all(|p| p.z.abs() < 1e-9));
    }

    #[test]
    fn test_save_without_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new();
        assert!(matches!(
            session.save(dir.path().join("out.obj")),
            Err(MeshError::EmptyMesh)
        ));
    }
}
