//! Iterative local fairing with the umbrella operator.
//!
//! Each pass moves every interior vertex a fixed fraction of the way toward
//! the centroid of its ring neighbours. Boundary vertices never move. After
//! enough passes the interior settles on the discrete harmonic surface
//! spanned by the boundary, the same surface [`global_fairing`] solves for
//! directly.
//!
//! # Update order
//!
//! Passes are Jacobi updates: every new position in a pass is computed from
//! the positions at the start of that pass, and all of them are written
//! afterwards. The result is therefore independent of vertex order and of
//! whether the pass runs on one thread or many.
//!
//! [`global_fairing`]: super::global_fairing

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::algo::boundary::{classify, walk_ring};
use crate::algo::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// Options for local fairing.
#[derive(Debug, Clone)]
pub struct LocalFairingOptions {
    /// Number of passes over the mesh.
    pub iterations: usize,

    /// Fraction of the way each vertex moves toward its neighbour centroid
    /// per pass (0.0 to 1.0).
    pub damping: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for LocalFairingOptions {
    fn default() -> Self {
        Self {
            iterations: 3000,
            damping: 0.3,
            parallel: true,
        }
    }
}

impl LocalFairingOptions {
    /// Create options with the specified number of iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Create options with the specified damping factor, clamped to `[0, 1]`.
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that the options describe a stable iteration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(MeshError::invalid_param(
                "damping",
                self.damping,
                "must lie in [0, 1]",
            ));
        }
        Ok(())
    }
}

/// How a local fairing run ended.
///
/// None of these are errors: the two early exits leave the mesh untouched
/// and tell the caller there is no point in running the smoother again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalFairingOutcome {
    /// All requested passes ran.
    Completed {
        /// Passes performed.
        iterations: usize,
        /// Interior vertices updated per pass.
        moved: usize,
    },

    /// Every vertex is on the boundary, so nothing can move.
    NoInteriorVertices,

    /// The surface has no boundary to hold it in place.
    ClosedSurface,
}

impl LocalFairingOutcome {
    /// Whether the smoother actually ran.
    pub fn is_completed(&self) -> bool {
        matches!(self, LocalFairingOutcome::Completed { .. })
    }
}

/// Fair the interior of a mesh with repeated damped umbrella steps.
///
/// # Example
///
/// ```
/// use fairmesh::algo::fairing::{local_fairing, LocalFairingOptions, LocalFairingOutcome};
/// use fairmesh::mesh::build_from_triangles;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mut mesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
///
/// let outcome = local_fairing(&mut mesh, &LocalFairingOptions::default()).unwrap();
/// assert_eq!(outcome, LocalFairingOutcome::NoInteriorVertices);
/// ```
pub fn local_fairing(
    mesh: &mut HalfEdgeMesh,
    options: &LocalFairingOptions,
) -> Result<LocalFairingOutcome> {
    local_fairing_with_progress(mesh, options, &Progress::none())
}

/// Local fairing with progress reporting.
pub fn local_fairing_with_progress(
    mesh: &mut HalfEdgeMesh,
    options: &LocalFairingOptions,
    progress: &Progress,
) -> Result<LocalFairingOutcome> {
    options.validate()?;

    let boundary = classify(mesh);
    if boundary.interior_count() == 0 {
        info!("local fairing skipped: no interior vertices");
        return Ok(LocalFairingOutcome::NoInteriorVertices);
    }
    if boundary.boundary_count() == 0 {
        warn!("local fairing skipped: surface is closed");
        return Ok(LocalFairingOutcome::ClosedSurface);
    }

    // Topology is fixed for the whole run, so rings are walked once.
    let rings: Vec<(VertexId, Vec<VertexId>)> = boundary
        .interior_vertices()
        .map(|v| (v, walk_ring(mesh, v).neighbors))
        .collect();

    debug!(
        interior = rings.len(),
        boundary = boundary.boundary_count(),
        iterations = options.iterations,
        damping = options.damping,
        parallel = options.parallel,
        "starting local fairing"
    );

    let stride = (options.iterations / 100).max(1);
    for iter in 0..options.iterations {
        progress.report_every(stride, iter, options.iterations, "Local fairing");

        let snapshot: &HalfEdgeMesh = mesh;
        let updated: Vec<Point3<f64>> = if options.parallel {
            rings
                .par_iter()
                .map(|(v, ring)| umbrella_step(snapshot, *v, ring, options.damping))
                .collect()
        } else {
            rings
                .iter()
                .map(|(v, ring)| umbrella_step(snapshot, *v, ring, options.damping))
                .collect()
        };

        for ((v, _), p) in rings.iter().zip(updated) {
            mesh.set_position(*v, p);
        }
    }
    progress.report(options.iterations, options.iterations, "Local fairing");

    Ok(LocalFairingOutcome::Completed {
        iterations: options.iterations,
        moved: rings.len(),
    })
}

/// New position of `v` after one damped umbrella step.
fn umbrella_step(mesh: &HalfEdgeMesh, v: VertexId, ring: &[VertexId], damping: f64) -> Point3<f64> {
    let p = *mesh.position(v);
    if ring.is_empty() {
        return p;
    }

    let mut offset = Vector3::zeros();
    for &n in ring {
        offset += p - mesh.position(n);
    }
    offset /= ring.len() as f64;

    p - offset * damping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::boundary::classify;
    use crate::algo::fairing::global_fairing;
    use crate::algo::test_meshes;

    fn positions(mesh: &HalfEdgeMesh) -> Vec<Point3<f64>> {
        mesh.vertex_positions()
    }

    #[test]
    fn test_default_options() {
        let options = LocalFairingOptions::default();
        assert_eq!(options.iterations, 3000);
        assert_eq!(options.damping, 0.3);
        assert!(options.parallel);
        assert_eq!(LocalFairingOptions::default().with_damping(4.0).damping, 1.0);
    }

    #[test]
    fn test_single_triangle_is_noop() {
        let mut mesh = test_meshes::single_triangle();
        let before = positions(&mesh);

        let outcome = local_fairing(&mut mesh, &LocalFairingOptions::default()).unwrap();

        assert_eq!(outcome, LocalFairingOutcome::NoInteriorVertices);
        assert!(!outcome.is_completed());
        assert_eq!(positions(&mesh), before);
    }

    #[test]
    fn test_closed_surface_is_noop() {
        let mut mesh = test_meshes::tetrahedron();
        let before = positions(&mesh);

        let outcome = local_fairing(&mut mesh, &LocalFairingOptions::default()).unwrap();

        assert_eq!(outcome, LocalFairingOutcome::ClosedSurface);
        assert_eq!(positions(&mesh), before);
    }

    #[test]
    fn test_zero_iterations_no_change() {
        let mut mesh = test_meshes::bumpy_grid(4);
        let before = positions(&mesh);

        let options = LocalFairingOptions::default().with_iterations(0);
        let outcome = local_fairing(&mut mesh, &options).unwrap();

        assert_eq!(outcome, LocalFairingOutcome::Completed { iterations: 0, moved: 9 });
        assert_eq!(positions(&mesh), before);
    }

    #[test]
    fn test_invalid_damping_rejected() {
        let mut mesh = test_meshes::bumpy_grid(4);
        let options = LocalFairingOptions {
            damping: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            local_fairing(&mut mesh, &options),
            Err(MeshError::InvalidParameter { name: "damping", .. })
        ));
    }

    #[test]
    fn test_single_pass_is_jacobi() {
        let mut mesh = test_meshes::bumpy_grid(4);
        let before = mesh.clone();
        let boundary = classify(&before);

        let options = LocalFairingOptions::default().with_iterations(1);
        local_fairing(&mut mesh, &options).unwrap();

        for v in before.vertex_ids() {
            let p = *before.position(v);
            let expected = if boundary.is_boundary(v) {
                p
            } else {
                let ring = walk_ring(&before, v).neighbors;
                let centroid = ring
                    .iter()
                    .fold(Vector3::zeros(), |acc, &n| acc + before.position(n).coords)
                    / ring.len() as f64;
                p + (centroid - p.coords) * 0.3
            };
            assert!(
                (mesh.position(v) - expected).norm() < 1e-12,
                "{:?} read an already-updated neighbour",
                v
            );
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut parallel = test_meshes::bumpy_grid(6);
        let mut sequential = parallel.clone();

        let options = LocalFairingOptions::default().with_iterations(25);
        local_fairing(&mut parallel, &options).unwrap();
        local_fairing(&mut sequential, &options.clone().sequential()).unwrap();

        assert_eq!(positions(&parallel), positions(&sequential));
    }

    #[test]
    fn test_boundary_fixed_and_interior_flattened() {
        let mut mesh = test_meshes::bumpy_grid(6);
        let before = mesh.clone();
        let boundary = classify(&mesh);

        let outcome = local_fairing(&mut mesh, &LocalFairingOptions::default()).unwrap();
        assert!(outcome.is_completed());

        for v in mesh.vertex_ids() {
            if boundary.is_boundary(v) {
                assert_eq!(mesh.position(v), before.position(v));
            } else {
                assert!(mesh.position(v).z.abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_converges_to_global_solution() {
        let mut local = test_meshes::bumpy_grid(5);
        let mut global = local.clone();

        local_fairing(&mut local, &LocalFairingOptions::default()).unwrap();
        global_fairing(&mut global).unwrap();

        for v in local.vertex_ids() {
            assert!((local.position(v) - global.position(v)).norm() < 1e-6);
        }
    }

    #[test]
    fn test_progress_reaches_total() {
        use std::sync::{Arc, Mutex};

        let last = Arc::new(Mutex::new((0, 0)));
        let sink = Arc::clone(&last);
        let progress = Progress::new(move |current, total, _| {
            *sink.lock().unwrap() = (current, total);
        });

        let mut mesh = test_meshes::bumpy_grid(3);
        let options = LocalFairingOptions::default().with_iterations(10);
        local_fairing_with_progress(&mut mesh, &options, &progress).unwrap();

        assert_eq!(*last.lock().unwrap(), (10, 10));
    }
}
