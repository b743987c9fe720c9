//! Membrane fairing of a surface with its boundary held fixed.
//!
//! Both solvers aim at the same result: every interior vertex at the
//! centroid of its ring neighbours (the uniform discrete Laplacian is zero),
//! every boundary vertex exactly where it started.
//!
//! - [`local_fairing`]: damped Jacobi relaxation, cheap per pass, runs in
//!   parallel with rayon and converges slowly on large meshes.
//! - [`global_fairing`]: assembles the sparse system once and solves it
//!   directly.

mod global;
mod local;
pub mod system;

pub use global::{global_fairing, GlobalFairingReport};
pub use local::{
    local_fairing, local_fairing_with_progress, LocalFairingOptions, LocalFairingOutcome,
};
pub use system::{Factorization, LaplaceSystem, SystemSolution};
