//! Mesh processing algorithms.
//!
//! - **Boundary**: boundary classification and boundary-safe ring walks
//! - **Fairing**: local (iterative) and global (sparse solve) membrane fairing
//! - **Progress**: callbacks for long-running operations

pub mod boundary;
pub mod fairing;
pub mod progress;

pub use progress::Progress;

#[cfg(test)]
pub(crate) mod test_meshes;
