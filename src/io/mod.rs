//! Mesh file I/O.
//!
//! Meshes are exchanged as Wavefront OBJ files restricted to vertex
//! positions and triangular faces. See [`obj`] for the exact subset.
//!
//! # Usage
//!
//! ```no_run
//! use fairmesh::io::{load, save};
//!
//! let mesh = load("model.obj").unwrap();
//! save(&mesh, "output.obj").unwrap();
//! ```

pub mod obj;

use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::HalfEdgeMesh;

fn ensure_obj(path: &Path) -> Result<()> {
    let is_obj = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));

    if is_obj {
        Ok(())
    } else {
        Err(MeshError::UnsupportedFormat {
            path: path.to_path_buf(),
        })
    }
}

/// Load a mesh from a file.
///
/// The file must have an `.obj` extension. Nothing is returned unless the
/// whole file parses and forms a valid mesh.
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    ensure_obj(path)?;
    obj::load(path)
}

/// Save a mesh to a file.
///
/// The file must have an `.obj` extension.
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    ensure_obj(path)?;
    obj::save(mesh, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_check() {
        assert!(ensure_obj(Path::new("a/b/model.obj")).is_ok());
        assert!(ensure_obj(Path::new("MODEL.OBJ")).is_ok());
        assert!(matches!(
            ensure_obj(Path::new("model.stl")),
            Err(MeshError::UnsupportedFormat { .. })
        ));
        assert!(ensure_obj(Path::new("model")).is_err());
    }

    #[test]
    fn test_save_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mesh.ply");
        assert!(save(&HalfEdgeMesh::new(), &path).is_err());
        assert!(!path.exists());
    }
}
