//! Wavefront OBJ format support.
//!
//! Only the geometry subset is handled: `v` records carry vertex positions
//! and `f` records carry triangles with 1-based vertex indices. Every other
//! record (`vt`, `vn`, groups, materials, comments) is skipped on import and
//! never written on export.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use tracing::debug;

use crate::error::{MeshError, Result};
use crate::mesh::{build_from_triangles, HalfEdgeMesh};

/// A face record as read from the file, before its indices are resolved.
struct RawFace {
    line: usize,
    /// Indices as written, for error reporting.
    written: [i64; 3],
    /// Indices with relative (negative) entries made absolute.
    resolved: [i64; 3],
}

/// Parse OBJ text into vertex positions and 0-based triangle indices.
///
/// Face indices are resolved after the whole input has been read, so a face
/// may reference a vertex declared later in the file. Negative indices are
/// relative to the last vertex declared before the face, as in the OBJ format.
///
/// Lines are read as raw bytes. Only `v` and `f` records have to be valid
/// UTF-8; comments, names and other records may use any encoding.
pub fn parse<R: BufRead>(reader: R) -> Result<(Vec<Point3<f64>>, Vec<[usize; 3]>)> {
    let mut vertices = Vec::new();
    let mut raw_faces = Vec::new();

    for (i, bytes) in reader.split(b'\n').enumerate() {
        let bytes = bytes?;
        let line_no = i + 1;

        let keyword = bytes
            .split(|b| b.is_ascii_whitespace())
            .find(|token| !token.is_empty());
        if !matches!(keyword, Some(b"v") | Some(b"f")) {
            continue;
        }

        let line = std::str::from_utf8(&bytes)
            .map_err(|_| MeshError::parse(line_no, "record is not valid UTF-8"))?;
        let mut fields = line.split_whitespace();

        match fields.next() {
            Some("v") => vertices.push(parse_vertex(line_no, fields)?),
            Some("f") => {
                let written = parse_face(line_no, fields)?;
                let resolved = written.map(|index| {
                    if index < 0 {
                        index + vertices.len() as i64 + 1
                    } else {
                        index
                    }
                });
                raw_faces.push(RawFace {
                    line: line_no,
                    written,
                    resolved,
                });
            }
            _ => {}
        }
    }

    let count = vertices.len();
    let faces = raw_faces
        .into_iter()
        .map(|face| {
            let mut tri = [0usize; 3];
            for (slot, (&index, &written)) in tri.iter_mut().zip(face.resolved.iter().zip(&face.written)) {
                if index < 1 || index as usize > count {
                    return Err(MeshError::FaceIndexOutOfRange {
                        line: face.line,
                        index: written,
                        count,
                    });
                }
                *slot = index as usize - 1;
            }
            Ok(tri)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((vertices, faces))
}

fn parse_vertex<'a>(line: usize, fields: impl Iterator<Item = &'a str>) -> Result<Point3<f64>> {
    let coords = fields
        .map(|field| {
            field
                .parse::<f64>()
                .map_err(|_| MeshError::parse(line, format!("invalid coordinate '{}'", field)))
        })
        .collect::<Result<Vec<_>>>()?;

    // A fourth (w) coordinate is legal and ignored.
    match coords.as_slice() {
        [x, y, z] | [x, y, z, _] => Ok(Point3::new(*x, *y, *z)),
        _ => Err(MeshError::parse(
            line,
            format!("vertex needs 3 coordinates, found {}", coords.len()),
        )),
    }
}

fn parse_face<'a>(line: usize, fields: impl Iterator<Item = &'a str>) -> Result<[i64; 3]> {
    let corners = fields
        .map(|field| {
            // Corners may be written v, v/vt, v//vn or v/vt/vn.
            let index = field.split('/').next().unwrap_or(field);
            index
                .parse::<i64>()
                .map_err(|_| MeshError::parse(line, format!("invalid face index '{}'", field)))
        })
        .collect::<Result<Vec<_>>>()?;

    match corners.as_slice() {
        &[a, b, c] => Ok([a, b, c]),
        _ => Err(MeshError::parse(
            line,
            format!("only triangles are supported, face has {} corners", corners.len()),
        )),
    }
}

/// Read a mesh from OBJ text.
pub fn read<R: BufRead>(reader: R) -> Result<HalfEdgeMesh> {
    let (vertices, faces) = parse(reader)?;
    build_from_triangles(&vertices, &faces)
}

/// Load a mesh from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use fairmesh::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<HalfEdgeMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mesh = read(BufReader::new(file))?;
    debug!(path = %path.display(), vertices = mesh.vertex_count(), faces = mesh.face_count(), "loaded OBJ");
    Ok(mesh)
}

/// Write a mesh as OBJ text.
///
/// Vertices come first, then faces, both in table order. Coordinates are
/// written in the shortest form that parses back to the same value, so a
/// save/load cycle reproduces positions exactly.
pub fn write<W: Write>(mesh: &HalfEdgeMesh, mut writer: W) -> Result<()> {
    for p in mesh.vertices().map(|v| v.position) {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for [a, b, c] in mesh.face_indices() {
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save a mesh to an OBJ file.
///
/// # Example
///
/// ```no_run
/// use fairmesh::io::obj;
///
/// let mesh = obj::load("model.obj").unwrap();
/// obj::save(&mesh, "output.obj").unwrap();
/// ```
pub fn save<P: AsRef<Path>>(mesh: &HalfEdgeMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write(mesh, BufWriter::new(file))?;
    debug!(path = %path.display(), "saved OBJ");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn write_to_string(mesh: &HalfEdgeMesh) -> String {
        let mut out = Vec::new();
        write(mesh, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_single_triangle_file() {
        let mesh = read(Cursor::new(TRIANGLE)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(write_to_string(&mesh), TRIANGLE);
    }

    #[test]
    fn test_ignores_other_records() {
        let text = "# comment\no thing\nv 0 0 0\nvt 0.5 0.5\nvn 0 0 1\nv 1 0 0 1\n\
                    v 0 1 0\ng group\nusemtl red\ns off\nf 1/1/1 2//1 3\n";
        let mesh = read(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_indices(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_negative_and_forward_indices() {
        let (_, faces) = parse(Cursor::new("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n")).unwrap();
        assert_eq!(faces, vec![[0, 1, 2]]);

        let (_, faces) = parse(Cursor::new("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n")).unwrap();
        assert_eq!(faces, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_out_of_range_index() {
        let err = read(Cursor::new("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n")).unwrap_err();
        assert!(matches!(
            err,
            MeshError::FaceIndexOutOfRange { line: 4, index: 4, count: 3 }
        ));
        assert_eq!(err.kind(), ErrorKind::Parse);

        let err = read(Cursor::new("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n")).unwrap_err();
        assert!(matches!(err, MeshError::FaceIndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_negative_index_reported_as_written() {
        let err = read(Cursor::new("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 -5\n")).unwrap_err();
        assert!(matches!(
            err,
            MeshError::FaceIndexOutOfRange { line: 4, index: -5, count: 3 }
        ));
    }

    #[test]
    fn test_non_utf8_comment_is_ignored() {
        let mut text = b"# \xC4\xA3\xD0\xCD\no \xFF\xFEname\n".to_vec();
        text.extend_from_slice(TRIANGLE.as_bytes());
        let mesh = read(Cursor::new(text)).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_indices(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_non_utf8_vertex_is_parse_error() {
        let text = b"v 0 0 0\nv 1 \xC4\xA3 0\nv 0 1 0\nf 1 2 3\n".to_vec();
        let err = read(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_malformed_records() {
        let err = read(Cursor::new("v 0 zero 0\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));

        let err = read(Cursor::new("v 0 0\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 1, .. }));

        let err = read(Cursor::new("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 5, .. }));

        let err = read(Cursor::new("v 0 0 0\nf 1 a 1\n")).unwrap_err();
        assert!(matches!(err, MeshError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_topology_errors_propagate() {
        let err = read(Cursor::new("v 0 0 0\nv 1 0 0\nv 0 1 0\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Topology);
    }

    #[test]
    fn test_roundtrip_positions_exact() {
        let text = "v 0.1 -2.5e-7 3.141592653589793\nv 1e10 0.3333333333333333 -0\n\
                    v 7 8 9\nv -1 -1 -1\nf 1 2 3\nf 1 3 4\n";
        let mesh = read(Cursor::new(text)).unwrap();
        let again = read(Cursor::new(write_to_string(&mesh))).unwrap();

        assert_eq!(mesh.vertex_positions(), again.vertex_positions());
        assert_eq!(mesh.face_indices(), again.face_indices());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        let mesh = read(Cursor::new(TRIANGLE)).unwrap();

        save(&mesh, &path).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.vertex_positions(), mesh.vertex_positions());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), TRIANGLE);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("missing.obj")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
