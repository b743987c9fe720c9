//! Small meshes shared by the algorithm tests.

use nalgebra::Point3;

use crate::mesh::{build_from_triangles, HalfEdgeMesh};

/// Faces of an `n` x `n` cell grid, two triangles per cell.
///
/// Diagonals alternate between cells, so every interior vertex at an even
/// grid position has valence 4 and the others have valence 8.
pub fn grid_faces(n: usize) -> Vec<[usize; 3]> {
    let mut faces = Vec::with_capacity(n * n * 2);
    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            if (i + j) % 2 == 0 {
                faces.push([v00, v10, v01]);
                faces.push([v10, v11, v01]);
            } else {
                faces.push([v00, v10, v11]);
                faces.push([v00, v11, v01]);
            }
        }
    }
    faces
}

/// Vertex positions of the unit square sampled on an `n` x `n` grid, with
/// heights from `height(i, j)`.
pub fn grid_vertices(n: usize, height: impl Fn(usize, usize) -> f64) -> Vec<Point3<f64>> {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(
                i as f64 / n as f64,
                j as f64 / n as f64,
                height(i, j),
            ));
        }
    }
    vertices
}

/// Flat unit-square grid.
pub fn grid(n: usize) -> HalfEdgeMesh {
    build_from_triangles(&grid_vertices(n, |_, _| 0.0), &grid_faces(n)).unwrap()
}

/// Unit-square grid with a flat border and a bumpy interior.
pub fn bumpy_grid(n: usize) -> HalfEdgeMesh {
    let height = |i: usize, j: usize| {
        if i == 0 || j == 0 || i == n || j == n {
            0.0
        } else {
            0.3 * ((i * 7 + j * 3) % 5) as f64 - 0.5
        }
    };
    build_from_triangles(&grid_vertices(n, height), &grid_faces(n)).unwrap()
}

/// A single triangle: three boundary vertices, no interior.
pub fn single_triangle() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
}

/// A closed tetrahedron: no boundary at all.
pub fn tetrahedron() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
    build_from_triangles(&vertices, &faces).unwrap()
}
