//! The uniform Laplace system behind global fairing.
//!
//! One row per vertex. A boundary row is the identity with the vertex's own
//! position on the right-hand side. An interior row holds the ring size on
//! the diagonal and `-1` for every ring step, with a zero right-hand side,
//! so its solution is the centroid of its neighbours. Repeated ring entries
//! are summed.
//!
//! Boundary rows are eliminated before factoring. The remaining interior
//! block is a graph Laplacian plus positive diagonal terms wherever an
//! interior vertex touches the boundary, which makes it symmetric positive
//! definite as long as every interior component reaches the boundary.

use std::collections::{HashMap, VecDeque};

use nalgebra::{DMatrix, Point3};
use nalgebra_sparse::factorization::CscCholesky;
use nalgebra_sparse::{CooMatrix, CscMatrix, CsrMatrix};
use tracing::debug;

use crate::algo::boundary::{walk_ring, BoundaryMap};
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeMesh, VertexId};

/// How the interior block was factored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factorization {
    /// No interior rows; the solution is the right-hand side.
    Identity,
    /// Sparse Cholesky on the symmetric interior block.
    SparseCholesky,
    /// Dense LU, used when the block is not symmetric or Cholesky fails.
    DenseLu,
}

impl std::fmt::Display for Factorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Factorization::Identity => "identity",
            Factorization::SparseCholesky => "sparse Cholesky",
            Factorization::DenseLu => "dense LU",
        };
        f.write_str(name)
    }
}

/// Solved positions for every row of a [`LaplaceSystem`].
#[derive(Debug, Clone)]
pub struct SystemSolution {
    /// One row per vertex, columns are x, y, z.
    pub positions: DMatrix<f64>,
    /// Which factorization produced the interior rows.
    pub factorization: Factorization,
}

impl SystemSolution {
    /// Solved position of row `i`.
    pub fn point(&self, i: usize) -> Point3<f64> {
        Point3::new(
            self.positions[(i, 0)],
            self.positions[(i, 1)],
            self.positions[(i, 2)],
        )
    }
}

/// The assembled `N x N` system `A X = B` with three right-hand-side columns.
#[derive(Debug, Clone)]
pub struct LaplaceSystem {
    matrix: CsrMatrix<f64>,
    rhs: DMatrix<f64>,
    fixed: Vec<bool>,
}

impl LaplaceSystem {
    /// Assemble the system for `mesh` using a precomputed boundary map.
    pub fn assemble(mesh: &HalfEdgeMesh, boundary: &BoundaryMap) -> Self {
        let rings: Vec<Option<Vec<VertexId>>> = mesh
            .vertex_ids()
            .map(|v| {
                if boundary.is_boundary(v) {
                    None
                } else {
                    Some(walk_ring(mesh, v).neighbors)
                }
            })
            .collect();

        Self::from_rings(&mesh.vertex_positions(), &rings)
    }

    /// Assemble from raw rings: `None` marks a fixed row, `Some(ring)` an
    /// interior row with one `-1` per entry of `ring`.
    pub fn from_rings(positions: &[Point3<f64>], rings: &[Option<Vec<VertexId>>]) -> Self {
        let n = positions.len();
        debug_assert_eq!(rings.len(), n);

        let mut coo = CooMatrix::new(n, n);
        let mut rhs = DMatrix::<f64>::zeros(n, 3);

        for (i, ring) in rings.iter().enumerate() {
            match ring {
                None => {
                    coo.push(i, i, 1.0);
                    for k in 0..3 {
                        rhs[(i, k)] = positions[i][k];
                    }
                }
                Some(ring) => {
                    coo.push(i, i, ring.len() as f64);
                    for &j in ring {
                        coo.push(i, j.index(), -1.0);
                    }
                }
            }
        }

        Self {
            matrix: CsrMatrix::from(&coo),
            rhs,
            fixed: rings.iter().map(Option::is_none).collect(),
        }
    }

    /// The system matrix.
    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// The right-hand side, one row per vertex.
    pub fn rhs(&self) -> &DMatrix<f64> {
        &self.rhs
    }

    /// Number of rows.
    pub fn dimension(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of stored non-zeros.
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Coefficient at `(row, col)`, zero if not stored.
    pub fn coefficient(&self, row: usize, col: usize) -> f64 {
        let row = self.matrix.row(row);
        row.col_indices()
            .iter()
            .position(|&c| c == col)
            .map_or(0.0, |k| row.values()[k])
    }

    /// Solve for all three coordinates at once.
    ///
    /// Fixed rows come back exactly as assembled. Fails with
    /// [`MeshError::SingularSystem`] if some interior vertices are not tied
    /// to any fixed vertex, if no factorization succeeds, or if the result
    /// is not finite.
    pub fn solve(&self) -> Result<SystemSolution> {
        let n = self.dimension();

        let mut slot = vec![None; n];
        let mut interior = Vec::new();
        for (i, &fixed) in self.fixed.iter().enumerate() {
            if !fixed {
                slot[i] = Some(interior.len());
                interior.push(i);
            }
        }

        let m = interior.len();
        if m == 0 {
            return Ok(SystemSolution {
                positions: self.rhs.clone(),
                factorization: Factorization::Identity,
            });
        }

        // Move fixed columns to the right-hand side.
        let mut coo = CooMatrix::new(m, m);
        let mut rhs = DMatrix::<f64>::zeros(m, 3);
        let mut anchored = vec![false; m];
        for (ci, &i) in interior.iter().enumerate() {
            let row = self.matrix.row(i);
            for k in 0..3 {
                rhs[(ci, k)] = self.rhs[(i, k)];
            }
            for (&j, &value) in row.col_indices().iter().zip(row.values()) {
                match slot[j] {
                    Some(cj) => coo.push(ci, cj, value),
                    None => {
                        if value != 0.0 {
                            anchored[ci] = true;
                        }
                        for k in 0..3 {
                            rhs[(ci, k)] -= value * self.rhs[(j, k)];
                        }
                    }
                }
            }
        }

        let csc = CscMatrix::from(&coo);
        let floating = count_unanchored(&csc, anchored);
        if floating > 0 {
            return Err(MeshError::SingularSystem {
                details: format!("{} interior vertices are not connected to the boundary", floating),
            });
        }

        let (solution, factorization) = if is_symmetric(&csc) {
            match CscCholesky::factor(&csc) {
                Ok(cholesky) => (cholesky.solve(&rhs), Factorization::SparseCholesky),
                Err(err) => {
                    debug!("sparse Cholesky failed ({:?}), falling back to dense LU", err);
                    (dense_lu_solve(&csc, &rhs)?, Factorization::DenseLu)
                }
            }
        } else {
            (dense_lu_solve(&csc, &rhs)?, Factorization::DenseLu)
        };

        if solution.iter().any(|x| !x.is_finite()) {
            return Err(MeshError::SingularSystem {
                details: format!("{} produced non-finite coordinates", factorization),
            });
        }

        let mut positions = self.rhs.clone();
        for (ci, &i) in interior.iter().enumerate() {
            for k in 0..3 {
                positions[(i, k)] = solution[(ci, k)];
            }
        }

        debug!(
            interior = m,
            nnz = csc.nnz(),
            %factorization,
            "solved Laplace system"
        );

        Ok(SystemSolution {
            positions,
            factorization,
        })
    }
}

/// Interior rows that no chain of couplings connects to a fixed row.
fn count_unanchored(matrix: &CscMatrix<f64>, anchored: Vec<bool>) -> usize {
    let mut reached = anchored;
    let mut queue: VecDeque<usize> = reached
        .iter()
        .enumerate()
        .filter(|(_, &r)| r)
        .map(|(i, _)| i)
        .collect();

    // Row r depends on column c, so reaching c reaches every r in its column.
    while let Some(c) = queue.pop_front() {
        let col = matrix.col(c);
        for (&r, &value) in col.row_indices().iter().zip(col.values()) {
            if value != 0.0 && !reached[r] {
                reached[r] = true;
                queue.push_back(r);
            }
        }
    }

    reached.iter().filter(|&&r| !r).count()
}

fn is_symmetric(matrix: &CscMatrix<f64>) -> bool {
    let entries: HashMap<(usize, usize), f64> = matrix
        .triplet_iter()
        .map(|(r, c, &v)| ((r, c), v))
        .collect();

    entries
        .iter()
        .all(|(&(r, c), &v)| entries.get(&(c, r)).copied().unwrap_or(0.0) == v)
}

/// Largest interior block the dense LU fallback will factor.
pub(crate) const DENSE_FALLBACK_LIMIT: usize = 4096;

fn dense_lu_solve(matrix: &CscMatrix<f64>, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let m = matrix.nrows();
    if m > DENSE_FALLBACK_LIMIT {
        return Err(MeshError::SingularSystem {
            details: format!(
                "{} interior rows are too many for the dense LU fallback (limit {})",
                m, DENSE_FALLBACK_LIMIT
            ),
        });
    }
    let mut dense = DMatrix::zeros(m, m);
    for (r, c, &v) in matrix.triplet_iter() {
        dense[(r, c)] += v;
    }

    dense.lu().solve(rhs).ok_or_else(|| MeshError::SingularSystem {
        details: "LU factorization hit a zero pivot".to_string(),
    })
}
