//! Symmetric eigendecomposition and the pseudo-inverse solve built on it.
//!
//! The least-squares solver works on the normal matrix `XᵀX`, which is
//! symmetric positive semi-definite. Decomposing it with Jacobi rotations and
//! inverting only the eigenvalues above a relative cutoff yields the
//! minimum-norm solution even when the design is rank deficient.

use ndarray::{Array1, Array2};
use thiserror::Error;
use tracing::debug;

/// Errors raised by the linear algebra routines.
#[derive(Debug, Error)]
pub enum LinalgError {
    /// Input matrix is not square
    #[error("Matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows
        rows: usize,
        /// Number of columns
        cols: usize,
    },

    /// Right-hand side does not match the matrix
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Jacobi iteration did not reach the requested tolerance
    #[error("Eigendecomposition did not converge after {rotations} rotations")]
    NotConverged {
        /// Number of rotations applied
        rotations: usize,
    },
}

/// Result of eigenvalue decomposition
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order)
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors (columns are eigenvectors)
    pub eigenvectors: Array2<f64>,
}

/// Jacobi eigenvalue decomposition for symmetric matrices
///
/// Repeatedly zeroes the largest off-diagonal element until every
/// off-diagonal element is below `tolerance` times the Frobenius norm of the
/// input.
///
/// # Arguments
/// * `matrix` - Symmetric matrix to decompose
/// * `max_sweeps` - Rotation budget, in multiples of `n(n-1)/2`
/// * `tolerance` - Relative convergence tolerance for off-diagonal elements
pub fn jacobi_eigendecomp(
    matrix: &Array2<f64>,
    max_sweeps: usize,
    tolerance: f64,
) -> Result<EigenDecomposition, LinalgError> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(LinalgError::NotSquare {
            rows: n,
            cols: matrix.ncols(),
        });
    }

    let mut a = matrix.clone();
    let mut v = Array2::<f64>::eye(n);

    let norm = matrix.iter().map(|x| x * x).sum::<f64>().sqrt();
    let threshold = tolerance * norm;
    let max_rotations = max_sweeps * (n * n.saturating_sub(1) / 2).max(1);

    let mut converged = n < 2;
    let mut rotations = 0;
    while !converged && rotations < max_rotations {
        let (p, q, max_val) = find_largest_off_diagonal(&a);
        if max_val.abs() <= threshold {
            converged = true;
            break;
        }

        let (cos_theta, sin_theta) = compute_rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
        apply_jacobi_rotation(&mut a, &mut v, p, q, cos_theta, sin_theta);
        rotations += 1;
    }

    if !converged {
        let (_, _, max_val) = find_largest_off_diagonal(&a);
        if max_val.abs() > threshold {
            return Err(LinalgError::NotConverged { rotations });
        }
    }

    // Sort eigenpairs in descending order
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let eigenvalues = indices.iter().map(|&i| a[[i, i]]).collect();
    let mut eigenvectors = Array2::<f64>::zeros((n, n));
    for (new_idx, &old_idx) in indices.iter().enumerate() {
        eigenvectors.column_mut(new_idx).assign(&v.column(old_idx));
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// Solve `A x = b` for symmetric positive semi-definite `A` through its
/// pseudo-inverse.
///
/// Eigenvalues at or below `rcond * λ_max` are treated as zero, so the
/// returned solution is the minimum-norm one. Also returns the number of
/// eigenvalues kept (the numerical rank of `A`).
pub fn pseudo_inverse_solve(
    a: &Array2<f64>,
    b: &Array1<f64>,
    rcond: f64,
) -> Result<(Array1<f64>, usize), LinalgError> {
    let n = a.nrows();
    if b.len() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            actual: b.len(),
        });
    }

    let decomp = jacobi_eigendecomp(a, 100, 1e-14)?;
    let lambda_max = decomp.eigenvalues.iter().copied().fold(0.0, f64::max);
    let cutoff = rcond * lambda_max;

    let mut solution = Array1::<f64>::zeros(n);
    let mut rank = 0;
    for (k, &lambda) in decomp.eigenvalues.iter().enumerate() {
        if lambda <= cutoff || lambda <= 0.0 {
            debug!(eigenvalue = lambda, cutoff, "dropping null direction");
            continue;
        }
        let direction = decomp.eigenvectors.column(k);
        solution.scaled_add(direction.dot(b) / lambda, &direction);
        rank += 1;
    }

    Ok((solution, rank))
}

/// Find the largest off-diagonal element in a symmetric matrix
fn find_largest_off_diagonal(matrix: &Array2<f64>) -> (usize, usize, f64) {
    let n = matrix.nrows();
    let mut max_val = 0.0;
    let mut p = 0;
    let mut q = 1.min(n.saturating_sub(1));

    for i in 0..n {
        for j in (i + 1)..n {
            let val = matrix[[i, j]].abs();
            if val > max_val {
                max_val = val;
                p = i;
                q = j;
            }
        }
    }

    (p, q, max_val)
}

/// Compute the rotation (cos, sin) that zeroes `a[p][q]`
fn compute_rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    if apq == 0.0 {
        return (1.0, 0.0);
    }

    let tau = (aqq - app) / (2.0 * apq);
    let t = if tau >= 0.0 {
        1.0 / (tau + (1.0 + tau * tau).sqrt())
    } else {
        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
    };

    let cos_theta = 1.0 / (1.0 + t * t).sqrt();
    let sin_theta = t * cos_theta;

    (cos_theta, sin_theta)
}

/// Apply a Jacobi rotation to matrix A and eigenvector matrix V
fn apply_jacobi_rotation(
    a: &mut Array2<f64>,
    v: &mut Array2<f64>,
    p: usize,
    q: usize,
    cos_theta: f64,
    sin_theta: f64,
) {
    let n = a.nrows();

    let app = a[[p, p]];
    let aqq = a[[q, q]];
    let apq = a[[p, q]];

    a[[p, p]] = cos_theta * cos_theta * app - 2.0 * cos_theta * sin_theta * apq
        + sin_theta * sin_theta * aqq;
    a[[q, q]] = sin_theta * sin_theta * app
        + 2.0 * cos_theta * sin_theta * apq
        + cos_theta * cos_theta * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in 0..n {
        if i != p && i != q {
            let aip = a[[i, p]];
            let aiq = a[[i, q]];

            a[[i, p]] = cos_theta * aip - sin_theta * aiq;
            a[[p, i]] = a[[i, p]];

            a[[i, q]] = sin_theta * aip + cos_theta * aiq;
            a[[q, i]] = a[[i, q]];
        }
    }

    for i in 0..n {
        let vip = v[[i, p]];
        let viq = v[[i, q]];

        v[[i, p]] = cos_theta * vip - sin_theta * viq;
        v[[i, q]] = sin_theta * vip + cos_theta * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_eigendecomp_diagonal() {
        let m = array![[1.0, 0.0], [0.0, 3.0]];
        let decomp = jacobi_eigendecomp(&m, 100, 1e-14).unwrap();
        assert_relative_eq!(decomp.eigenvalues[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(decomp.eigenvalues[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_eigendecomp_reconstructs_matrix() {
        let m = array![[4.0, 1.0, 0.5], [1.0, 9.0, 1.5], [0.5, 1.5, 16.0]];
        let decomp = jacobi_eigendecomp(&m, 100, 1e-14).unwrap();

        let lambda = Array2::from_diag(&decomp.eigenvalues);
        let rebuilt = decomp
            .eigenvectors
            .dot(&lambda)
            .dot(&decomp.eigenvectors.t());
        for (a, b) in rebuilt.iter().zip(m.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_non_square_rejected() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            jacobi_eigendecomp(&m, 10, 1e-14),
            Err(LinalgError::NotSquare { rows: 2, cols: 3 })
        ));
    }

    #[test]
    fn test_pseudo_inverse_full_rank() {
        let a = array![[2.0, 0.0], [0.0, 4.0]];
        let b = array![2.0, 8.0];
        let (x, rank) = pseudo_inverse_solve(&a, &b, 1e-10).unwrap();
        assert_eq!(rank, 2);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pseudo_inverse_singular_gives_min_norm() {
        // A = [[1, 1], [1, 1]] has null space (1, -1); the minimum-norm
        // solution of A x = (2, 2) is (1, 1).
        let a = array![[1.0, 1.0], [1.0, 1.0]];
        let b = array![2.0, 2.0];
        let (x, rank) = pseudo_inverse_solve(&a, &b, 1e-10).unwrap();
        assert_eq!(rank, 1);
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_pseudo_inverse_zero_matrix() {
        let a = Array2::<f64>::zeros((3, 3));
        let b = Array1::<f64>::zeros(3);
        let (x, rank) = pseudo_inverse_solve(&a, &b, 1e-10).unwrap();
        assert_eq!(rank, 0);
        assert!(x.iter().all(|&v| v == 0.0));
    }
}
