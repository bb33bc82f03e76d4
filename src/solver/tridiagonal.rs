//! Thomas algorithm for tridiagonal systems.
//!
//! Every implicit step of the column model (momentum, buoyancy, TKE)
//! reduces to a system of the form
//!
//! ```text
//! a[i] x[i-1] + b[i] x[i] + c[i] x[i+1] = d[i]
//! ```
//!
//! with the first and last rows truncated. `a[0]` and `c[n-1]` are carried
//! along so that all four sequences share one length, but they never enter
//! the elimination.
//!
//! # Ownership
//!
//! [`TridiagonalSystem`] owns its four buffers and is consumed by
//! [`TridiagonalSystem::solve`]: elimination overwrites the diagonal and the
//! right-hand side, and the solution is written back into the right-hand
//! side buffer. Building a fresh system for every solve means a coefficient
//! array can never be "already consumed" when the caller reads it again.
//! [`solve_tridiagonal`] is the borrowing variant and copies its inputs.
//!
//! # Example
//!
//! ```
//! use vmix_rs::solver::TridiagonalSystem;
//!
//! // [ 2 -1  0] [x0]   [1]
//! // [-1  2 -1] [x1] = [0]
//! // [ 0 -1  2] [x2]   [1]
//! let system = TridiagonalSystem::new(
//!     vec![0.0, -1.0, -1.0],
//!     vec![2.0, 2.0, 2.0],
//!     vec![-1.0, -1.0, 0.0],
//!     vec![1.0, 0.0, 1.0],
//! )
//! .unwrap();
//!
//! let x = system.solve().unwrap();
//! assert!((x[0] - 1.0).abs() < 1e-14);
//! assert!((x[1] - 1.0).abs() < 1e-14);
//! assert!((x[2] - 1.0).abs() < 1e-14);
//! ```

use thiserror::Error;

/// Errors raised while setting up or solving a tridiagonal system.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    /// The system has no rows.
    #[error("Tridiagonal system is empty")]
    Empty,

    /// The four coefficient sequences differ in length.
    #[error(
        "Coefficient length mismatch: lower={lower}, diag={diag}, upper={upper}, rhs={rhs}"
    )]
    LengthMismatch {
        lower: usize,
        diag: usize,
        upper: usize,
        rhs: usize,
    },

    /// A pivot became exactly zero during elimination.
    #[error("Singular tridiagonal system: zero pivot at row {row}")]
    SingularPivot { row: usize },
}

/// A tridiagonal linear system that owns its coefficient buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct TridiagonalSystem {
    /// Sub-diagonal, `lower[0]` unused.
    pub lower: Vec<f64>,
    /// Main diagonal.
    pub diag: Vec<f64>,
    /// Super-diagonal, `upper[n-1]` unused.
    pub upper: Vec<f64>,
    /// Right-hand side.
    pub rhs: Vec<f64>,
}

impl TridiagonalSystem {
    /// Assemble a system, checking that all four sequences have the same,
    /// non-zero length.
    pub fn new(
        lower: Vec<f64>,
        diag: Vec<f64>,
        upper: Vec<f64>,
        rhs: Vec<f64>,
    ) -> Result<Self, SolveError> {
        let n = rhs.len();
        if lower.len() != n || diag.len() != n || upper.len() != n {
            return Err(SolveError::LengthMismatch {
                lower: lower.len(),
                diag: diag.len(),
                upper: upper.len(),
                rhs: n,
            });
        }
        if n == 0 {
            return Err(SolveError::Empty);
        }
        Ok(Self {
            lower,
            diag,
            upper,
            rhs,
        })
    }

    /// Number of unknowns.
    #[inline]
    pub fn len(&self) -> usize {
        self.rhs.len()
    }

    /// Whether the system has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rhs.is_empty()
    }

    /// Add `extra[i]` to the main diagonal.
    ///
    /// Used to fold linear sinks (TKE dissipation) into the implicit matrix.
    pub fn add_to_diagonal(&mut self, extra: &[f64]) {
        for (b, e) in self.diag.iter_mut().zip(extra) {
            *b += e;
        }
    }

    /// Residual `A x - d` of a candidate solution against this system.
    pub fn residual(&self, x: &[f64]) -> Vec<f64> {
        let n = self.len();
        (0..n)
            .map(|i| {
                let mut ax = self.diag[i] * x[i];
                if i > 0 {
                    ax += self.lower[i] * x[i - 1];
                }
                if i + 1 < n {
                    ax += self.upper[i] * x[i + 1];
                }
                ax - self.rhs[i]
            })
            .collect()
    }

    /// Solve the system, consuming it.
    ///
    /// Forward elimination followed by back substitution, no pivoting.
    /// Diagonal dominance is expected from the discretization; a pivot
    /// that is exactly zero is reported as [`SolveError::SingularPivot`].
    pub fn solve(self) -> Result<Vec<f64>, SolveError> {
        let Self {
            lower,
            mut diag,
            upper,
            mut rhs,
        } = self;
        let n = rhs.len();

        // Forward elimination
        for i in 1..n {
            let pivot = diag[i - 1];
            if pivot == 0.0 {
                return Err(SolveError::SingularPivot { row: i - 1 });
            }
            let m = lower[i] / pivot;
            diag[i] -= m * upper[i - 1];
            rhs[i] -= m * rhs[i - 1];
        }

        // Back substitution, solution overwrites rhs
        if diag[n - 1] == 0.0 {
            return Err(SolveError::SingularPivot { row: n - 1 });
        }
        rhs[n - 1] /= diag[n - 1];
        for i in (0..n - 1).rev() {
            rhs[i] = (rhs[i] - upper[i] * rhs[i + 1]) / diag[i];
        }

        Ok(rhs)
    }
}

/// Solve a tridiagonal system from borrowed coefficients.
///
/// The inputs are copied, so the caller's arrays are left untouched.
pub fn solve_tridiagonal(
    a: &[f64],
    b: &[f64],
    c: &[f64],
    d: &[f64],
) -> Result<Vec<f64>, SolveError> {
    TridiagonalSystem::new(a.to_vec(), b.to_vec(), c.to_vec(), d.to_vec())?.solve()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_identity_returns_rhs_exactly() {
        let n = 6;
        let d = vec![1.0, -2.5, 3.25, 0.0, 7.0, -1e-9];
        let x = solve_tridiagonal(&vec![0.0; n], &vec![1.0; n], &vec![0.0; n], &d).unwrap();
        assert_eq!(x, d);
    }

    #[test]
    fn test_known_3x3() {
        // [4 1 0] [1]   [ 6]
        // [1 4 1] [2] = [12]
        // [0 1 4] [3]   [14]
        let x = solve_tridiagonal(
            &[0.0, 1.0, 1.0],
            &[4.0, 4.0, 4.0],
            &[1.0, 1.0, 0.0],
            &[6.0, 12.0, 14.0],
        )
        .unwrap();
        for (xi, expected) in x.iter().zip([1.0, 2.0, 3.0]) {
            assert!((xi - expected).abs() < TOL, "{} != {}", xi, expected);
        }
    }

    #[test]
    fn test_known_5x5() {
        // Diagonally dominant with exact solution [1, -1, 2, 0, 0.5]
        let a = [0.0, -1.0, 2.0, -1.0, 1.0];
        let b = [5.0, 6.0, 7.0, 4.0, 3.0];
        let c = [2.0, 1.0, -3.0, 1.0, 0.0];
        let expected = [1.0, -1.0, 2.0, 0.0, 0.5];
        let d: Vec<f64> = (0..5)
            .map(|i| {
                let mut s = b[i] * expected[i];
                if i > 0 {
                    s += a[i] * expected[i - 1];
                }
                if i < 4 {
                    s += c[i] * expected[i + 1];
                }
                s
            })
            .collect();
        assert_eq!(d, vec![3.0, -5.0, 12.0, -1.5, 1.5]);

        let x = solve_tridiagonal(&a, &b, &c, &d).unwrap();
        for i in 0..5 {
            assert!((x[i] - expected[i]).abs() < TOL, "x[{}] = {}", i, x[i]);
        }
    }

    #[test]
    fn test_unused_corner_entries_are_ignored() {
        let d = [1.0, 0.0, 1.0];
        let clean = solve_tridiagonal(&[0.0, -1.0, -1.0], &[2.0; 3], &[-1.0, -1.0, 0.0], &d)
            .unwrap();
        let noisy = solve_tridiagonal(&[99.0, -1.0, -1.0], &[2.0; 3], &[-1.0, -1.0, 42.0], &d)
            .unwrap();
        assert_eq!(clean, noisy);
    }

    #[test]
    fn test_single_row() {
        let x = solve_tridiagonal(&[0.0], &[4.0], &[0.0], &[2.0]).unwrap();
        assert_eq!(x, vec![0.5]);
    }

    #[test]
    fn test_zero_pivot_is_reported() {
        let err = solve_tridiagonal(&[0.0, 1.0], &[0.0, 1.0], &[1.0, 0.0], &[1.0, 1.0])
            .unwrap_err();
        assert_eq!(err, SolveError::SingularPivot { row: 0 });
    }

    #[test]
    fn test_zero_last_pivot_is_reported() {
        // Second pivot becomes 1 - 1*1/1 = 0
        let err = solve_tridiagonal(&[0.0, 1.0], &[1.0, 1.0], &[1.0, 0.0], &[1.0, 1.0])
            .unwrap_err();
        assert_eq!(err, SolveError::SingularPivot { row: 1 });
    }

    #[test]
    fn test_length_mismatch() {
        let err = TridiagonalSystem::new(vec![0.0; 3], vec![1.0; 2], vec![0.0; 3], vec![1.0; 3])
            .unwrap_err();
        assert!(matches!(err, SolveError::LengthMismatch { diag: 2, rhs: 3, .. }));
    }

    #[test]
    fn test_empty_system() {
        let err = TridiagonalSystem::new(vec![], vec![], vec![], vec![]).unwrap_err();
        assert_eq!(err, SolveError::Empty);
    }

    #[test]
    fn test_borrowed_inputs_untouched() {
        let a = vec![0.0, -1.0, -1.0, -1.0];
        let b = vec![3.0; 4];
        let c = vec![-1.0, -1.0, -1.0, 0.0];
        let d = vec![1.0, 2.0, 3.0, 4.0];
        let (a0, b0, c0, d0) = (a.clone(), b.clone(), c.clone(), d.clone());
        let _ = solve_tridiagonal(&a, &b, &c, &d).unwrap();
        assert_eq!((a, b, c, d), (a0, b0, c0, d0));
    }

    #[test]
    fn test_residual_of_solution_vanishes() {
        let n = 40;
        let alpha = 0.7;
        let lower: Vec<f64> = (0..n).map(|i| if i > 0 { -alpha } else { 0.0 }).collect();
        let upper: Vec<f64> = (0..n).map(|i| if i + 1 < n { -alpha } else { 0.0 }).collect();
        let diag: Vec<f64> = (0..n).map(|i| 1.0 + 2.0 * alpha + 0.01 * i as f64).collect();
        let rhs: Vec<f64> = (0..n).map(|i| (i as f64 * 0.3).sin()).collect();

        let system = TridiagonalSystem::new(lower, diag, upper, rhs).unwrap();
        let x = system.clone().solve().unwrap();
        let r = system.residual(&x);
        assert!(r.iter().all(|ri| ri.abs() < TOL), "max residual too large");
    }
}
