//! Second-order vertical diffusion operators.
//!
//! Discretizes `∂/∂z (K ∂φ/∂z)` on the staggered column grid as a
//! three-point stencil
//!
//! ```text
//! L(φ)[k] = a[k] φ[k-1] - b[k] φ[k] + c[k] φ[k+1]
//! ```
//!
//! Two layouts are needed:
//!
//! - **Center fields** (u, v, b) with diffusivity on faces:
//!   `a[k] = K[k] / (dz[k] dzt[k])`, `c[k] = K[k+1] / (dz[k] dzt[k+1])`.
//! - **Face fields** (TKE) with diffusivity on centers:
//!   `a[k] = K[k-1] / (dz[k-1] dzt[k])`, `c[k] = K[k] / (dz[k] dzt[k])`.
//!
//! Interior rows use `b = a + c`. The top row is always zero-flux
//! (`b[0] = c[0]`); surface fluxes enter as explicit sources instead. The
//! bottom row is zero-flux (`b[n-1] = a[n-1]`) unless a no-slip wall is
//! requested, in which case the implicit matrix carries an extra
//! `2 c[n-1]` on its last diagonal entry. The wall part is kept apart from
//! the diffusion tendency so that budgets can book it as bottom stress.

use serde::{Deserialize, Serialize};

use crate::solver::{SolveError, TridiagonalSystem};
use crate::vertical::VerticalGrid;

/// Bottom boundary condition for momentum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottomBoundary {
    /// Velocity vanishes at the bottom face.
    #[default]
    NoSlip,
    /// Zero stress at the bottom face.
    FreeSlip,
}

/// Discrete vertical diffusion operator.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffusionOperator {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
    /// Extra damping on the last row from a no-slip wall.
    wall: f64,
}

impl DiffusionOperator {
    /// Operator for a cell-center field with diffusivity at faces.
    ///
    /// # Arguments
    /// * `grid` - Column grid
    /// * `diffusivity` - Face diffusivity, length nz + 1
    /// * `bottom` - Bottom condition; [`BottomBoundary::FreeSlip`] is zero flux
    pub fn centers(grid: &VerticalGrid, diffusivity: &[f64], bottom: BottomBoundary) -> Self {
        let nz = grid.nz();
        let dz = grid.dz();
        let dzt = grid.dzt();
        debug_assert_eq!(diffusivity.len(), nz + 1);

        let mut lower: Vec<f64> = (0..nz)
            .map(|k| diffusivity[k] / (dz[k] * dzt[k]))
            .collect();
        let mut upper: Vec<f64> = (0..nz)
            .map(|k| diffusivity[k + 1] / (dz[k] * dzt[k + 1]))
            .collect();
        let mut diag: Vec<f64> = lower.iter().zip(&upper).map(|(a, c)| a + c).collect();

        diag[0] = upper[0];
        diag[nz - 1] = lower[nz - 1];

        let wall = match bottom {
            BottomBoundary::NoSlip => 2.0 * upper[nz - 1],
            BottomBoundary::FreeSlip => 0.0,
        };

        lower[0] = 0.0;
        upper[nz - 1] = 0.0;

        Self {
            lower,
            diag,
            upper,
            wall,
        }
    }

    /// Operator for a face field with diffusivity at cell centers.
    ///
    /// Zero flux through the surface and the bottom.
    ///
    /// # Arguments
    /// * `grid` - Column grid
    /// * `diffusivity` - Center diffusivity, length nz
    pub fn faces(grid: &VerticalGrid, diffusivity: &[f64]) -> Self {
        let nz = grid.nz();
        let n = nz + 1;
        let dz = grid.dz();
        let dzt = grid.dzt();
        debug_assert_eq!(diffusivity.len(), nz);

        let mut lower = vec![0.0; n];
        let mut upper = vec![0.0; n];
        for k in 1..n {
            lower[k] = diffusivity[k - 1] / (dz[k - 1] * dzt[k]);
        }
        for k in 0..nz {
            upper[k] = diffusivity[k] / (dz[k] * dzt[k]);
        }

        let mut diag: Vec<f64> = lower.iter().zip(&upper).map(|(a, c)| a + c).collect();
        diag[0] = upper[0];
        diag[nz] = lower[nz];

        Self {
            lower,
            diag,
            upper,
            wall: 0.0,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.diag.len()
    }

    /// Whether the operator has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// Sub-diagonal coefficients `a`.
    #[inline]
    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    /// Diagonal coefficients `b` (without the wall term).
    #[inline]
    pub fn diag(&self) -> &[f64] {
        &self.diag
    }

    /// Super-diagonal coefficients `c`.
    #[inline]
    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// No-slip wall coefficient on the last row (zero otherwise).
    #[inline]
    pub fn wall(&self) -> f64 {
        self.wall
    }

    /// Diffusive tendency `L(φ)` of a field, excluding the wall term.
    pub fn tendency(&self, field: &[f64]) -> Vec<f64> {
        let n = self.len();
        debug_assert_eq!(field.len(), n);

        let mut out = vec![0.0; n];
        out[0] = -self.diag[0] * field[0] + self.upper[0] * field[1];
        for k in 1..n - 1 {
            out[k] = self.lower[k] * field[k - 1] - self.diag[k] * field[k]
                + self.upper[k] * field[k + 1];
        }
        out[n - 1] = self.lower[n - 1] * field[n - 2] - self.diag[n - 1] * field[n - 1];
        out
    }

    /// Tendency of the last row from the no-slip wall, `-wall φ[n-1]`.
    #[inline]
    pub fn wall_tendency(&self, field: &[f64]) -> f64 {
        -self.wall * field[self.len() - 1]
    }

    /// Backward-Euler system `(I - Δt L) x = rhs`, wall included.
    pub fn implicit_system(&self, dt: f64, rhs: Vec<f64>) -> Result<TridiagonalSystem, SolveError> {
        let n = self.len();
        let lower = self.lower.iter().map(|a| -dt * a).collect();
        let upper = self.upper.iter().map(|c| -dt * c).collect();
        let mut diag: Vec<f64> = self.diag.iter().map(|b| 1.0 + dt * b).collect();
        diag[n - 1] += dt * self.wall;
        TridiagonalSystem::new(lower, diag, upper, rhs)
    }
}
