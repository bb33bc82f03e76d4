//! Staggered z-level grid for a single water column.
//!
//! The column is discretized into `nz` layers counted from the surface
//! downward. Tracers and velocities live at cell centers (`zt`), while TKE
//! and the mixing coefficients live at cell faces (`zu`):
//!
//! ```text
//!   zu[0] = 0      ──────────  face 0 (surface)     tke[0]
//!   zt[0]             ·        center 0             u[0], b[0]
//!   zu[1]          ──────────  face 1               tke[1]
//!   zt[1]             ·        center 1
//!   ...
//!   zu[nz]         ──────────  face nz (bottom)     tke[nz]
//! ```
//!
//! `dz[k]` is the thickness of layer `k` (face-to-face) and `dzt[k]` the
//! distance between the centers on either side of face `k`. At the two
//! boundary faces there is only one neighbouring center, so `dzt[0]` and
//! `dzt[nz]` are the face-to-center distances of the first and last layer.
//!
//! # Example
//!
//! ```
//! use vmix_rs::vertical::VerticalGrid;
//!
//! let grid = VerticalGrid::new(vec![10.0, 10.0, 10.0]).unwrap();
//! assert_eq!(grid.zu(), &[0.0, -10.0, -20.0, -30.0]);
//! assert_eq!(grid.zt(), &[-5.0, -15.0, -25.0]);
//! assert_eq!(grid.dzt(), &[5.0, 10.0, 10.0, 5.0]);
//! ```

use crate::config::ConfigError;

/// Vertical geometry of the column. Immutable after construction.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalGrid {
    /// Layer thicknesses, length nz.
    dz: Vec<f64>,

    /// Face depths, length nz + 1. zu[0] = 0 at the surface, decreasing downward.
    zu: Vec<f64>,

    /// Center depths, length nz.
    zt: Vec<f64>,

    /// Center-to-center spacing across each face, length nz + 1.
    dzt: Vec<f64>,
}

impl VerticalGrid {
    /// Build the grid from layer thicknesses (surface first).
    ///
    /// Thicknesses must be strictly positive and finite, which makes the
    /// face depths strictly decreasing.
    pub fn new(dz: Vec<f64>) -> Result<Self, ConfigError> {
        if dz.is_empty() {
            return Err(ConfigError::invalid("dz", 0, "grid needs at least one layer"));
        }
        if let Some((k, &bad)) = dz
            .iter()
            .enumerate()
            .find(|(_, h)| !(h.is_finite() && **h > 0.0))
        {
            return Err(ConfigError::invalid(
                format!("dz[{}]", k),
                bad,
                "layer thickness must be positive and finite",
            ));
        }

        let nz = dz.len();

        let mut zu = Vec::with_capacity(nz + 1);
        zu.push(0.0);
        for k in 0..nz {
            zu.push(zu[k] - dz[k]);
        }

        let zt: Vec<f64> = (0..nz).map(|k| 0.5 * (zu[k] + zu[k + 1])).collect();

        let mut dzt = Vec::with_capacity(nz + 1);
        dzt.push(zu[0] - zt[0]);
        for k in 1..nz {
            dzt.push(zt[k - 1] - zt[k]);
        }
        dzt.push(zt[nz - 1] - zu[nz]);

        Ok(Self { dz, zu, zt, dzt })
    }

    /// Uniform grid of `nz` layers of thickness `dz`.
    pub fn uniform(nz: usize, dz: f64) -> Result<Self, ConfigError> {
        Self::new(vec![dz; nz])
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of layers.
    #[inline]
    pub fn nz(&self) -> usize {
        self.dz.len()
    }

    /// Number of faces, `nz + 1`.
    #[inline]
    pub fn n_faces(&self) -> usize {
        self.dz.len() + 1
    }

    /// Layer thicknesses.
    #[inline]
    pub fn dz(&self) -> &[f64] {
        &self.dz
    }

    /// Face depths.
    #[inline]
    pub fn zu(&self) -> &[f64] {
        &self.zu
    }

    /// Center depths.
    #[inline]
    pub fn zt(&self) -> &[f64] {
        &self.zt
    }

    /// Center-to-center spacing across faces.
    #[inline]
    pub fn dzt(&self) -> &[f64] {
        &self.dzt
    }

    /// Total column depth (positive).
    #[inline]
    pub fn total_depth(&self) -> f64 {
        -self.zu[self.nz()]
    }

    // =========================================================================
    // Column integrals
    // =========================================================================

    /// Integrate a center field over the column: Σ f[k] dz[k].
    #[inline]
    pub fn integrate_centers(&self, field: &[f64]) -> f64 {
        field.iter().zip(&self.dz).map(|(f, h)| f * h).sum()
    }

    /// Integrate a face field over the column: Σ f[k] dzt[k].
    #[inline]
    pub fn integrate_faces(&self, field: &[f64]) -> f64 {
        field.iter().zip(&self.dzt).map(|(f, h)| f * h).sum()
    }

    /// Average a face field onto cell centers.
    pub fn faces_to_centers(&self, field: &[f64]) -> Vec<f64> {
        field.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Interpolate a center field onto interior faces; boundary faces are zero.
    pub fn centers_to_faces(&self, field: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_faces()];
        for k in 1..self.nz() {
            out[k] = 0.5 * (field[k - 1] + field[k]);
        }
        out
    }

    /// Divided difference of a center field across interior faces,
    /// `(f[k-1] - f[k]) / dzt[k]`. Boundary faces are zero.
    ///
    /// With centers ordered from the surface down, this is ∂f/∂z for
    /// z positive upward.
    pub fn vertical_derivative(&self, field: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_faces()];
        for k in 1..self.nz() {
            out[k] = (field[k - 1] - field[k]) / self.dzt[k];
        }
        out
    }

    /// Index of the layer containing depth `z` (negative below the surface).
    pub fn find_layer(&self, z: f64) -> Option<usize> {
        if z > self.zu[0] || z < self.zu[self.nz()] {
            return None;
        }
        (0..self.nz()).find(|&k| z <= self.zu[k] && z >= self.zu[k + 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_uniform_three_layers() {
        let grid = VerticalGrid::new(vec![10.0, 10.0, 10.0]).unwrap();

        assert_eq!(grid.nz(), 3);
        assert_eq!(grid.zu(), &[0.0, -10.0, -20.0, -30.0]);
        assert_eq!(grid.zt(), &[-5.0, -15.0, -25.0]);

        let dzt = grid.dzt();
        assert_eq!(dzt.len(), 4);
        assert_eq!(dzt[0], 5.0, "surface face to first center");
        assert_eq!(dzt[1], 10.0);
        assert_eq!(dzt[2], 10.0);
        assert_eq!(dzt[3], 5.0, "last center to bottom face");
    }

    #[test]
    fn test_stretched_grid_spacing_sums() {
        let dz = vec![1.0, 2.0, 4.0, 8.0];
        let grid = VerticalGrid::new(dz).unwrap();

        // Center spacings tile the column exactly like the thicknesses do
        let sum_dzt: f64 = grid.dzt().iter().sum();
        assert!((sum_dzt - grid.total_depth()).abs() < TOL);
        assert!((grid.total_depth() - 15.0).abs() < TOL);

        assert!((grid.dzt()[1] - 1.5).abs() < TOL);
        assert!((grid.dzt()[3] - 6.0).abs() < TOL);
    }

    #[test]
    fn test_face_depths_strictly_decreasing() {
        let grid = VerticalGrid::new(vec![0.5, 3.0, 1.25, 7.0, 2.0]).unwrap();
        for w in grid.zu().windows(2) {
            assert!(w[1] < w[0]);
        }
        for (k, &zt) in grid.zt().iter().enumerate() {
            assert!(zt < grid.zu()[k] && zt > grid.zu()[k + 1]);
        }
    }

    #[test]
    fn test_rejects_bad_thickness() {
        assert!(VerticalGrid::new(vec![]).is_err());
        assert!(VerticalGrid::new(vec![1.0, -1.0]).is_err());
        assert!(VerticalGrid::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_column_integrals() {
        let grid = VerticalGrid::new(vec![1.0, 2.0, 3.0]).unwrap();
        assert!((grid.integrate_centers(&[1.0, 1.0, 1.0]) - 6.0).abs() < TOL);
        assert!((grid.integrate_faces(&[1.0; 4]) - 6.0).abs() < TOL);
    }

    #[test]
    fn test_vertical_derivative_of_linear_profile() {
        let grid = VerticalGrid::new(vec![2.0, 4.0, 6.0, 8.0]).unwrap();
        // f = 3 z has ∂f/∂z = 3 everywhere
        let f: Vec<f64> = grid.zt().iter().map(|z| 3.0 * z).collect();
        let df = grid.vertical_derivative(&f);
        assert_eq!(df[0], 0.0);
        assert_eq!(df[4], 0.0);
        for &d in &df[1..4] {
            assert!((d - 3.0).abs() < TOL);
        }
    }

    #[test]
    fn test_find_layer() {
        let grid = VerticalGrid::uniform(10, 1.0).unwrap();
        assert_eq!(grid.find_layer(-0.5), Some(0));
        assert_eq!(grid.find_layer(-9.5), Some(9));
        assert_eq!(grid.find_layer(1.0), None);
        assert_eq!(grid.find_layer(-10.5), None);
    }

    #[test]
    fn test_face_center_interpolation() {
        let grid = VerticalGrid::uniform(3, 1.0).unwrap();
        assert_eq!(grid.faces_to_centers(&[0.0, 2.0, 4.0, 6.0]), vec![1.0, 3.0, 5.0]);
        assert_eq!(grid.centers_to_faces(&[1.0, 3.0, 5.0]), vec![0.0, 2.0, 4.0, 0.0]);
    }
}
