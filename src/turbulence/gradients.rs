//! Face-centered vertical gradients of the resolved column fields.

use crate::vertical::VerticalGrid;

/// Stratification and shear at cell faces.
///
/// Boundary faces are left at zero: no buoyancy or momentum gradient is
/// diagnosed across the surface or the bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct VerticalGradients {
    /// Buoyancy frequency squared N² = ∂b/∂z (1/s²)
    pub n2: Vec<f64>,
    /// Zonal shear ∂u/∂z (1/s)
    pub uz: Vec<f64>,
    /// Meridional shear ∂v/∂z (1/s)
    pub vz: Vec<f64>,
}

impl VerticalGradients {
    /// Divided differences of u, v and b across each interior face.
    pub fn compute(grid: &VerticalGrid, u: &[f64], v: &[f64], b: &[f64]) -> Self {
        Self {
            n2: grid.vertical_derivative(b),
            uz: grid.vertical_derivative(u),
            vz: grid.vertical_derivative(v),
        }
    }

    /// Squared shear uz² + vz² at every face.
    pub fn shear_squared(&self) -> Vec<f64> {
        self.uz
            .iter()
            .zip(&self.vz)
            .map(|(uz, vz)| uz * uz + vz * vz)
            .collect()
    }
}
