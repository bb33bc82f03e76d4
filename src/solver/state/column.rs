//! Prognostic and diagnostic fields of a single water column.
//!
//! Center fields (`u`, `v`, `b`) have length nz, face fields (`tke`, `kv`,
//! `av`, `w`) have length nz + 1. Everything starts at zero; initial
//! conditions are written before the first step, after which only the time
//! integrator mutates the state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vertical::VerticalGrid;

/// Names of the column fields, used in error reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldName {
    /// Zonal velocity
    U,
    /// Meridional velocity
    V,
    /// Buoyancy
    Buoyancy,
    /// Turbulent kinetic energy
    Tke,
    /// Eddy diffusivity
    Kv,
    /// Eddy viscosity
    Av,
    /// Vertical velocity
    W,
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldName::U => "u",
            FieldName::V => "v",
            FieldName::Buoyancy => "b",
            FieldName::Tke => "tke",
            FieldName::Kv => "kv",
            FieldName::Av => "Av",
            FieldName::W => "w",
        };
        f.write_str(name)
    }
}

/// State of the water column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnState {
    /// Zonal velocity at centers (m/s)
    pub u: Vec<f64>,
    /// Meridional velocity at centers (m/s)
    pub v: Vec<f64>,
    /// Buoyancy at centers (m/s²)
    pub b: Vec<f64>,
    /// Turbulent kinetic energy at faces (m²/s²)
    pub tke: Vec<f64>,
    /// Eddy diffusivity at faces (m²/s)
    pub kv: Vec<f64>,
    /// Eddy viscosity at faces (m²/s)
    pub av: Vec<f64>,
    /// Vertical velocity at faces (m/s), positive upward
    pub w: Vec<f64>,
}

impl ColumnState {
    /// Zero state for `nz` layers.
    pub fn zeros(nz: usize) -> Self {
        Self {
            u: vec![0.0; nz],
            v: vec![0.0; nz],
            b: vec![0.0; nz],
            tke: vec![0.0; nz + 1],
            kv: vec![0.0; nz + 1],
            av: vec![0.0; nz + 1],
            w: vec![0.0; nz + 1],
        }
    }

    /// Zero state shaped for `grid`.
    pub fn for_grid(grid: &VerticalGrid) -> Self {
        Self::zeros(grid.nz())
    }

    /// Number of layers.
    #[inline]
    pub fn nz(&self) -> usize {
        self.u.len()
    }

    /// Whether every field has the length expected for `nz` layers.
    pub fn has_shape(&self, nz: usize) -> bool {
        self.u.len() == nz
            && self.v.len() == nz
            && self.b.len() == nz
            && self.tke.len() == nz + 1
            && self.kv.len() == nz + 1
            && self.av.len() == nz + 1
            && self.w.len() == nz + 1
    }

    /// Set the velocity profile from a function of center depth.
    pub fn set_velocity_from<F>(&mut self, grid: &VerticalGrid, f: F)
    where
        F: Fn(f64) -> (f64, f64),
    {
        for (k, &z) in grid.zt().iter().enumerate() {
            let (u, v) = f(z);
            self.u[k] = u;
            self.v[k] = v;
        }
    }

    /// Set the buoyancy profile from a function of center depth.
    pub fn set_buoyancy_from<F>(&mut self, grid: &VerticalGrid, f: F)
    where
        F: Fn(f64) -> f64,
    {
        for (b, &z) in self.b.iter_mut().zip(grid.zt()) {
            *b = f(z);
        }
    }

    /// Set a uniform stratification N² (1/s²), with b = 0 at the surface.
    pub fn set_uniform_stratification(&mut self, grid: &VerticalGrid, n2: f64) {
        self.set_buoyancy_from(grid, |z| n2 * z);
    }

    /// Smallest TKE value in the column.
    pub fn min_tke(&self) -> f64 {
        self.tke.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// First non-finite entry among the prognostic fields.
    pub fn first_non_finite(&self) -> Option<(FieldName, usize)> {
        [
            (FieldName::U, &self.u),
            (FieldName::V, &self.v),
            (FieldName::Buoyancy, &self.b),
            (FieldName::Tke, &self.tke),
        ]
        .into_iter()
        .find_map(|(name, field)| {
            field
                .iter()
                .position(|x| !x.is_finite())
                .map(|index| (name, index))
        })
    }
}
