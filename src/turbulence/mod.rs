//! Turbulence closure for the column model.
//!
//! A one-equation TKE scheme: the mixing coefficients at every face are
//! diagnosed from the current turbulent kinetic energy, the stratification
//! and the shear.
//!
//! - [`VerticalGradients`]: N², ∂u/∂z and ∂v/∂z at faces
//! - [`mixing_length`]: boundary-limited mixing length
//! - [`diagnose_mixing`]: eddy diffusivity, viscosity and TKE diffusivity
//!
//! # Example
//!
//! ```
//! use vmix_rs::config::{ClosureParams, MixingMode};
//! use vmix_rs::turbulence::{VerticalGradients, diagnose_mixing};
//! use vmix_rs::vertical::VerticalGrid;
//!
//! let grid = VerticalGrid::uniform(10, 2.0).unwrap();
//! let u = vec![0.0; 10];
//! let b: Vec<f64> = grid.zt().iter().map(|z| 1e-5 * z).collect();
//! let gradients = VerticalGradients::compute(&grid, &u, &u, &b);
//!
//! let tke = vec![1e-4; 11];
//! let mixing = diagnose_mixing(
//!     &ClosureParams::default(),
//!     &MixingMode::Closure,
//!     &grid,
//!     &tke,
//!     &gradients,
//! );
//! assert_eq!(mixing.kv.len(), 11);
//! assert_eq!(mixing.ktke.len(), 10);
//! ```

mod closure;
mod gradients;

pub use closure::{
    EPSILON, MixingCoefficients, diagnose_mixing, mixing_length, prandtl_number,
    richardson_number,
};
pub use gradients::VerticalGradients;
