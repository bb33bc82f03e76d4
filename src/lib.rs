//! # vmix-rs
//!
//! A one-dimensional ocean mixed-layer model for a single water column.
//!
//! This crate provides:
//! - A staggered z-level column grid
//! - A TKE turbulence closure with a two-pass mixing length limiter
//! - Implicit vertical diffusion through a tridiagonal (Thomas) solver
//! - Coriolis, pressure gradient, wind stress and bottom drag forcing
//! - Surface heat flux, buoyancy relaxation and vertical advection
//! - Backward Euler and Adams-Bashforth 2 time stepping
//! - Closed budgets for momentum, buoyancy, TKE and mean kinetic energy
//!
//! # Example
//!
//! ```
//! use vmix_rs::{ColumnModel, ModelConfig, SurfaceHeatFlux, WindStress};
//!
//! let config = ModelConfig::uniform(40, 2.5).with_time(900.0, 96, 12);
//! let mut model = ColumnModel::new(config)
//!     .unwrap()
//!     .with_wind(WindStress::from_wind(10.0, 0.0))
//!     .with_buoyancy_forcing(SurfaceHeatFlux::Constant(-100.0));
//!
//! let grid = model.grid().clone();
//! model.state_mut().set_uniform_stratification(&grid, 1e-5);
//! model.run().unwrap();
//!
//! let tke = &model.diagnostics().profiles().tke;
//! assert_eq!(tke.len(), 8);
//! assert!(tke[7][1] > model.config().closure.tke_min);
//! ```

pub mod config;
pub mod operators;
pub mod solver;
pub mod source;
pub mod time;
pub mod turbulence;
pub mod vertical;

// Re-export main types for convenience
pub use config::{
    ClosureParams, ConfigError, MixingMode, ModelConfig, NumericsConfig, PhysicalConstants,
    ProfileForcing, TimeConfig,
};
pub use operators::{BottomBoundary, DiffusionOperator};
pub use solver::diagnostics::{DiagnosticsRecorder, KineticEnergyBudget, ProfileSeries, TkeBudget};
pub use solver::tendencies::{BuoyancyTendencies, MomentumTendencies, TkeTendencies};
pub use solver::{ColumnState, FieldName, SolveError, TridiagonalSystem, solve_tridiagonal};
pub use source::{
    BuoyancyForcing, DragCoefficient, SurfaceHeatFlux, WindForcing, WindStress, coriolis_parameter,
};
pub use time::{AdamsBashforth2, Checkpoint, ColumnModel, IntegrationError};
pub use turbulence::{MixingCoefficients, VerticalGradients, diagnose_mixing, mixing_length};
pub use vertical::VerticalGrid;
