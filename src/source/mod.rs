//! Forcing and explicit source terms for the column.
//!
//! Source terms are the forces that do not come from vertical diffusion:
//! - Coriolis effect
//! - Horizontal pressure gradient
//! - Wind stress at the surface
//! - Quadratic drag at the bottom
//! - Surface heat flux, buoyancy relaxation and vertical advection
//! - Shear and buoyancy production of TKE
//!
//! # Submodules
//!
//! - `forcing`: capability traits for time-dependent surface forcing
//! - `wind_stress`: kinematic and bulk-formula wind stress
//! - `heat_flux`: surface heat flux variants
//! - `coriolis`: implicit and explicit Coriolis rotation
//! - `assembly`: explicit tendency contributions per prognostic variable

mod assembly;
mod coriolis;
mod forcing;
mod heat_flux;
mod wind_stress;

pub use assembly::{
    BuoyancyForcingProfiles, MomentumForcing, MomentumSources, buoyancy_sources,
    momentum_sources, quadratic_bottom_drag, tke_production, vertical_advection,
};
pub use coriolis::{
    Coriolis, CoriolisUpdate, EARTH_ROTATION, coriolis_parameter, explicit_coriolis,
    implicit_coriolis, inertial_period,
};
pub use forcing::{BuoyancyForcing, WindForcing};
pub use heat_flux::{DAY, SurfaceHeatFlux};
pub use wind_stress::{DragCoefficient, RHO_AIR, RHO_WATER, WindStress};
