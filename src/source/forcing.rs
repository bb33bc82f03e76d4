//! Capability traits for surface forcing.
//!
//! The column model asks its forcing collaborators for scalar values at the
//! start of every step. Both traits are implemented for plain closures, so
//! ad-hoc forcing needs no wrapper type:
//!
//! ```
//! use vmix_rs::source::{BuoyancyForcing, WindForcing};
//!
//! let wind = |t: f64| (1e-4 * (t / 86400.0).min(1.0), 0.0);
//! assert_eq!(wind.evaluate(0.0), (0.0, 0.0));
//!
//! let cooling = |_t: f64| -100.0;
//! assert_eq!(cooling.evaluate(3600.0), -100.0);
//! ```

/// Surface momentum forcing.
pub trait WindForcing: Send + Sync {
    /// Kinematic surface stress `(τx, τy) / ρ₀` in m²/s² at `time` (s).
    fn evaluate(&self, time: f64) -> (f64, f64);

    /// Name of this forcing for logging.
    fn name(&self) -> &'static str {
        "wind"
    }
}

/// Surface buoyancy forcing.
pub trait BuoyancyForcing: Send + Sync {
    /// Surface heat flux in W/m² at `time` (s), positive into the ocean.
    fn evaluate(&self, time: f64) -> f64;

    /// Name of this forcing for logging.
    fn name(&self) -> &'static str {
        "heat_flux"
    }
}

impl<F> WindForcing for F
where
    F: Fn(f64) -> (f64, f64) + Send + Sync,
{
    fn evaluate(&self, time: f64) -> (f64, f64) {
        self(time)
    }

    fn name(&self) -> &'static str {
        "wind_fn"
    }
}

impl<F> BuoyancyForcing for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, time: f64) -> f64 {
        self(time)
    }

    fn name(&self) -> &'static str {
        "heat_flux_fn"
    }
}
