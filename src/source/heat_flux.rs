//! Surface heat flux forcing.
//!
//! Positive values warm the ocean. The column converts the flux to a
//! buoyancy flux with [`PhysicalConstants::heat_to_buoyancy_flux`] and
//! deposits it in the top cell.
//!
//! [`PhysicalConstants::heat_to_buoyancy_flux`]: crate::config::PhysicalConstants::heat_to_buoyancy_flux

use std::f64::consts::PI;
use std::fmt;

use super::BuoyancyForcing;

/// Seconds per day.
pub const DAY: f64 = 86400.0;

/// Surface heat flux (W/m²).
pub enum SurfaceHeatFlux {
    /// No flux
    Zero,
    /// Constant flux
    Constant(f64),
    /// `mean + amplitude sin(2π t / period)`
    Diurnal {
        mean: f64,
        amplitude: f64,
        period: f64,
    },
    /// Flux as a function of time
    TimeVarying(Box<dyn Fn(f64) -> f64 + Send + Sync>),
    /// Wrapped flux that vanishes from `at` on
    SwitchedOff {
        inner: Box<SurfaceHeatFlux>,
        at: f64,
    },
}

impl fmt::Debug for SurfaceHeatFlux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceHeatFlux::Zero => write!(f, "Zero"),
            SurfaceHeatFlux::Constant(q) => write!(f, "Constant({})", q),
            SurfaceHeatFlux::Diurnal {
                mean,
                amplitude,
                period,
            } => write!(f, "Diurnal({}, {}, {})", mean, amplitude, period),
            SurfaceHeatFlux::TimeVarying(_) => write!(f, "TimeVarying(...)"),
            SurfaceHeatFlux::SwitchedOff { inner, at } => {
                write!(f, "SwitchedOff({:?}, {})", inner, at)
            }
        }
    }
}

impl Default for SurfaceHeatFlux {
    fn default() -> Self {
        Self::Zero
    }
}

impl SurfaceHeatFlux {
    /// Daily cycle with zero mean and the given amplitude.
    pub fn diurnal(amplitude: f64) -> Self {
        Self::Diurnal {
            mean: 0.0,
            amplitude,
            period: DAY,
        }
    }

    /// Flux as a function of time.
    pub fn time_varying<F>(flux_fn: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::TimeVarying(Box::new(flux_fn))
    }

    /// Switch the flux off from `time` (s) on.
    pub fn switched_off_at(self, time: f64) -> Self {
        Self::SwitchedOff {
            inner: Box::new(self),
            at: time,
        }
    }
}

impl BuoyancyForcing for SurfaceHeatFlux {
    fn evaluate(&self, time: f64) -> f64 {
        match self {
            SurfaceHeatFlux::Zero => 0.0,
            SurfaceHeatFlux::Constant(q) => *q,
            SurfaceHeatFlux::Diurnal {
                mean,
                amplitude,
                period,
            } => mean + amplitude * (2.0 * PI * time / period).sin(),
            SurfaceHeatFlux::TimeVarying(f) => f(time),
            SurfaceHeatFlux::SwitchedOff { inner, at } => {
                if time >= *at {
                    0.0
                } else {
                    inner.evaluate(time)
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "surface_heat_flux"
    }
}
