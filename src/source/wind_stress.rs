//! Surface wind stress forcing.
//!
//! The column model takes the kinematic stress `τ / ρ₀` (m²/s²) and applies
//! it to the top cell as `τ / (ρ₀ dz[0])`. It can be given directly, or
//! derived from a 10 m wind with the bulk formula
//!
//! ```text
//! τ / ρ₀ = ρ_air C_d |U₁₀| U₁₀ / ρ₀
//! ```
//!
//! # Drag Coefficient Formulations
//!
//! - **Constant**: fixed value (typically 1.0-1.5 × 10⁻³)
//! - **Large & Pond (1981)**: 1.2×10⁻³ below 11 m/s, increasing linearly above
//! - **Wu (1982)**: C_d = (0.8 + 0.065×|U|) × 10⁻³
//! - **Smith (1988)**, **Yelland & Taylor (1996)**
//!
//! # Example
//!
//! ```
//! use vmix_rs::source::{DragCoefficient, WindForcing, WindStress};
//!
//! // Kinematic stress of 1e-4 m²/s² towards east
//! let wind = WindStress::constant(1e-4, 0.0);
//! assert_eq!(wind.evaluate(0.0), (1e-4, 0.0));
//!
//! // 10 m/s westerly through the bulk formula
//! let wind = WindStress::from_wind(10.0, 0.0).with_drag(DragCoefficient::Constant(1.2e-3));
//! let (taux, _) = wind.evaluate(0.0);
//! assert!((taux - 1.2 * 1.2e-3 * 100.0 / 1024.0).abs() < 1e-12);
//! ```

use std::f64::consts::PI;
use std::fmt;

use crate::config::PhysicalConstants;

use super::WindForcing;

/// Air density at sea level (kg/m³).
pub const RHO_AIR: f64 = 1.2;

/// Reference sea water density (kg/m³).
pub const RHO_WATER: f64 = 1024.0;

/// Drag coefficient formulation for the bulk wind stress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragCoefficient {
    /// Constant drag coefficient.
    Constant(f64),

    /// Large & Pond (1981).
    ///
    /// C_d = 1.2×10⁻³ for |U| ≤ 11 m/s,
    /// C_d = (0.49 + 0.065×|U|) × 10⁻³ above.
    #[default]
    LargePond,

    /// Wu (1982): C_d = (0.8 + 0.065×|U|) × 10⁻³
    Wu,

    /// Smith (1988): C_d = (0.61 + 0.063×|U|) × 10⁻³
    Smith,

    /// Yelland & Taylor (1996) for open ocean.
    ///
    /// C_d = 1.1×10⁻³ for |U| ≤ 6 m/s,
    /// C_d = (0.50 + 0.071×|U|) × 10⁻³ above.
    YellandTaylor,
}

impl DragCoefficient {
    /// Drag coefficient for a 10 m wind speed (m/s).
    pub fn compute(&self, wind_speed: f64) -> f64 {
        match self {
            DragCoefficient::Constant(cd) => *cd,
            DragCoefficient::LargePond => {
                if wind_speed <= 11.0 {
                    1.2e-3
                } else {
                    (0.49 + 0.065 * wind_speed) * 1e-3
                }
            }
            DragCoefficient::Wu => (0.8 + 0.065 * wind_speed) * 1e-3,
            DragCoefficient::Smith => (0.61 + 0.063 * wind_speed) * 1e-3,
            DragCoefficient::YellandTaylor => {
                if wind_speed <= 6.0 {
                    1.1e-3
                } else {
                    (0.50 + 0.071 * wind_speed) * 1e-3
                }
            }
        }
    }
}

type WindFn = Box<dyn Fn(f64) -> (f64, f64) + Send + Sync>;

enum StressField {
    /// No stress
    Calm,
    /// Constant kinematic stress
    Stress(f64, f64),
    /// Kinematic stress as a function of time
    StressFn(WindFn),
    /// Constant 10 m wind through the bulk formula
    Wind(f64, f64),
    /// Time-varying 10 m wind through the bulk formula
    WindFn(WindFn),
}

impl fmt::Debug for StressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StressField::Calm => write!(f, "Calm"),
            StressField::Stress(x, y) => write!(f, "Stress({}, {})", x, y),
            StressField::StressFn(_) => write!(f, "StressFn(...)"),
            StressField::Wind(u, v) => write!(f, "Wind({}, {})", u, v),
            StressField::WindFn(_) => write!(f, "WindFn(...)"),
        }
    }
}

/// Surface wind stress on the column.
#[derive(Debug)]
pub struct WindStress {
    field: StressField,
    drag: DragCoefficient,
    rho_air: f64,
    rho_water: f64,
    /// Stress vanishes from this time on
    cutoff: Option<f64>,
}

impl Default for WindStress {
    fn default() -> Self {
        Self::calm()
    }
}

impl WindStress {
    fn with_field(field: StressField) -> Self {
        Self {
            field,
            drag: DragCoefficient::LargePond,
            rho_air: RHO_AIR,
            rho_water: RHO_WATER,
            cutoff: None,
        }
    }

    /// No wind.
    pub fn calm() -> Self {
        Self::with_field(StressField::Calm)
    }

    /// Constant kinematic stress (m²/s²).
    pub fn constant(taux: f64, tauy: f64) -> Self {
        Self::with_field(StressField::Stress(taux, tauy))
    }

    /// Time-varying kinematic stress.
    pub fn time_varying<F>(stress_fn: F) -> Self
    where
        F: Fn(f64) -> (f64, f64) + Send + Sync + 'static,
    {
        Self::with_field(StressField::StressFn(Box::new(stress_fn)))
    }

    /// Constant 10 m wind (m/s) converted with the bulk formula.
    ///
    /// Uses Large & Pond drag by default.
    pub fn from_wind(u_10: f64, v_10: f64) -> Self {
        Self::with_field(StressField::Wind(u_10, v_10))
    }

    /// Constant 10 m wind from a meteorological direction.
    ///
    /// # Arguments
    /// * `speed` - Wind speed (m/s)
    /// * `direction` - Direction the wind blows from, degrees (0° = from north)
    pub fn from_direction(speed: f64, direction: f64) -> Self {
        let dir_rad = direction * PI / 180.0;
        Self::from_wind(-speed * dir_rad.sin(), -speed * dir_rad.cos())
    }

    /// Time-varying 10 m wind converted with the bulk formula.
    pub fn bulk_time_varying<F>(wind_fn: F, drag: DragCoefficient) -> Self
    where
        F: Fn(f64) -> (f64, f64) + Send + Sync + 'static,
    {
        Self::with_field(StressField::WindFn(Box::new(wind_fn))).with_drag(drag)
    }

    /// Wind rotating with period `period` at constant speed.
    ///
    /// A period close to the inertial period drives resonant inertial
    /// oscillations in the mixed layer.
    pub fn rotating(speed: f64, period: f64) -> Self {
        Self::bulk_time_varying(
            move |t| {
                let phase = 2.0 * PI * t / period;
                (speed * phase.cos(), -speed * phase.sin())
            },
            DragCoefficient::LargePond,
        )
    }

    /// Set drag coefficient formulation.
    pub fn with_drag(mut self, drag: DragCoefficient) -> Self {
        self.drag = drag;
        self
    }

    /// Set air density (default: 1.2 kg/m³).
    pub fn with_rho_air(mut self, rho_air: f64) -> Self {
        self.rho_air = rho_air;
        self
    }

    /// Set reference water density (default: 1024 kg/m³).
    pub fn with_rho_water(mut self, rho_water: f64) -> Self {
        self.rho_water = rho_water;
        self
    }

    /// Take drag, air density and reference density from the model constants.
    pub fn with_constants(self, physics: &PhysicalConstants) -> Self {
        self.with_drag(DragCoefficient::Constant(physics.cdrag))
            .with_rho_air(physics.rho_air)
            .with_rho_water(physics.rho0)
    }

    /// Switch the stress off from `time` (s) on.
    pub fn switched_off_at(mut self, time: f64) -> Self {
        self.cutoff = Some(time);
        self
    }

    /// Whether the stress is identically zero.
    pub fn is_calm(&self) -> bool {
        matches!(self.field, StressField::Calm)
    }

    /// Kinematic stress `(τx, τy)/ρ₀` from a 10 m wind.
    pub fn compute_stress(&self, u_10: f64, v_10: f64) -> (f64, f64) {
        let wind_speed = (u_10 * u_10 + v_10 * v_10).sqrt();
        let cd = self.drag.compute(wind_speed);
        let factor = self.rho_air * cd * wind_speed / self.rho_water;
        (factor * u_10, factor * v_10)
    }
}

impl WindForcing for WindStress {
    fn evaluate(&self, time: f64) -> (f64, f64) {
        if self.cutoff.is_some_and(|off| time >= off) {
            return (0.0, 0.0);
        }
        match &self.field {
            StressField::Calm => (0.0, 0.0),
            StressField::Stress(x, y) => (*x, *y),
            StressField::StressFn(f) => f(time),
            StressField::Wind(u, v) => self.compute_stress(*u, *v),
            StressField::WindFn(f) => {
                let (u, v) = f(time);
                self.compute_stress(u, v)
            }
        }
    }

    fn name(&self) -> &'static str {
        "wind_stress"
    }
}
