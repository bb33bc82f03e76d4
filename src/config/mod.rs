//! Model configuration.
//!
//! All static inputs of a column run live in [`ModelConfig`]: the layer
//! thicknesses, physical constants, closure constants, time stepping,
//! numerical switches, and static profile forcing. The configuration is
//! read-only once a [`ColumnModel`](crate::time::ColumnModel) has been
//! built from it.
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs to
//! list the values that differ from the defaults.
//!
//! # Example
//!
//! ```
//! use vmix_rs::config::{MixingMode, ModelConfig};
//!
//! let json = r#"{
//!     "dz": [5.0, 5.0, 5.0, 5.0],
//!     "time": { "delta_t": 600.0, "nt": 12, "lsave": 3 },
//!     "closure": { "convective_adjustment": true }
//! }"#;
//!
//! let config = ModelConfig::from_json_str(json).unwrap();
//! assert_eq!(config.nz(), 4);
//! assert_eq!(config.time.n_saves(), 4);
//! assert_eq!(config.mixing, MixingMode::Closure);
//! assert!((config.closure.cu - 0.1).abs() < 1e-15);
//! ```

mod error;

pub use error::ConfigError;

use std::f64::consts::PI;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::operators::BottomBoundary;

/// Complete configuration of a column run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Layer thicknesses from the surface downward (m).
    pub dz: Vec<f64>,
    /// Physical constants.
    pub physics: PhysicalConstants,
    /// TKE closure constants.
    pub closure: ClosureParams,
    /// How kv/Av are obtained.
    pub mixing: MixingMode,
    /// Time stepping.
    pub time: TimeConfig,
    /// Numerical switches.
    pub numerics: NumericsConfig,
    /// Static profile forcing.
    pub forcing: ProfileForcing,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dz: vec![2.0; 50],
            physics: PhysicalConstants::default(),
            closure: ClosureParams::default(),
            mixing: MixingMode::default(),
            time: TimeConfig::default(),
            numerics: NumericsConfig::default(),
            forcing: ProfileForcing::default(),
        }
    }
}

impl ModelConfig {
    /// Default configuration on the given layer thicknesses.
    pub fn new(dz: Vec<f64>) -> Self {
        Self {
            dz,
            ..Self::default()
        }
    }

    /// Uniform grid of `nz` layers of thickness `dz`.
    pub fn uniform(nz: usize, dz: f64) -> Self {
        Self::new(vec![dz; nz])
    }

    /// Set time stepping.
    pub fn with_time(mut self, delta_t: f64, nt: usize, lsave: usize) -> Self {
        self.time = TimeConfig { delta_t, nt, lsave };
        self
    }

    /// Set the mixing mode.
    pub fn with_mixing(mut self, mixing: MixingMode) -> Self {
        self.mixing = mixing;
        self
    }

    /// Set the Coriolis parameter.
    pub fn with_coriolis(mut self, fcor: f64) -> Self {
        self.physics.fcor = fcor;
        self
    }

    /// Set the bottom boundary condition for momentum.
    pub fn with_bottom(mut self, bottom: BottomBoundary) -> Self {
        self.numerics.bottom = bottom;
        self
    }

    /// Number of layers.
    #[inline]
    pub fn nz(&self) -> usize {
        self.dz.len()
    }

    /// Load and validate a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every constraint the integrator relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let nz = self.nz();
        if nz < 2 {
            return Err(ConfigError::invalid("dz", nz, "need at least two layers"));
        }
        if let Some((k, dz)) = self
            .dz
            .iter()
            .enumerate()
            .find(|(_, dz)| !(dz.is_finite() && **dz > 0.0))
        {
            return Err(ConfigError::invalid(
                format!("dz[{}]", k),
                dz,
                "layer thickness must be positive and finite",
            ));
        }

        self.time.validate()?;
        self.closure.validate()?;
        self.physics.validate()?;
        self.numerics.validate()?;

        if let MixingMode::Profile { kv, av } = &self.mixing {
            check_len("mixing.kv", kv, nz + 1)?;
            check_len("mixing.av", av, nz + 1)?;
        }

        check_optional_len("forcing.dpdx", &self.forcing.dpdx, nz)?;
        check_optional_len("forcing.dpdy", &self.forcing.dpdy, nz)?;
        check_optional_len("forcing.b0", &self.forcing.b0, nz)?;
        if !(self.forcing.lam_b.is_finite() && self.forcing.lam_b >= 0.0) {
            return Err(ConfigError::invalid(
                "forcing.lam_b",
                self.forcing.lam_b,
                "relaxation rate must be non-negative",
            ));
        }

        Ok(())
    }
}

fn check_len(key: &str, values: &[f64], expected: usize) -> Result<(), ConfigError> {
    if values.len() != expected {
        return Err(ConfigError::invalid(
            key,
            values.len(),
            format!("expected {} values", expected),
        ));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ConfigError::invalid(key, "non-finite", "values must be finite"));
    }
    Ok(())
}

fn check_optional_len(key: &str, values: &[f64], expected: usize) -> Result<(), ConfigError> {
    if values.is_empty() {
        Ok(())
    } else {
        check_len(key, values, expected)
    }
}

/// Physical constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Gravitational acceleration (m/s²)
    pub grav: f64,
    /// Thermal expansion coefficient (1/K)
    pub t_alpha: f64,
    /// Reference temperature (°C)
    pub t0: f64,
    /// Reference density (kg/m³)
    pub rho0: f64,
    /// Heat capacity of sea water (J/(kg K))
    pub cp: f64,
    /// Coriolis parameter (1/s)
    pub fcor: f64,
    /// Air-sea drag coefficient for bulk wind stress
    pub cdrag: f64,
    /// Air density (kg/m³)
    pub rho_air: f64,
    /// Quadratic bottom drag coefficient, typically 0.001-0.003
    pub bottom_drag_quadratic: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            grav: 9.81,
            t_alpha: 2e-4,
            t0: 20.0,
            rho0: 1024.0,
            cp: 4.18e3,
            fcor: 2.0 * PI / 86400.0,
            cdrag: 1.2e-3,
            rho_air: 1.2,
            bottom_drag_quadratic: 0.0,
        }
    }
}

impl PhysicalConstants {
    /// Factor converting a surface heat flux (W/m²) into a buoyancy flux (m²/s³).
    ///
    /// ```text
    /// B = g α Q / (ρ₀ c_p)
    /// ```
    #[inline]
    pub fn heat_to_buoyancy_flux(&self) -> f64 {
        self.grav * self.t_alpha / (self.rho0 * self.cp)
    }

    /// Buoyancy of water at temperature `temperature` relative to `t0`.
    #[inline]
    pub fn buoyancy_from_temperature(&self, temperature: f64) -> f64 {
        self.grav * self.t_alpha * (temperature - self.t0)
    }

    /// Temperature corresponding to buoyancy `b`.
    #[inline]
    pub fn temperature_from_buoyancy(&self, b: f64) -> f64 {
        self.t0 + b / (self.grav * self.t_alpha)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("physics.grav", self.grav),
            ("physics.rho0", self.rho0),
            ("physics.cp", self.cp),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::invalid(key, value, "must be positive"));
            }
        }
        if !self.fcor.is_finite() {
            return Err(ConfigError::invalid("physics.fcor", self.fcor, "must be finite"));
        }
        if !(self.bottom_drag_quadratic.is_finite() && self.bottom_drag_quadratic >= 0.0) {
            return Err(ConfigError::invalid(
                "physics.bottom_drag_quadratic",
                self.bottom_drag_quadratic,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Constants of the TKE closure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureParams {
    /// Diffusivity coefficient c_u
    pub cu: f64,
    /// Dissipation coefficient c_d. Read from configurations but unused;
    /// dissipation goes through `ceps`.
    pub cd: f64,
    /// TKE diffusivity multiplier α_tke
    pub alpha: f64,
    /// Dissipation coefficient c_ε
    pub ceps: f64,
    /// TKE floor (m²/s²)
    pub tke_min: f64,
    /// Minimum mixing length (m)
    pub lmix_min: f64,
    /// Background diffusivity (m²/s)
    pub kv_back: f64,
    /// Background viscosity (m²/s)
    pub av_back: f64,
    /// Replace kv by `kv_conv` where N² < 0
    pub convective_adjustment: bool,
    /// Convective diffusivity (m²/s)
    pub kv_conv: f64,
}

impl Default for ClosureParams {
    fn default() -> Self {
        Self {
            cu: 0.1,
            cd: 3.75,
            alpha: 30.0,
            ceps: 0.7,
            tke_min: 1e-6,
            lmix_min: 1e-8,
            kv_back: 0.0,
            av_back: 0.0,
            convective_adjustment: false,
            kv_conv: 1e-1,
        }
    }
}

impl ClosureParams {
    fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("closure.cu", self.cu),
            ("closure.cd", self.cd),
            ("closure.alpha", self.alpha),
            ("closure.ceps", self.ceps),
            ("closure.tke_min", self.tke_min),
            ("closure.lmix_min", self.lmix_min),
            ("closure.kv_back", self.kv_back),
            ("closure.av_back", self.av_back),
            ("closure.kv_conv", self.kv_conv),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(key, value, "must be non-negative"));
            }
        }
        Ok(())
    }
}

/// Source of the eddy diffusivity and viscosity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MixingMode {
    /// Diagnose kv/Av from the TKE closure.
    #[default]
    Closure,
    /// Use prescribed face profiles (length nz+1).
    Profile { kv: Vec<f64>, av: Vec<f64> },
}

/// Time stepping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Time step (s)
    pub delta_t: f64,
    /// Number of steps
    pub nt: usize,
    /// Save every `lsave` steps
    pub lsave: usize,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            delta_t: 1800.0,
            nt: 24 * 2 * 20,
            lsave: 2 * 3,
        }
    }
}

impl TimeConfig {
    /// Number of saved snapshots, `nt / lsave`.
    #[inline]
    pub fn n_saves(&self) -> usize {
        self.nt / self.lsave
    }

    /// Whether step `step` is a save step.
    #[inline]
    pub fn is_save_step(&self, step: usize) -> bool {
        step % self.lsave == 0
    }

    /// Simulation time at step `step`.
    #[inline]
    pub fn time_at(&self, step: usize) -> f64 {
        step as f64 * self.delta_t
    }

    /// Simulation time of every save.
    pub fn save_times(&self) -> Vec<f64> {
        (0..self.n_saves())
            .map(|i| self.delta_t * self.lsave as f64 * i as f64)
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.delta_t.is_finite() && self.delta_t > 0.0) {
            return Err(ConfigError::invalid("time.delta_t", self.delta_t, "must be positive"));
        }
        if self.nt == 0 {
            return Err(ConfigError::invalid("time.nt", self.nt, "must be positive"));
        }
        if self.lsave == 0 {
            return Err(ConfigError::invalid("time.lsave", self.lsave, "must be positive"));
        }
        if self.nt % self.lsave != 0 {
            return Err(ConfigError::invalid(
                "time.lsave",
                self.lsave,
                format!("must divide nt = {}", self.nt),
            ));
        }
        Ok(())
    }
}

/// Numerical switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericsConfig {
    /// Implicit vertical diffusion for momentum and buoyancy.
    /// When false, Adams-Bashforth 2 is used.
    pub implicit_diffusion: bool,
    /// Implicit TKE diffusion and dissipation.
    /// When false, Adams-Bashforth 2 is used.
    pub implicit_tke: bool,
    /// Exact implicit Coriolis rotation instead of the explicit f×u term.
    pub implicit_coriolis: bool,
    /// Bottom boundary condition for momentum.
    pub bottom: BottomBoundary,
    /// Adams-Bashforth stabilisation ε_AB
    pub ab_epsilon: f64,
    /// Relative tolerance of the tendency closure check
    pub budget_tolerance: f64,
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            implicit_diffusion: true,
            implicit_tke: true,
            implicit_coriolis: true,
            bottom: BottomBoundary::NoSlip,
            ab_epsilon: 0.01,
            budget_tolerance: 1e-8,
        }
    }
}

impl NumericsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ab_epsilon.is_finite() && self.ab_epsilon >= 0.0) {
            return Err(ConfigError::invalid(
                "numerics.ab_epsilon",
                self.ab_epsilon,
                "must be non-negative",
            ));
        }
        if !(self.budget_tolerance.is_finite() && self.budget_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "numerics.budget_tolerance",
                self.budget_tolerance,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Static profile forcing at cell centers.
///
/// Empty profiles stand for zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForcing {
    /// Horizontal pressure gradient ∂p/∂x (m/s²)
    pub dpdx: Vec<f64>,
    /// Horizontal pressure gradient ∂p/∂y (m/s²)
    pub dpdy: Vec<f64>,
    /// Buoyancy relaxation target (m/s²)
    pub b0: Vec<f64>,
    /// Buoyancy relaxation rate (1/s)
    pub lam_b: f64,
}

impl ProfileForcing {
    /// Expand an optional profile to length `n`.
    pub(crate) fn expand(profile: &[f64], n: usize) -> Vec<f64> {
        if profile.is_empty() {
            vec![0.0; n]
        } else {
            profile.to_vec()
        }
    }
}
