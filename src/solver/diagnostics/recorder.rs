//! Saved profiles and depth-integrated budgets of a column run.
//!
//! The recorder samples the column every `lsave` steps. Cell-center
//! quantities are integrated with `dz`, face quantities with `dzt`.
//!
//! # Kinetic energy budget
//!
//! Each momentum contribution `T` is turned into an energy rate
//! `Σ (u T_u + v T_v) dz` using the velocities after the step. The Coriolis
//! work uses the rotated velocities of the implicit step instead, for which
//! it vanishes identically. The viscous term is split into a dissipation
//! part and a flux-divergence part:
//!
//! ```text
//! u ∂z(A ∂z u) = ∂z(u A ∂z u) - A (∂z u)²
//! ```
//!
//! # Example
//!
//! ```
//! use vmix_rs::config::ModelConfig;
//! use vmix_rs::time::ColumnModel;
//!
//! let config = ModelConfig::uniform(20, 5.0).with_time(1800.0, 48, 6);
//! let mut model = ColumnModel::new(config).unwrap();
//! model.run().unwrap();
//!
//! let diagnostics = model.diagnostics();
//! assert_eq!(diagnostics.steps(), &[0, 6, 12, 18, 24, 30, 36, 42]);
//! assert_eq!(diagnostics.profiles().tke.len(), 8);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::TimeConfig;
use crate::solver::ColumnState;
use crate::solver::tendencies::{BuoyancyTendencies, MomentumTendencies, TkeTendencies};
use crate::turbulence::{MixingCoefficients, VerticalGradients};
use crate::vertical::VerticalGrid;

/// Everything one step produced that the recorder may need.
#[derive(Clone, Debug)]
pub struct StepDiagnostics {
    /// Step index, starting at 0
    pub step: usize,
    /// Model time at the start of the step (s)
    pub time: f64,
    /// Kinematic wind stress used in the step (m²/s²)
    pub stress: (f64, f64),
    /// Surface heat flux used in the step (W/m²)
    pub heat_flux: f64,
    /// Gradients at the start of the step
    pub gradients: VerticalGradients,
    /// Closure output of the step
    pub mixing: MixingCoefficients,
    /// Tendencies of u
    pub u: MomentumTendencies,
    /// Tendencies of v
    pub v: MomentumTendencies,
    /// Tendencies of b
    pub b: BuoyancyTendencies,
    /// Tendencies of TKE
    pub tke: TkeTendencies,
    /// Velocities at which the Coriolis work is evaluated
    pub coriolis_velocity: (Vec<f64>, Vec<f64>),
}

impl StepDiagnostics {
    /// Pointwise budget residuals of the step.
    pub fn residuals(&self) -> ResidualProfiles {
        ResidualProfiles {
            u: self.u.residual(),
            v: self.v.residual(),
            b: self.b.residual(),
            tke: self.tke.residual(),
        }
    }
}

/// Pointwise `total - Σ contributions` for every prognostic field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidualProfiles {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub b: Vec<f64>,
    pub tke: Vec<f64>,
}

impl ResidualProfiles {
    /// Largest absolute residual over all fields.
    pub fn max_abs(&self) -> f64 {
        [&self.u, &self.v, &self.b, &self.tke]
            .iter()
            .map(|r| max_abs(r))
            .fold(0.0, f64::max)
    }
}

/// Saved profiles, one entry per save.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSeries {
    pub u: Vec<Vec<f64>>,
    pub v: Vec<Vec<f64>>,
    pub b: Vec<Vec<f64>>,
    pub tke: Vec<Vec<f64>>,
    pub kv: Vec<Vec<f64>>,
    pub av: Vec<Vec<f64>>,
    pub lmix: Vec<Vec<f64>>,
    pub n2: Vec<Vec<f64>>,
}

/// Depth-integrated mean kinetic energy budget (m³/s³).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KineticEnergyBudget {
    pub coriolis: Vec<f64>,
    pub pressure_gradient: Vec<f64>,
    pub wind: Vec<f64>,
    pub bottom_drag: Vec<f64>,
    /// Work of the viscous term
    pub diffusion: Vec<f64>,
    /// Viscous dissipation `-Av (uz² + vz²)`, averaged to centers
    pub dissipation: Vec<f64>,
    /// Viscous flux divergence, `diffusion - dissipation`
    pub flux_divergence: Vec<f64>,
    pub total: Vec<f64>,
}

/// Depth-integrated TKE budget (m³/s³).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TkeBudget {
    pub total: Vec<f64>,
    pub buoyancy_production: Vec<f64>,
    pub shear_production: Vec<f64>,
    pub dissipation: Vec<f64>,
    pub diffusion: Vec<f64>,
    pub background: Vec<f64>,
}

/// Surface forcing at the save steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForcingSeries {
    /// Surface heat flux (W/m²)
    pub heat_flux: Vec<f64>,
    /// Kinematic zonal stress (m²/s²)
    pub taux: Vec<f64>,
    /// Kinematic meridional stress (m²/s²)
    pub tauy: Vec<f64>,
}

/// Largest absolute budget residual of each field at the save steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidualSeries {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
    pub b: Vec<f64>,
    pub tke: Vec<f64>,
}

/// Column summary for progress output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnSummary {
    /// Depth-integrated mean kinetic energy (m³/s²)
    pub mean_kinetic_energy: f64,
    /// Depth-integrated TKE (m³/s²)
    pub tke_content: f64,
    /// Largest horizontal speed (m/s)
    pub max_speed: f64,
    /// Largest eddy diffusivity (m²/s)
    pub max_kv: f64,
}

impl ColumnSummary {
    /// Summarize the column.
    pub fn compute(grid: &VerticalGrid, state: &ColumnState) -> Self {
        let ke: Vec<f64> = state
            .u
            .iter()
            .zip(&state.v)
            .map(|(u, v)| 0.5 * (u * u + v * v))
            .collect();
        let max_speed = state
            .u
            .iter()
            .zip(&state.v)
            .map(|(u, v)| (u * u + v * v).sqrt())
            .fold(0.0, f64::max);
        Self {
            mean_kinetic_energy: grid.integrate_centers(&ke),
            tke_content: grid.integrate_faces(&state.tke),
            max_speed,
            max_kv: state.kv.iter().copied().fold(0.0, f64::max),
        }
    }

    /// Format as a single-line summary.
    pub fn summary_line(&self) -> String {
        format!(
            "MKE={:.4e} TKE={:.4e} |u|_max={:.3} kv_max={:.3e}",
            self.mean_kinetic_energy, self.tke_content, self.max_speed, self.max_kv
        )
    }
}

/// Records profiles and budgets every `lsave` steps.
#[derive(Clone, Debug)]
pub struct DiagnosticsRecorder {
    grid: VerticalGrid,
    time: TimeConfig,
    steps: Vec<usize>,
    profiles: ProfileSeries,
    kinetic_energy: KineticEnergyBudget,
    tke_budget: TkeBudget,
    forcing: ForcingSeries,
    residuals: ResidualSeries,
}

impl DiagnosticsRecorder {
    /// Empty recorder for a run with the given time stepping.
    pub fn new(grid: VerticalGrid, time: TimeConfig) -> Self {
        Self {
            grid,
            time,
            steps: Vec::new(),
            profiles: ProfileSeries::default(),
            kinetic_energy: KineticEnergyBudget::default(),
            tke_budget: TkeBudget::default(),
            forcing: ForcingSeries::default(),
            residuals: ResidualSeries::default(),
        }
    }

    /// Whether `step` is sampled.
    #[inline]
    pub fn is_save_step(&self, step: usize) -> bool {
        self.time.is_save_step(step)
    }

    /// Number of saves in a complete run.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.time.n_saves()
    }

    /// Number of saves recorded so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether nothing has been recorded yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    // ========================================================================
    // Recording
    // ========================================================================

    /// Record the column after a step.
    ///
    /// # Arguments
    /// * `state` - Column state after the step
    /// * `diag` - What the step produced
    pub fn record(&mut self, state: &ColumnState, diag: &StepDiagnostics) {
        self.steps.push(diag.step);
        self.record_profiles(state, diag);
        self.record_kinetic_energy(state, diag);
        self.record_tke(diag);

        self.forcing.heat_flux.push(diag.heat_flux);
        self.forcing.taux.push(diag.stress.0);
        self.forcing.tauy.push(diag.stress.1);

        let residuals = diag.residuals();
        self.residuals.u.push(max_abs(&residuals.u));
        self.residuals.v.push(max_abs(&residuals.v));
        self.residuals.b.push(max_abs(&residuals.b));
        self.residuals.tke.push(max_abs(&residuals.tke));
    }

    fn record_profiles(&mut self, state: &ColumnState, diag: &StepDiagnostics) {
        let p = &mut self.profiles;
        p.u.push(state.u.clone());
        p.v.push(state.v.clone());
        p.b.push(state.b.clone());
        p.tke.push(state.tke.clone());
        p.kv.push(state.kv.clone());
        p.av.push(state.av.clone());
        p.lmix.push(diag.mixing.lmix.clone());
        p.n2.push(diag.gradients.n2.clone());
    }

    fn record_kinetic_energy(&mut self, state: &ColumnState, diag: &StepDiagnostics) {
        let grid = &self.grid;
        let (u, v) = (&state.u, &state.v);
        let work = |tu: &[f64], tv: &[f64]| -> f64 {
            let density: Vec<f64> = (0..grid.nz()).map(|k| u[k] * tu[k] + v[k] * tv[k]).collect();
            grid.integrate_centers(&density)
        };

        let (uc, vc) = &diag.coriolis_velocity;
        let coriolis: Vec<f64> = (0..grid.nz())
            .map(|k| uc[k] * diag.u.coriolis[k] + vc[k] * diag.v.coriolis[k])
            .collect();

        let shear_dissipation: Vec<f64> = diag
            .mixing
            .av
            .iter()
            .zip(diag.gradients.shear_squared())
            .map(|(a, s2)| -a * s2)
            .collect();
        let dissipation_centers = grid.faces_to_centers(&shear_dissipation);
        let flux_divergence: Vec<f64> = (0..grid.nz())
            .map(|k| {
                u[k] * diag.u.diffusion[k] + v[k] * diag.v.diffusion[k] - dissipation_centers[k]
            })
            .collect();

        let ke = &mut self.kinetic_energy;
        ke.coriolis.push(grid.integrate_centers(&coriolis));
        ke.pressure_gradient.push(work(&diag.u.pressure_gradient, &diag.v.pressure_gradient));
        ke.wind.push(work(&diag.u.wind, &diag.v.wind));
        ke.bottom_drag.push(work(&diag.u.bottom_drag, &diag.v.bottom_drag));
        ke.diffusion.push(work(&diag.u.diffusion, &diag.v.diffusion));
        ke.dissipation.push(grid.integrate_centers(&dissipation_centers));
        ke.flux_divergence.push(grid.integrate_centers(&flux_divergence));
        ke.total.push(work(&diag.u.total, &diag.v.total));
    }

    fn record_tke(&mut self, diag: &StepDiagnostics) {
        let grid = &self.grid;
        let t = &diag.tke;
        let budget = &mut self.tke_budget;
        budget.total.push(grid.integrate_faces(&t.total));
        budget.buoyancy_production.push(grid.integrate_faces(&t.buoyancy_production));
        budget.shear_production.push(grid.integrate_faces(&t.shear_production));
        budget.dissipation.push(grid.integrate_faces(&t.dissipation));
        budget.diffusion.push(grid.integrate_faces(&t.diffusion));
        budget.background.push(grid.integrate_faces(&t.background));
    }

    /// Drop every save taken at or after `step`.
    ///
    /// Used when the model is rewound to a checkpoint.
    pub fn truncate_from(&mut self, step: usize) {
        let keep = self.steps.iter().take_while(|&&s| s < step).count();
        self.steps.truncate(keep);

        let p = &mut self.profiles;
        for series in [
            &mut p.u, &mut p.v, &mut p.b, &mut p.tke, &mut p.kv, &mut p.av, &mut p.lmix, &mut p.n2,
        ] {
            series.truncate(keep);
        }

        let ke = &mut self.kinetic_energy;
        let t = &mut self.tke_budget;
        let f = &mut self.forcing;
        let r = &mut self.residuals;
        for series in [
            &mut ke.coriolis,
            &mut ke.pressure_gradient,
            &mut ke.wind,
            &mut ke.bottom_drag,
            &mut ke.diffusion,
            &mut ke.dissipation,
            &mut ke.flux_divergence,
            &mut ke.total,
            &mut t.total,
            &mut t.buoyancy_production,
            &mut t.shear_production,
            &mut t.dissipation,
            &mut t.diffusion,
            &mut t.background,
            &mut f.heat_flux,
            &mut f.taux,
            &mut f.tauy,
            &mut r.u,
            &mut r.v,
            &mut r.b,
            &mut r.tke,
        ] {
            series.truncate(keep);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Steps at which the column was sampled.
    #[inline]
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Model times of the recorded saves, `Δt · lsave · i` (s).
    pub fn times(&self) -> Vec<f64> {
        self.steps.iter().map(|&s| self.time.time_at(s)).collect()
    }

    #[inline]
    pub fn profiles(&self) -> &ProfileSeries {
        &self.profiles
    }

    #[inline]
    pub fn kinetic_energy(&self) -> &KineticEnergyBudget {
        &self.kinetic_energy
    }

    #[inline]
    pub fn tke_budget(&self) -> &TkeBudget {
        &self.tke_budget
    }

    #[inline]
    pub fn forcing(&self) -> &ForcingSeries {
        &self.forcing
    }

    #[inline]
    pub fn residuals(&self) -> &ResidualSeries {
        &self.residuals
    }

    // ========================================================================
    // Derived series
    // ========================================================================

    /// `Σ ½(u² + v²) dz` at every save (m³/s²).
    pub fn mean_kinetic_energy(&self) -> Vec<f64> {
        self.profiles
            .u
            .iter()
            .zip(&self.profiles.v)
            .map(|(u, v)| {
                let ke: Vec<f64> = u.iter().zip(v).map(|(u, v)| 0.5 * (u * u + v * v)).collect();
                self.grid.integrate_centers(&ke)
            })
            .collect()
    }

    /// `Σ tke dzt` at every save (m³/s²).
    pub fn tke_content(&self) -> Vec<f64> {
        self.profiles
            .tke
            .iter()
            .map(|tke| self.grid.integrate_faces(tke))
            .collect()
    }

    /// `Σ u dz` at every save (m²/s).
    pub fn depth_integrated_u(&self) -> Vec<f64> {
        self.profiles
            .u
            .iter()
            .map(|u| self.grid.integrate_centers(u))
            .collect()
    }

    /// `Σ v dz` at every save (m²/s).
    pub fn depth_integrated_v(&self) -> Vec<f64> {
        self.profiles
            .v
            .iter()
            .map(|v| self.grid.integrate_centers(v))
            .collect()
    }

    /// `Σ b² dz` at every save.
    pub fn buoyancy_variance(&self) -> Vec<f64> {
        self.profiles
            .b
            .iter()
            .map(|b| {
                let b2: Vec<f64> = b.iter().map(|b| b * b).collect();
                self.grid.integrate_centers(&b2)
            })
            .collect()
    }
}

fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |m: f64, v| m.max(v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClosureParams, MixingMode};
    use crate::turbulence::diagnose_mixing;

    fn step_diagnostics(grid: &VerticalGrid, state: &ColumnState, step: usize) -> StepDiagnostics {
        let gradients = VerticalGradients::compute(grid, &state.u, &state.v, &state.b);
        let mixing = diagnose_mixing(
            &ClosureParams::default(),
            &MixingMode::Closure,
            grid,
            &state.tke,
            &gradients,
        );
        let nz = grid.nz();
        StepDiagnostics {
            step,
            time: 0.0,
            stress: (1e-4, 0.0),
            heat_flux: -50.0,
            gradients,
            mixing,
            u: MomentumTendencies::zeros(nz),
            v: MomentumTendencies::zeros(nz),
            b: BuoyancyTendencies::zeros(nz),
            tke: TkeTendencies::zeros(nz + 1),
            coriolis_velocity: (state.u.clone(), state.v.clone()),
        }
    }

    #[test]
    fn test_record_appends_one_entry_per_series() {
        let grid = VerticalGrid::uniform(4, 2.0).unwrap();
        let time = TimeConfig {
            delta_t: 600.0,
            nt: 12,
            lsave: 4,
        };
        let mut recorder = DiagnosticsRecorder::new(grid.clone(), time);
        let state = ColumnState::for_grid(&grid);

        assert!(recorder.is_save_step(0));
        assert!(!recorder.is_save_step(3));
        assert_eq!(recorder.capacity(), 3);

        recorder.record(&state, &step_diagnostics(&grid, &state, 0));
        recorder.record(&state, &step_diagnostics(&grid, &state, 4));

        assert_eq!(recorder.len(), 2);
        assert_eq!(recorder.steps(), &[0, 4]);
        assert_eq!(recorder.times(), vec![0.0, 2400.0]);
        assert_eq!(recorder.profiles().lmix.len(), 2);
        assert_eq!(recorder.profiles().n2[0].len(), 5);
        assert_eq!(recorder.forcing().heat_flux, vec![-50.0, -50.0]);
        assert_eq!(recorder.forcing().taux, vec![1e-4, 1e-4]);
        assert_eq!(recorder.kinetic_energy().total.len(), 2);
        assert_eq!(recorder.tke_budget().background.len(), 2);
        assert_eq!(recorder.residuals().tke, vec![0.0, 0.0]);
    }

    #[test]
    fn test_kinetic_energy_work_terms() {
        let grid = VerticalGrid::uniform(2, 5.0).unwrap();
        let mut state = ColumnState::for_grid(&grid);
        state.u = vec![0.1, 0.0];
        state.v = vec![0.0, 0.2];

        let mut diag = step_diagnostics(&grid, &state, 0);
        diag.u.wind = vec![2e-5, 0.0];
        diag.v.bottom_drag = vec![0.0, -1e-6];
        diag.u.total = vec![2e-5, 0.0];
        diag.v.total = vec![0.0, -1e-6];

        let mut recorder = DiagnosticsRecorder::new(grid, TimeConfig::default());
        recorder.record(&state, &diag);

        let ke = recorder.kinetic_energy();
        assert!((ke.wind[0] - 0.1 * 2e-5 * 5.0).abs() < 1e-18);
        assert!((ke.bottom_drag[0] + 0.2 * 1e-6 * 5.0).abs() < 1e-18);
        assert!((ke.total[0] - (ke.wind[0] + ke.bottom_drag[0])).abs() < 1e-18);
        assert_eq!(ke.pressure_gradient[0], 0.0);
    }

    #[test]
    fn test_viscous_split_adds_up() {
        let grid = VerticalGrid::uniform(3, 2.0).unwrap();
        let mut state = ColumnState::for_grid(&grid);
        state.u = vec![0.3, 0.1, 0.0];
        state.tke = vec![1e-4; 4];

        let mut diag = step_diagnostics(&grid, &state, 0);
        diag.u.diffusion = vec![-1e-6, 5e-7, 5e-7];

        let mut recorder = DiagnosticsRecorder::new(grid, TimeConfig::default());
        recorder.record(&state, &diag);

        let ke = recorder.kinetic_energy();
        assert!(ke.dissipation[0] < 0.0);
        assert!((ke.diffusion[0] - ke.dissipation[0] - ke.flux_divergence[0]).abs() < 1e-15);
    }

    #[test]
    fn test_derived_series() {
        let grid = VerticalGrid::new(vec![1.0, 3.0]).unwrap();
        let mut state = ColumnState::for_grid(&grid);
        state.u = vec![1.0, 2.0];
        state.v = vec![0.0, 1.0];
        state.b = vec![0.5, -0.5];
        state.tke = vec![1.0, 1.0, 1.0];

        let mut recorder = DiagnosticsRecorder::new(grid.clone(), TimeConfig::default());
        recorder.record(&state, &step_diagnostics(&grid, &state, 0));

        assert_eq!(recorder.mean_kinetic_energy(), vec![0.5 * 1.0 + 0.5 * 5.0 * 3.0]);
        assert_eq!(recorder.depth_integrated_u(), vec![7.0]);
        assert_eq!(recorder.depth_integrated_v(), vec![3.0]);
        assert_eq!(recorder.buoyancy_variance(), vec![0.25 + 0.75]);
        assert_eq!(recorder.tke_content(), vec![4.0]);
    }

    #[test]
    fn test_truncate_from_drops_later_saves() {
        let grid = VerticalGrid::uniform(3, 2.0).unwrap();
        let time = TimeConfig {
            delta_t: 60.0,
            nt: 12,
            lsave: 4,
        };
        let mut recorder = DiagnosticsRecorder::new(grid.clone(), time);
        let state = ColumnState::for_grid(&grid);
        for step in [0, 4, 8] {
            recorder.record(&state, &step_diagnostics(&grid, &state, step));
        }

        recorder.truncate_from(5);
        assert_eq!(recorder.steps(), &[0, 4]);
        assert_eq!(recorder.profiles().u.len(), 2);
        assert_eq!(recorder.kinetic_energy().total.len(), 2);
        assert_eq!(recorder.tke_budget().background.len(), 2);
        assert_eq!(recorder.forcing().tauy.len(), 2);
        assert_eq!(recorder.residuals().b.len(), 2);

        recorder.truncate_from(0);
        assert!(recorder.is_empty());
        assert!(recorder.profiles().n2.is_empty());
    }

    #[test]
    fn test_summary_line() {
        let grid = VerticalGrid::uniform(2, 1.0).unwrap();
        let mut state = ColumnState::for_grid(&grid);
        state.u = vec![0.3, 0.0];
        state.v = vec![0.4, 0.0];
        let summary = ColumnSummary::compute(&grid, &state);
        assert!((summary.max_speed - 0.5).abs() < 1e-15);
        assert!(summary.summary_line().starts_with("MKE="));
    }
}
