//! The column model: owns the state and advances it step by step.
//!
//! One step evaluates the surface forcing, runs the closure on the old
//! fields, then advances TKE, momentum and buoyancy with the configured
//! schemes. TKE is floored at `tke_min` afterwards and every tendency set
//! is closed with its realized total. The new state is committed only when
//! the whole step succeeded.
//!
//! # Example
//!
//! ```
//! use vmix_rs::config::ModelConfig;
//! use vmix_rs::source::WindStress;
//! use vmix_rs::time::ColumnModel;
//!
//! let config = ModelConfig::uniform(20, 5.0).with_time(600.0, 12, 6);
//! let mut model = ColumnModel::new(config)
//!     .unwrap()
//!     .with_wind(WindStress::constant(1e-4, 0.0));
//!
//! model.run().unwrap();
//! assert!(model.is_finished());
//! assert!(model.state().u[0] > 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, ModelConfig, ProfileForcing};
use crate::operators::{BottomBoundary, DiffusionOperator};
use crate::solver::diagnostics::{
    ColumnSummary, DiagnosticsRecorder, ResidualProfiles, StepDiagnostics,
};
use crate::solver::tendencies::{BuoyancyTendencies, MomentumTendencies, TkeTendencies};
use crate::solver::{ColumnState, FieldName};
use crate::source::{
    BuoyancyForcing, BuoyancyForcingProfiles, Coriolis, MomentumForcing, SurfaceHeatFlux,
    WindForcing, WindStress, buoyancy_sources, momentum_sources, tke_production,
};
use crate::turbulence::{EPSILON, MixingCoefficients, VerticalGradients, diagnose_mixing};
use crate::vertical::VerticalGrid;

use super::{IntegrationError, IntegratorInfo, StepScheme};

/// Raw tendencies of the previous step, kept for Adams-Bashforth.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TendencyHistory {
    pub u: MomentumTendencies,
    pub v: MomentumTendencies,
    pub b: BuoyancyTendencies,
    pub tke: TkeTendencies,
}

/// Everything needed to resume a run at `step`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Next step to be taken
    pub step: usize,
    /// Column state before that step
    pub state: ColumnState,
    /// Tendencies of the step before, if any
    pub history: Option<TendencyHistory>,
}

/// Field advanced by one scheme.
struct Advanced<T> {
    new: Vec<f64>,
    /// Tendencies that produced `new`
    realized: T,
    /// Tendencies before Adams-Bashforth extrapolation
    raw: T,
}

/// Result of a step that has not been committed yet.
struct StepOutcome {
    state: ColumnState,
    history: TendencyHistory,
    diagnostics: StepDiagnostics,
}

/// Single-column mixed-layer model.
pub struct ColumnModel {
    config: ModelConfig,
    grid: VerticalGrid,
    state: ColumnState,
    step: usize,
    wind: Box<dyn WindForcing>,
    heat_flux: Box<dyn BuoyancyForcing>,
    dpdx: Vec<f64>,
    dpdy: Vec<f64>,
    b0: Vec<f64>,
    diffusion_scheme: StepScheme,
    tke_scheme: StepScheme,
    history: Option<TendencyHistory>,
    recorder: DiagnosticsRecorder,
    last_residuals: Option<ResidualProfiles>,
}

impl ColumnModel {
    /// Build a model at rest from a validated configuration.
    ///
    /// Wind and heat flux default to zero.
    pub fn new(config: ModelConfig) -> Result<Self, IntegrationError> {
        config.validate()?;
        let grid = VerticalGrid::new(config.dz.clone())?;
        let nz = grid.nz();

        let numerics = &config.numerics;
        let diffusion_scheme =
            StepScheme::from_switch(numerics.implicit_diffusion, numerics.ab_epsilon);
        let tke_scheme = StepScheme::from_switch(numerics.implicit_tke, numerics.ab_epsilon);

        log::debug!(
            "column: {} layers, depth {:.1} m, dz {:.2}..{:.2} m",
            nz,
            grid.total_depth(),
            grid.dz().iter().copied().fold(f64::INFINITY, f64::min),
            grid.dz().iter().copied().fold(0.0, f64::max),
        );
        log::debug!(
            "schemes: diffusion {}, tke {}, coriolis {}",
            diffusion_scheme.name(),
            tke_scheme.name(),
            if numerics.implicit_coriolis { "implicit" } else { "explicit" },
        );

        Ok(Self {
            state: ColumnState::for_grid(&grid),
            recorder: DiagnosticsRecorder::new(grid.clone(), config.time),
            dpdx: ProfileForcing::expand(&config.forcing.dpdx, nz),
            dpdy: ProfileForcing::expand(&config.forcing.dpdy, nz),
            b0: ProfileForcing::expand(&config.forcing.b0, nz),
            wind: Box::new(WindStress::calm()),
            heat_flux: Box::new(SurfaceHeatFlux::Zero),
            step: 0,
            diffusion_scheme,
            tke_scheme,
            history: None,
            last_residuals: None,
            grid,
            config,
        })
    }

    /// Set the surface wind forcing.
    pub fn with_wind<W: WindForcing + 'static>(mut self, wind: W) -> Self {
        log::debug!("wind forcing: {}", wind.name());
        self.wind = Box::new(wind);
        self
    }

    /// Set the surface heat flux forcing.
    pub fn with_buoyancy_forcing<B: BuoyancyForcing + 'static>(mut self, heat_flux: B) -> Self {
        log::debug!("buoyancy forcing: {}", heat_flux.name());
        self.heat_flux = Box::new(heat_flux);
        self
    }

    /// Set the initial state.
    pub fn with_state(mut self, state: ColumnState) -> Result<Self, IntegrationError> {
        check_state_shape(&state, self.grid.nz())?;
        self.state = state;
        Ok(self)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[inline]
    pub fn state(&self) -> &ColumnState {
        &self.state
    }

    /// Mutable state, for writing initial conditions.
    #[inline]
    pub fn state_mut(&mut self) -> &mut ColumnState {
        &mut self.state
    }

    #[inline]
    pub fn grid(&self) -> &VerticalGrid {
        &self.grid
    }

    #[inline]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Index of the next step to be taken.
    #[inline]
    pub fn current_step(&self) -> usize {
        self.step
    }

    /// Model time at the start of the next step (s).
    #[inline]
    pub fn current_time(&self) -> f64 {
        self.config.time.time_at(self.step)
    }

    /// Whether all `nt` steps have been taken.
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.step >= self.config.time.nt
    }

    /// Saved profiles and budgets.
    #[inline]
    pub fn diagnostics(&self) -> &DiagnosticsRecorder {
        &self.recorder
    }

    /// Budget residual profiles of the last step.
    #[inline]
    pub fn last_residuals(&self) -> Option<&ResidualProfiles> {
        self.last_residuals.as_ref()
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Take one step.
    ///
    /// On error the state, step counter and recorder are left untouched.
    pub fn step(&mut self) -> Result<(), IntegrationError> {
        let nt = self.config.time.nt;
        if self.is_finished() {
            return Err(IntegrationError::Finished { nt });
        }
        check_state_shape(&self.state, self.grid.nz())?;

        let outcome = self.compute_step()?;
        let step = self.step;
        let dt = self.config.time.delta_t;

        let residuals = outcome.diagnostics.residuals();
        self.warn_on_residuals(step, &outcome, dt);

        self.state = outcome.state;
        self.history = Some(outcome.history);
        self.last_residuals = Some(residuals);

        if self.recorder.is_save_step(step) {
            self.recorder.record(&self.state, &outcome.diagnostics);
            let summary = ColumnSummary::compute(&self.grid, &self.state);
            log::info!(
                "step {}/{} t={:.2} d: {}",
                step,
                nt,
                outcome.diagnostics.time / 86400.0,
                summary.summary_line()
            );
        }

        self.step += 1;
        Ok(())
    }

    /// Run until all `nt` steps have been taken.
    pub fn run(&mut self) -> Result<(), IntegrationError> {
        while !self.is_finished() {
            self.step()?;
        }
        log::info!(
            "finished {} steps, {} saves",
            self.config.time.nt,
            self.recorder.len()
        );
        Ok(())
    }

    /// Take up to `n` steps, stopping early at the end of the run.
    ///
    /// Returns the number of steps taken.
    pub fn run_steps(&mut self, n: usize) -> Result<usize, IntegrationError> {
        let mut taken = 0;
        while taken < n && !self.is_finished() {
            self.step()?;
            taken += 1;
        }
        Ok(taken)
    }

    fn compute_step(&self) -> Result<StepOutcome, IntegrationError> {
        let step = self.step;
        let time_config = self.config.time;
        let dt = time_config.delta_t;
        let time = time_config.time_at(step);
        let physics = &self.config.physics;
        let nz = self.grid.nz();
        let old = &self.state;

        let stress = self.wind.evaluate(time);
        check_forcing(step, "taux", stress.0)?;
        check_forcing(step, "tauy", stress.1)?;
        let heat_flux = self.heat_flux.evaluate(time);
        check_forcing(step, "heat_flux", heat_flux)?;

        let gradients = VerticalGradients::compute(&self.grid, &old.u, &old.v, &old.b);
        let mixing = diagnose_mixing(
            &self.config.closure,
            &self.config.mixing,
            &self.grid,
            &old.tke,
            &gradients,
        );

        // TKE
        let tke = self.advance_tke(&mixing, &gradients, step, dt)?;

        // Momentum
        let momentum_forcing = MomentumForcing {
            coriolis: Coriolis::new(physics.fcor, self.config.numerics.implicit_coriolis),
            dpdx: &self.dpdx,
            dpdy: &self.dpdy,
            bottom_drag: physics.bottom_drag_quadratic,
        };
        let sources = momentum_sources(&self.grid, &old.u, &old.v, &momentum_forcing, stress, dt);
        let viscosity =
            DiffusionOperator::centers(&self.grid, &mixing.av, self.config.numerics.bottom);
        let previous = self.history.as_ref();
        let u = self.advance_velocity(
            &viscosity,
            &old.u,
            sources.u,
            previous.map(|h| &h.u),
            step,
            FieldName::U,
        )?;
        let v = self.advance_velocity(
            &viscosity,
            &old.v,
            sources.v,
            previous.map(|h| &h.v),
            step,
            FieldName::V,
        )?;

        // Buoyancy
        let buoyancy_forcing = BuoyancyForcingProfiles {
            b0: &self.b0,
            lam_b: self.config.forcing.lam_b,
            heat_to_buoyancy: physics.heat_to_buoyancy_flux(),
        };
        let tb = buoyancy_sources(&self.grid, &old.b, &old.w, &buoyancy_forcing, heat_flux);
        let diffusivity =
            DiffusionOperator::centers(&self.grid, &mixing.kv, BottomBoundary::FreeSlip);
        let b = self.advance_buoyancy(&diffusivity, &old.b, tb, previous.map(|h| &h.b), step)?;

        // Floor
        let tke_min = self.config.closure.tke_min;
        let mut tke_realized = tke.realized;
        let floored: Vec<f64> = tke
            .new
            .iter()
            .map(|&e| if e < tke_min { tke_min } else { e })
            .collect();
        for k in 0..nz + 1 {
            tke_realized.background[k] += (floored[k] - tke.new[k]) / dt;
        }

        let mut u_realized = u.realized;
        let mut v_realized = v.realized;
        let mut b_realized = b.realized;
        u_realized.set_total(&old.u, &u.new, dt);
        v_realized.set_total(&old.v, &v.new, dt);
        b_realized.set_total(&old.b, &b.new, dt);
        tke_realized.set_total(&old.tke, &floored, dt);

        let coriolis_velocity = match sources.rotated {
            Some(rotated) => rotated,
            None => (u.new.clone(), v.new.clone()),
        };

        let state = ColumnState {
            u: u.new,
            v: v.new,
            b: b.new,
            tke: floored,
            kv: mixing.kv.clone(),
            av: mixing.av.clone(),
            w: old.w.clone(),
        };
        if let Some((field, index)) = state.first_non_finite() {
            return Err(IntegrationError::NonFinite { step, field, index });
        }

        Ok(StepOutcome {
            state,
            history: TendencyHistory {
                u: u.raw,
                v: v.raw,
                b: b.raw,
                tke: tke.raw,
            },
            diagnostics: StepDiagnostics {
                step,
                time,
                stress,
                heat_flux,
                gradients,
                mixing,
                u: u_realized,
                v: v_realized,
                b: b_realized,
                tke: tke_realized,
                coriolis_velocity,
            },
        })
    }

    fn advance_tke(
        &self,
        mixing: &MixingCoefficients,
        gradients: &VerticalGradients,
        step: usize,
        dt: f64,
    ) -> Result<Advanced<TkeTendencies>, IntegrationError> {
        let old = &self.state.tke;
        let n = old.len();
        let ceps = self.config.closure.ceps;
        let op = DiffusionOperator::faces(&self.grid, &mixing.ktke);
        let mut tt = tke_production(&mixing.kv, &mixing.av, gradients);

        // Dissipation rate c_ε √e / L, zero at the boundary faces
        let mut rate = vec![0.0; n];
        for k in 1..n - 1 {
            rate[k] = ceps * old[k].sqrt() / (mixing.lmix[k] + EPSILON);
        }

        match self.tke_scheme {
            StepScheme::Implicit(_) => {
                let production = tt.production();
                let rhs = (0..n).map(|k| old[k] + dt * production[k]).collect();
                let extra: Vec<f64> = rate.iter().map(|r| dt * r).collect();
                let new = implicit_solve(&op, dt, rhs, Some(&extra), step, FieldName::Tke)?;
                tt.diffusion = op.tendency(&new);
                tt.dissipation = rate.iter().zip(&new).map(|(r, e)| -r * e).collect();
                Ok(Advanced {
                    new,
                    raw: tt.clone(),
                    realized: tt,
                })
            }
            StepScheme::Explicit(ab) => {
                tt.diffusion = op.tendency(old);
                tt.dissipation = rate.iter().zip(old).map(|(r, e)| -r * e).collect();
                let previous = self.history.as_ref().map(|h| &h.tke);
                let realized = tt.combine(previous_or(previous, &tt), |a, b| ab.extrapolate(a, b));
                Ok(Advanced {
                    new: forward(old, &realized.total, dt),
                    realized,
                    raw: tt,
                })
            }
        }
    }

    fn advance_velocity(
        &self,
        op: &DiffusionOperator,
        old: &[f64],
        mut tendencies: MomentumTendencies,
        previous: Option<&MomentumTendencies>,
        step: usize,
        field: FieldName,
    ) -> Result<Advanced<MomentumTendencies>, IntegrationError> {
        let dt = self.config.time.delta_t;
        let bottom = old.len() - 1;

        match self.diffusion_scheme {
            StepScheme::Implicit(_) => {
                let forcing = tendencies.forcing_sum();
                let rhs = (0..old.len()).map(|k| old[k] + dt * forcing[k]).collect();
                let new = implicit_solve(op, dt, rhs, None, step, field)?;
                tendencies.diffusion = op.tendency(&new);
                tendencies.bottom_drag[bottom] += op.wall_tendency(&new);
                Ok(Advanced {
                    new,
                    raw: tendencies.clone(),
                    realized: tendencies,
                })
            }
            StepScheme::Explicit(ab) => {
                tendencies.diffusion = op.tendency(old);
                tendencies.bottom_drag[bottom] += op.wall_tendency(old);
                let realized = tendencies
                    .combine(previous_or(previous, &tendencies), |a, b| ab.extrapolate(a, b));
                Ok(Advanced {
                    new: forward(old, &realized.total, dt),
                    realized,
                    raw: tendencies,
                })
            }
        }
    }

    fn advance_buoyancy(
        &self,
        op: &DiffusionOperator,
        old: &[f64],
        mut tendencies: BuoyancyTendencies,
        previous: Option<&BuoyancyTendencies>,
        step: usize,
    ) -> Result<Advanced<BuoyancyTendencies>, IntegrationError> {
        let dt = self.config.time.delta_t;

        match self.diffusion_scheme {
            StepScheme::Implicit(_) => {
                let forcing = tendencies.forcing_sum();
                let rhs = (0..old.len()).map(|k| old[k] + dt * forcing[k]).collect();
                let new = implicit_solve(op, dt, rhs, None, step, FieldName::Buoyancy)?;
                tendencies.diffusion = op.tendency(&new);
                Ok(Advanced {
                    new,
                    raw: tendencies.clone(),
                    realized: tendencies,
                })
            }
            StepScheme::Explicit(ab) => {
                tendencies.diffusion = op.tendency(old);
                let realized = tendencies
                    .combine(previous_or(previous, &tendencies), |a, b| ab.extrapolate(a, b));
                Ok(Advanced {
                    new: forward(old, &realized.total, dt),
                    realized,
                    raw: tendencies,
                })
            }
        }
    }

    fn warn_on_residuals(&self, step: usize, outcome: &StepOutcome, dt: f64) {
        let tolerance = self.config.numerics.budget_tolerance;
        let old = &self.state;
        let new = &outcome.state;
        let d = &outcome.diagnostics;
        let checks = [
            (FieldName::U, d.u.relative_residual(&old.u, &new.u, dt)),
            (FieldName::V, d.v.relative_residual(&old.v, &new.v, dt)),
            (FieldName::Buoyancy, d.b.relative_residual(&old.b, &new.b, dt)),
            (FieldName::Tke, d.tke.relative_residual(&old.tke, &new.tke, dt)),
        ];
        for (field, relative) in checks {
            if relative > tolerance {
                log::warn!(
                    "step {}: {} budget residual {:.3e} exceeds tolerance {:.1e}",
                    step,
                    field,
                    relative,
                    tolerance
                );
            }
        }
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Snapshot of the run that [`ColumnModel::restore`] can resume from.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            step: self.step,
            state: self.state.clone(),
            history: self.history.clone(),
        }
    }

    /// Rewind or advance the run to a checkpoint.
    ///
    /// Saves recorded at or after the checkpoint step are dropped.
    pub fn restore(&mut self, checkpoint: Checkpoint) -> Result<(), IntegrationError> {
        let nz = self.grid.nz();
        let nt = self.config.time.nt;
        if checkpoint.step > nt {
            return Err(IntegrationError::CheckpointMismatch {
                reason: format!("step {} is beyond nt = {}", checkpoint.step, nt),
            });
        }
        if !checkpoint.state.has_shape(nz) {
            return Err(IntegrationError::CheckpointMismatch {
                reason: format!("state has {} layers, model has {}", checkpoint.state.nz(), nz),
            });
        }
        if let Some(h) = &checkpoint.history {
            let fits = h.u.len() == nz
                && h.v.len() == nz
                && h.b.len() == nz
                && h.tke.len() == nz + 1;
            if !fits {
                return Err(IntegrationError::CheckpointMismatch {
                    reason: format!("tendency history does not fit {} layers", nz),
                });
            }
        }

        log::debug!("restoring checkpoint at step {}", checkpoint.step);
        self.recorder.truncate_from(checkpoint.step);
        self.step = checkpoint.step;
        self.state = checkpoint.state;
        self.history = checkpoint.history;
        self.last_residuals = None;
        Ok(())
    }
}

fn check_state_shape(state: &ColumnState, nz: usize) -> Result<(), ConfigError> {
    if state.has_shape(nz) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            "state",
            state.nz(),
            format!("fields must match {} layers", nz),
        ))
    }
}

fn check_forcing(step: usize, name: &'static str, value: f64) -> Result<(), IntegrationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(IntegrationError::InvalidForcing { step, name, value })
    }
}

/// Previous tendencies, or the current ones on the first step.
fn previous_or<'a, T>(previous: Option<&'a T>, current: &'a T) -> &'a T {
    previous.unwrap_or(current)
}

fn forward(old: &[f64], rate: &[f64], dt: f64) -> Vec<f64> {
    old.iter().zip(rate).map(|(o, r)| o + dt * r).collect()
}

fn implicit_solve(
    op: &DiffusionOperator,
    dt: f64,
    rhs: Vec<f64>,
    extra_diagonal: Option<&[f64]>,
    step: usize,
    field: FieldName,
) -> Result<Vec<f64>, IntegrationError> {
    let singular = |source| IntegrationError::Singular { step, field, source };
    let mut system = op.implicit_system(dt, rhs).map_err(singular)?;
    if let Some(extra) = extra_diagonal {
        system.add_to_diagonal(extra);
    }
    system.solve().map_err(singular)
}
