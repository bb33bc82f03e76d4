//! Run diagnostics of the column model.
//!
//! - [`DiagnosticsRecorder`]: profiles and budgets at a fixed save cadence
//! - [`StepDiagnostics`]: what a single step hands to the recorder
//! - [`ColumnSummary`]: one-line progress summary

mod recorder;

pub use recorder::{
    ColumnSummary, DiagnosticsRecorder, ForcingSeries, KineticEnergyBudget, ProfileSeries,
    ResidualProfiles, ResidualSeries, StepDiagnostics, TkeBudget,
};
