//! Time integration of the column.
//!
//! - [`ColumnModel`]: owns the state and steps it through `nt` steps
//! - [`StepScheme`]: backward Euler or Adams-Bashforth 2 per field group
//! - [`Checkpoint`]: serde snapshot for stopping and resuming a run

mod column_model;
mod error;
mod integrator;

pub use column_model::{Checkpoint, ColumnModel, TendencyHistory};
pub use error::IntegrationError;
pub use integrator::{AdamsBashforth2, BackwardEuler, IntegratorInfo, StepScheme};
