//! Errors raised while integrating the column.

use thiserror::Error;

use crate::config::ConfigError;
use crate::solver::{FieldName, SolveError};

/// Error that stops the time integration.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// Invalid configuration or initial state
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Implicit solve failed
    #[error("step {step}: implicit solve for {field} failed: {source}")]
    Singular {
        step: usize,
        field: FieldName,
        #[source]
        source: SolveError,
    },

    /// A forcing collaborator returned a non-finite value
    #[error("step {step}: forcing {name} is not finite ({value})")]
    InvalidForcing {
        step: usize,
        name: &'static str,
        value: f64,
    },

    /// A field became non-finite
    #[error("step {step}: {field}[{index}] is not finite")]
    NonFinite {
        step: usize,
        field: FieldName,
        index: usize,
    },

    /// All steps have been taken
    #[error("integration already finished after {nt} steps")]
    Finished { nt: usize },

    /// Checkpoint does not fit this model
    #[error("checkpoint does not match the model: {reason}")]
    CheckpointMismatch { reason: String },
}

impl IntegrationError {
    /// Step at which the error occurred, if it belongs to one.
    pub fn step(&self) -> Option<usize> {
        match self {
            IntegrationError::Singular { step, .. }
            | IntegrationError::InvalidForcing { step, .. }
            | IntegrationError::NonFinite { step, .. } => Some(*step),
            _ => None,
        }
    }
}
