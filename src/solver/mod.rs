//! Column solver components.
//!
//! # Submodules
//!
//! - [`state`]: Column fields (ColumnState, FieldName)
//! - [`tendencies`]: Named tendency decompositions and their budgets
//! - [`diagnostics`]: Profile and budget recording at the save cadence
//! - `tridiagonal`: Thomas algorithm for the implicit vertical solves

pub mod diagnostics;
pub mod state;
pub mod tendencies;
mod tridiagonal;

pub use state::{ColumnState, FieldName};
pub use tridiagonal::{SolveError, TridiagonalSystem, solve_tridiagonal};
