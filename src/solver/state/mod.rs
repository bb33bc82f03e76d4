//! Column state types.
//!
//! - [`ColumnState`]: prognostic fields and mixing coefficients
//! - [`FieldName`]: field identifiers for diagnostics and errors

mod column;

pub use column::{ColumnState, FieldName};
