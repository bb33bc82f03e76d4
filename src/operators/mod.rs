//! Discrete vertical operators.
//!
//! - [`DiffusionOperator`]: three-point `∂z(K ∂z φ)` for center and face fields
//! - [`BottomBoundary`]: no-slip or free-slip bottom for momentum

mod diffusion;

pub use diffusion::{BottomBoundary, DiffusionOperator};
