//! Vertical discretization of the water column.
//!
//! The model uses a fixed z-level grid with a staggered (Lorenz-type)
//! layout: prognostic velocities and buoyancy at cell centers, turbulent
//! kinetic energy and the mixing coefficients at cell faces. See
//! [`VerticalGrid`] for the index conventions.

mod grid;

pub use grid::VerticalGrid;
