//! Time stepping schemes of the column model.
//!
//! Vertical diffusion, and everything coupled to it, is advanced either
//! with backward Euler (one tridiagonal solve per field) or with a
//! stabilised second-order Adams-Bashforth step:
//!
//! ```text
//! φ(n+1) = φ(n) + Δt [(3/2 + ε) T(n) - (1/2 + ε) T(n-1)]
//! ```
//!
//! On the first step `T(n-1) = T(n)`, which reduces the scheme to forward
//! Euler.
//!
//! # Example
//! ```
//! use vmix_rs::time::{AdamsBashforth2, IntegratorInfo};
//!
//! let ab = AdamsBashforth2::new(0.01);
//! assert_eq!(ab.order(), 2);
//! // Constant tendency: extrapolation returns it unchanged
//! assert!((ab.extrapolate(2.0, 2.0) - 2.0).abs() < 1e-15);
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// IntegratorInfo Trait
// =============================================================================

/// Information about a time stepping scheme.
pub trait IntegratorInfo: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Order of accuracy.
    fn order(&self) -> usize;

    /// Whether the scheme needs a linear solve per field.
    fn is_implicit(&self) -> bool;

    /// Number of previous tendencies the scheme keeps.
    fn history_len(&self) -> usize;
}

// =============================================================================
// Backward Euler
// =============================================================================

/// Backward Euler through the tridiagonal solver.
///
/// ```text
/// (I - Δt L) φ(n+1) = φ(n) + Δt S(n)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BackwardEuler;

impl IntegratorInfo for BackwardEuler {
    fn name(&self) -> &'static str {
        "backward-euler"
    }

    fn order(&self) -> usize {
        1
    }

    fn is_implicit(&self) -> bool {
        true
    }

    fn history_len(&self) -> usize {
        0
    }
}

// =============================================================================
// Adams-Bashforth 2
// =============================================================================

/// Stabilised second-order Adams-Bashforth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdamsBashforth2 {
    /// Stabilisation ε_AB
    pub epsilon: f64,
}

impl Default for AdamsBashforth2 {
    fn default() -> Self {
        Self { epsilon: 0.01 }
    }
}

impl AdamsBashforth2 {
    /// Create with stabilisation `epsilon`.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Weights `(3/2 + ε, 1/2 + ε)` of the current and previous tendency.
    #[inline]
    pub fn weights(&self) -> (f64, f64) {
        (1.5 + self.epsilon, 0.5 + self.epsilon)
    }

    /// Extrapolated tendency from the current and previous one.
    #[inline]
    pub fn extrapolate(&self, current: f64, previous: f64) -> f64 {
        let (w_now, w_before) = self.weights();
        w_now * current - w_before * previous
    }
}

impl IntegratorInfo for AdamsBashforth2 {
    fn name(&self) -> &'static str {
        "adams-bashforth-2"
    }

    fn order(&self) -> usize {
        2
    }

    fn is_implicit(&self) -> bool {
        false
    }

    fn history_len(&self) -> usize {
        1
    }
}

// =============================================================================
// Scheme selection
// =============================================================================

/// Scheme chosen for one group of fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepScheme {
    /// Backward Euler through the tridiagonal solver
    Implicit(BackwardEuler),
    /// Adams-Bashforth 2 on all tendencies
    Explicit(AdamsBashforth2),
}

impl StepScheme {
    /// Scheme for an `implicit` switch.
    pub fn from_switch(implicit: bool, epsilon: f64) -> Self {
        if implicit {
            StepScheme::Implicit(BackwardEuler)
        } else {
            StepScheme::Explicit(AdamsBashforth2::new(epsilon))
        }
    }
}

impl IntegratorInfo for StepScheme {
    fn name(&self) -> &'static str {
        match self {
            StepScheme::Implicit(s) => s.name(),
            StepScheme::Explicit(s) => s.name(),
        }
    }

    fn order(&self) -> usize {
        match self {
            StepScheme::Implicit(s) => s.order(),
            StepScheme::Explicit(s) => s.order(),
        }
    }

    fn is_implicit(&self) -> bool {
        matches!(self, StepScheme::Implicit(_))
    }

    fn history_len(&self) -> usize {
        match self {
            StepScheme::Implicit(s) => s.history_len(),
            StepScheme::Explicit(s) => s.history_len(),
        }
    }
}
