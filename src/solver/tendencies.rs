//! Named tendency decompositions for the prognostic fields.
//!
//! Each step splits the rate of change of every prognostic variable into
//! physically named contributions plus the realized total `(new - old)/Δt`.
//! The two must agree to rounding; [`MomentumTendencies::residual`] and its
//! siblings expose the difference so that it can be recorded as an error
//! budget.

use serde::{Deserialize, Serialize};

macro_rules! define_tendencies {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: Vec<f64>,
            )+
            /// Realized rate of change `(new - old) / Δt`
            pub total: Vec<f64>,
        }

        impl $name {
            /// Contribution names, in budget order.
            pub const NAMES: &'static [&'static str] = &[$(stringify!($field)),+];

            /// All contributions and the total set to zero.
            pub fn zeros(n: usize) -> Self {
                Self {
                    $($field: vec![0.0; n],)+
                    total: vec![0.0; n],
                }
            }

            /// Number of grid points.
            #[inline]
            pub fn len(&self) -> usize {
                self.total.len()
            }

            /// Whether the decomposition covers no points.
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.total.is_empty()
            }

            /// Contributions in the order of [`Self::NAMES`].
            pub fn contributions(&self) -> Vec<&[f64]> {
                vec![$(self.$field.as_slice()),+]
            }

            /// Pointwise sum of all named contributions.
            pub fn named_sum(&self) -> Vec<f64> {
                let mut sum = vec![0.0; self.len()];
                for part in self.contributions() {
                    for (s, p) in sum.iter_mut().zip(part) {
                        *s += p;
                    }
                }
                sum
            }

            /// Set the total from the field before and after the step.
            pub fn set_total(&mut self, old: &[f64], new: &[f64], dt: f64) {
                self.total = old.iter().zip(new).map(|(o, n)| (n - o) / dt).collect();
            }

            /// `total - Σ contributions` at every point.
            pub fn residual(&self) -> Vec<f64> {
                self.total
                    .iter()
                    .zip(self.named_sum())
                    .map(|(t, s)| t - s)
                    .collect()
            }

            /// Largest pointwise residual relative to the size of the terms
            /// that produced it.
            ///
            /// The reference scale at a point is `(|old| + |new|)/Δt` plus the
            /// magnitudes of all contributions, so a budget that closes to
            /// rounding yields a value near machine epsilon.
            pub fn relative_residual(&self, old: &[f64], new: &[f64], dt: f64) -> f64 {
                let residual = self.residual();
                let mut worst: f64 = 0.0;
                for k in 0..self.len() {
                    let mut scale = (old[k].abs() + new[k].abs()) / dt;
                    for part in self.contributions() {
                        scale += part[k].abs();
                    }
                    if scale > 0.0 {
                        worst = worst.max(residual[k].abs() / scale);
                    } else if residual[k] != 0.0 {
                        return f64::INFINITY;
                    }
                }
                worst
            }

            /// Combine each contribution with the matching one of `other`.
            ///
            /// The total is recomputed as the sum of the combined parts.
            pub fn combine<F>(&self, other: &Self, f: F) -> Self
            where
                F: Fn(f64, f64) -> f64,
            {
                let mut out = Self {
                    $(
                        $field: self
                            .$field
                            .iter()
                            .zip(&other.$field)
                            .map(|(&a, &b)| f(a, b))
                            .collect(),
                    )+
                    total: vec![0.0; self.len()],
                };
                out.total = out.named_sum();
                out
            }
        }
    };
}

define_tendencies! {
    /// Momentum tendencies at cell centers (m/s²), one set per component.
    MomentumTendencies {
        /// Coriolis rotation
        coriolis,
        /// Horizontal pressure gradient
        pressure_gradient,
        /// Surface wind stress, top cell only
        wind,
        /// Quadratic bottom drag and the no-slip wall, bottom cell only
        bottom_drag,
        /// Vertical viscous diffusion
        diffusion,
    }
}

define_tendencies! {
    /// Buoyancy tendencies at cell centers (m/s³).
    BuoyancyTendencies {
        /// Vertical advection by w
        advection,
        /// Relaxation towards the restoring profile
        relaxation,
        /// Surface buoyancy flux, top cell only
        surface_flux,
        /// Vertical eddy diffusion
        diffusion,
    }
}

define_tendencies! {
    /// TKE tendencies at cell faces (m²/s³).
    TkeTendencies {
        /// Buoyancy production `-kv N²`
        buoyancy_production,
        /// Shear production `Av (uz² + vz²)`
        shear_production,
        /// Dissipation `-c_ε √e e / L`
        dissipation,
        /// Vertical TKE diffusion
        diffusion,
        /// Correction from clamping TKE to its floor
        background,
    }
}

impl MomentumTendencies {
    /// Explicit forcing without diffusion: Coriolis, pressure gradient,
    /// wind and bottom drag.
    pub fn forcing_sum(&self) -> Vec<f64> {
        (0..self.len())
            .map(|k| {
                self.coriolis[k] + self.pressure_gradient[k] + self.wind[k] + self.bottom_drag[k]
            })
            .collect()
    }
}

impl BuoyancyTendencies {
    /// Explicit forcing without diffusion.
    pub fn forcing_sum(&self) -> Vec<f64> {
        (0..self.len())
            .map(|k| self.advection[k] + self.relaxation[k] + self.surface_flux[k])
            .collect()
    }
}

impl TkeTendencies {
    /// Production terms `bpr + spr`.
    pub fn production(&self) -> Vec<f64> {
        self.buoyancy_production
            .iter()
            .zip(&self.shear_production)
            .map(|(b, s)| b + s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_follow_declaration_order() {
        assert_eq!(
            MomentumTendencies::NAMES,
            &["coriolis", "pressure_gradient", "wind", "bottom_drag", "diffusion"]
        );
        assert_eq!(TkeTendencies::NAMES.len(), 5);
        assert_eq!(BuoyancyTendencies::zeros(3).contributions().len(), 4);
    }

    #[test]
    fn test_closed_budget_has_no_residual() {
        let mut t = BuoyancyTendencies::zeros(2);
        t.surface_flux = vec![1e-7, 0.0];
        t.diffusion = vec![-4e-8, 4e-8];

        let old = [0.01, 0.02];
        let dt = 100.0;
        let new: Vec<f64> = old.iter().zip(t.named_sum()).map(|(o, s)| o + dt * s).collect();
        t.set_total(&old, &new, dt);

        assert!(t.residual().iter().all(|r| r.abs() < 1e-17));
        assert!(t.relative_residual(&old, &new, dt) < 1e-12);
    }

    #[test]
    fn test_missing_term_shows_up_in_residual() {
        let mut t = MomentumTendencies::zeros(3);
        t.wind[0] = 1e-5;
        t.total = vec![2e-5, 0.0, 0.0];

        let r = t.residual();
        assert!((r[0] - 1e-5).abs() < 1e-20);
        assert!(t.relative_residual(&[0.0; 3], &[0.0; 3], 1.0) > 0.3);
    }

    #[test]
    fn test_unbalanced_zero_scale_is_infinite() {
        let mut t = TkeTendencies::zeros(1);
        t.total = vec![1.0];
        // Contributions and fields all zero, total nonzero
        let r = t.relative_residual(&[0.0], &[0.0], 1.0);
        assert!(r > 0.0);
    }

    #[test]
    fn test_combine_recomputes_total() {
        let mut now = TkeTendencies::zeros(2);
        now.shear_production = vec![2.0, 4.0];
        let mut before = TkeTendencies::zeros(2);
        before.shear_production = vec![1.0, 1.0];
        before.dissipation = vec![-1.0, -1.0];

        let combined = now.combine(&before, |a, b| 1.5 * a - 0.5 * b);
        assert_eq!(combined.shear_production, vec![2.5, 5.5]);
        assert_eq!(combined.dissipation, vec![0.5, 0.5]);
        assert_eq!(combined.total, vec![3.0, 6.0]);
        assert!(combined.residual().iter().all(|r| *r == 0.0));
    }

    #[test]
    fn test_forcing_sums() {
        let mut m = MomentumTendencies::zeros(2);
        m.coriolis = vec![1.0, 0.0];
        m.wind = vec![2.0, 0.0];
        m.diffusion = vec![100.0, 100.0];
        assert_eq!(m.forcing_sum(), vec![3.0, 0.0]);

        let mut t = TkeTendencies::zeros(1);
        t.buoyancy_production = vec![-1.0];
        t.shear_production = vec![3.0];
        assert_eq!(t.production(), vec![2.0]);
    }
}
