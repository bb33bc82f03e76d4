//! Coriolis term for the column momentum equations.
//!
//! ```text
//! ∂u/∂t =  f v
//! ∂v/∂t = -f u
//! ```
//!
//! The implicit form solves the rotation exactly over one step,
//!
//! ```text
//! u' = (u + f Δt v) / (1 + f² Δt²)
//! v' = (v - f Δt u) / (1 + f² Δt²)
//! ```
//!
//! and books `(u' - u)/Δt` as the Coriolis tendency. It damps inertial
//! oscillations slightly but is stable for any `f Δt`. The explicit form
//! evaluates `f v` and `-f u` at the old time level.

/// Angular velocity of the Earth (rad/s).
pub const EARTH_ROTATION: f64 = 7.2921e-5;

/// Coriolis parameter `f = 2Ω sin φ` at `latitude` (degrees).
pub fn coriolis_parameter(latitude: f64) -> f64 {
    2.0 * EARTH_ROTATION * latitude.to_radians().sin()
}

/// Inertial period `2π / |f|` (s), infinite for `f = 0`.
pub fn inertial_period(f: f64) -> f64 {
    if f == 0.0 {
        f64::INFINITY
    } else {
        2.0 * std::f64::consts::PI / f.abs()
    }
}

/// Velocities after an implicit Coriolis rotation over `dt`.
pub fn implicit_coriolis(u: &[f64], v: &[f64], f: f64, dt: f64) -> (Vec<f64>, Vec<f64>) {
    let fdt = f * dt;
    let denom = fdt * fdt + 1.0;
    let u_new = u.iter().zip(v).map(|(u, v)| (u + fdt * v) / denom).collect();
    let v_new = u.iter().zip(v).map(|(u, v)| (v - fdt * u) / denom).collect();
    (u_new, v_new)
}

/// Explicit Coriolis tendencies `(f v, -f u)`.
pub fn explicit_coriolis(u: &[f64], v: &[f64], f: f64) -> (Vec<f64>, Vec<f64>) {
    (
        v.iter().map(|v| f * v).collect(),
        u.iter().map(|u| -f * u).collect(),
    )
}

/// Coriolis tendencies over one step.
#[derive(Clone, Debug, PartialEq)]
pub struct CoriolisUpdate {
    /// Tendency of u (m/s²)
    pub du: Vec<f64>,
    /// Tendency of v (m/s²)
    pub dv: Vec<f64>,
    /// Rotated velocities of the implicit form
    pub rotated: Option<(Vec<f64>, Vec<f64>)>,
}

/// f-plane Coriolis term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coriolis {
    /// Coriolis parameter (1/s)
    pub f: f64,
    /// Rotate implicitly instead of using the old-time tendency
    pub implicit: bool,
}

impl Coriolis {
    /// Create a Coriolis term.
    pub fn new(f: f64, implicit: bool) -> Self {
        Self { f, implicit }
    }

    /// Tendencies over one step of length `dt`.
    ///
    /// Only the implicit form carries the rotated velocities; they are the
    /// velocities at which the Coriolis work is evaluated.
    pub fn tendencies(&self, u: &[f64], v: &[f64], dt: f64) -> CoriolisUpdate {
        if self.implicit {
            let (ur, vr) = implicit_coriolis(u, v, self.f, dt);
            CoriolisUpdate {
                du: ur.iter().zip(u).map(|(n, o)| (n - o) / dt).collect(),
                dv: vr.iter().zip(v).map(|(n, o)| (n - o) / dt).collect(),
                rotated: Some((ur, vr)),
            }
        } else {
            let (du, dv) = explicit_coriolis(u, v, self.f);
            CoriolisUpdate {
                du,
                dv,
                rotated: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coriolis_parameter() {
        assert_eq!(coriolis_parameter(0.0), 0.0);
        let f60 = coriolis_parameter(60.0);
        assert!((f60 - 1.263e-4).abs() < 1e-7);
        assert!(coriolis_parameter(-45.0) < 0.0);
        assert!((inertial_period(2.0 * std::f64::consts::PI / 86400.0) - 86400.0).abs() < 1e-9);
        assert!(inertial_period(0.0).is_infinite());
    }

    #[test]
    fn test_implicit_rotation_never_gains_energy() {
        let f = 1e-4;
        let (u, v) = (vec![0.3, -0.1], vec![0.2, 0.5]);
        for dt in [1.0, 600.0, 1e4, 1e6] {
            let (ur, vr) = implicit_coriolis(&u, &v, f, dt);
            for k in 0..2 {
                let before = u[k] * u[k] + v[k] * v[k];
                let after = ur[k] * ur[k] + vr[k] * vr[k];
                assert!(after <= before * (1.0 + 1e-15));
            }
        }
    }

    #[test]
    fn test_implicit_matches_explicit_for_small_step() {
        let f = 1e-4;
        let dt = 1e-3;
        let (u, v) = (vec![1.0], vec![0.5]);
        let rotating = Coriolis::new(f, true);
        let update = rotating.tendencies(&u, &v, dt);
        assert!((update.du[0] - f * 0.5).abs() < 1e-10);
        assert!((update.dv[0] + f * 1.0).abs() < 1e-10);
        assert!(update.rotated.is_some());

        let explicit = Coriolis::new(f, false);
        let update = explicit.tendencies(&u, &v, dt);
        assert_eq!((update.du[0], update.dv[0]), (f * 0.5, -f));
        assert!(update.rotated.is_none());
    }

    #[test]
    fn test_no_rotation_without_f() {
        let (ur, vr) = implicit_coriolis(&[0.4], &[0.7], 0.0, 1800.0);
        assert_eq!((ur[0], vr[0]), (0.4, 0.7));
    }
}
