//! TKE-based diagnosis of eddy diffusivity and viscosity.
//!
//! For every face the closure combines the current TKE `e` with the local
//! stratification and shear:
//!
//! ```text
//! Ri   = N² / (uz + ε)
//! Pr   = clamp(6.6 Ri, 1, 10)
//! L    = sqrt(2 e / |N² + ε|)           (then limited, see below)
//! kv   = c_u √e L + kv_back
//! Av   = (c_u / Pr) √e L + Av_back
//! ktke = α_tke (Av[k] + Av[k+1]) / 2    (at cell centers)
//! ```
//!
//! The Richardson number divides by the zonal shear `uz` itself, not by
//! `uz² + vz²`. This is the formula the model has always used and it is
//! kept as is.
//!
//! # Mixing length limiting
//!
//! The buoyancy length scale is unbounded in unstratified water, so it is
//! capped by the distance to the boundaries. Both boundary values start at
//! zero and two scans enforce `|ΔL| ≤ dzt` between neighbouring faces:
//! first from the surface downward, then from the bottom upward. The
//! upward scan stops at face 2. Finally everything is floored at
//! `lmix_min`.

use crate::config::{ClosureParams, MixingMode};
use crate::vertical::VerticalGrid;

use super::VerticalGradients;

/// Guard against division by zero in Ri, L and the dissipation rate.
pub const EPSILON: f64 = 1e-33;

/// Output of the closure at one step.
#[derive(Clone, Debug, PartialEq)]
pub struct MixingCoefficients {
    /// Gradient Richardson number at faces
    pub richardson: Vec<f64>,
    /// Turbulent Prandtl number at faces
    pub prandtl: Vec<f64>,
    /// Mixing length at faces (m)
    pub lmix: Vec<f64>,
    /// Eddy diffusivity at faces (m²/s)
    pub kv: Vec<f64>,
    /// Eddy viscosity at faces (m²/s)
    pub av: Vec<f64>,
    /// TKE diffusivity at cell centers (m²/s)
    pub ktke: Vec<f64>,
}

/// Gradient Richardson number.
#[inline]
pub fn richardson_number(n2: f64, uz: f64) -> f64 {
    n2 / (uz + EPSILON)
}

/// Turbulent Prandtl number, `6.6 Ri` clamped to [1, 10].
///
/// An undefined Ri (NaN) maps to the stable limit 10.
#[inline]
pub fn prandtl_number(ri: f64) -> f64 {
    (6.6 * ri).min(10.0).max(1.0)
}

/// Mixing length at faces, limited by the distance to the boundaries.
///
/// # Arguments
/// * `tke` - TKE at faces
/// * `n2` - N² at faces
/// * `dzt` - Center spacing across faces
/// * `lmix_min` - Lower bound of the mixing length
pub fn mixing_length(tke: &[f64], n2: &[f64], dzt: &[f64], lmix_min: f64) -> Vec<f64> {
    let n = tke.len();
    let nz = n - 1;

    let mut lmix: Vec<f64> = tke
        .iter()
        .zip(n2)
        .map(|(e, n2)| (2.0 * e / (n2 + EPSILON).abs()).sqrt())
        .collect();

    lmix[0] = 0.0;
    lmix[nz] = 0.0;

    for k in 1..nz {
        lmix[k] = lmix[k].min(lmix[k - 1] + dzt[k - 1]);
    }
    lmix[nz] = lmix[nz].min(lmix_min + dzt[nz]);
    for k in (2..nz).rev() {
        lmix[k] = lmix[k].min(lmix[k + 1] + dzt[k]);
    }

    for l in &mut lmix {
        *l = l.max(lmix_min);
    }
    lmix
}

/// Run the closure for the current TKE and gradients.
pub fn diagnose_mixing(
    params: &ClosureParams,
    mode: &MixingMode,
    grid: &VerticalGrid,
    tke: &[f64],
    gradients: &VerticalGradients,
) -> MixingCoefficients {
    let richardson: Vec<f64> = gradients
        .n2
        .iter()
        .zip(&gradients.uz)
        .map(|(&n2, &uz)| richardson_number(n2, uz))
        .collect();
    let prandtl: Vec<f64> = richardson.iter().map(|&ri| prandtl_number(ri)).collect();

    let lmix = mixing_length(tke, &gradients.n2, grid.dzt(), params.lmix_min);

    let (mut kv, av): (Vec<f64>, Vec<f64>) = match mode {
        MixingMode::Closure => {
            let kv = tke
                .iter()
                .zip(&lmix)
                .map(|(e, l)| params.cu * e.sqrt() * l + params.kv_back)
                .collect();
            let av = tke
                .iter()
                .zip(&lmix)
                .zip(&prandtl)
                .map(|((e, l), pr)| params.cu / pr * e.sqrt() * l + params.av_back)
                .collect();
            (kv, av)
        }
        MixingMode::Profile { kv, av } => (
            kv.iter().map(|k| k + params.kv_back).collect(),
            av.iter().map(|a| a + params.av_back).collect(),
        ),
    };

    if params.convective_adjustment {
        for (k, n2) in kv.iter_mut().zip(&gradients.n2) {
            if *n2 < 0.0 {
                *k = params.kv_conv;
            }
        }
    }

    let ktke = av
        .windows(2)
        .map(|w| params.alpha * 0.5 * (w[1] + w[0]))
        .collect();

    MixingCoefficients {
        richardson,
        prandtl,
        lmix,
        kv,
        av,
        ktke,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradients_with_n2(n2: Vec<f64>) -> VerticalGradients {
        let n = n2.len();
        VerticalGradients {
            n2,
            uz: vec![0.0; n],
            vz: vec![0.0; n],
        }
    }

    #[test]
    fn test_prandtl_clamp() {
        assert_eq!(prandtl_number(-3.0), 1.0);
        assert_eq!(prandtl_number(0.0), 1.0);
        assert!((prandtl_number(1.0) - 6.6).abs() < 1e-15);
        assert_eq!(prandtl_number(1e28), 10.0);
        assert_eq!(prandtl_number(f64::NAN), 10.0);
    }

    #[test]
    fn test_richardson_uses_unsquared_shear() {
        let ri = richardson_number(1e-4, 0.01);
        assert!((ri - 1e-2).abs() < 1e-15);
        assert_eq!(richardson_number(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_mixing_length_two_pass_limiter() {
        let grid = VerticalGrid::uniform(4, 10.0).unwrap();
        let tke = vec![1e-4; 5];
        let n2 = vec![0.0; 5];
        let lmin = 1e-8;

        let l = mixing_length(&tke, &n2, grid.dzt(), lmin);

        // Unconstrained value is ~4.5e14 m; the scans cap it at the
        // distance-to-boundary bound. Face 1 is outside the upward scan.
        let expected = [lmin, 5.0, 15.0, 10.0, lmin];
        for k in 0..5 {
            assert!((l[k] - expected[k]).abs() < 1e-12, "face {}: {}", k, l[k]);
        }
        assert!(l.iter().all(|&x| x >= lmin));
    }

    #[test]
    fn test_mixing_length_stratified_interior_untouched() {
        let grid = VerticalGrid::uniform(6, 10.0).unwrap();
        let tke = vec![1e-6; 7];
        let n2 = vec![1e-4; 7];

        let l = mixing_length(&tke, &n2, grid.dzt(), 1e-8);
        let buoyancy_length = (2.0 * 1e-6 / 1e-4_f64).sqrt();
        for &lk in &l[1..6] {
            assert!((lk - buoyancy_length).abs() < 1e-14);
        }
    }

    #[test]
    fn test_mixing_length_zero_tke_hits_floor() {
        let grid = VerticalGrid::uniform(3, 1.0).unwrap();
        let l = mixing_length(&[0.0; 4], &[0.0; 4], grid.dzt(), 1e-8);
        assert_eq!(l, vec![1e-8; 4]);
    }

    #[test]
    fn test_closure_mode_coefficients() {
        let grid = VerticalGrid::uniform(3, 1.0).unwrap();
        let params = ClosureParams {
            kv_back: 1e-5,
            av_back: 2e-5,
            ..ClosureParams::default()
        };
        let tke = vec![1e-4; 4];
        let gradients = gradients_with_n2(vec![0.0, 2e-4, 2e-4, 0.0]);

        let mix = diagnose_mixing(&params, &MixingMode::Closure, &grid, &tke, &gradients);

        // Ri = 2e-4 / 1e-33 is huge, so Pr = 10 at interior faces
        assert_eq!(mix.prandtl[1], 10.0);
        assert_eq!(mix.prandtl[0], 1.0);

        let l1 = mix.lmix[1];
        assert!((l1 - 0.5).abs() < 1e-14, "capped by dzt[0] = 0.5");
        let kv1 = 0.1 * 1e-2 * l1 + 1e-5;
        let av1 = 0.1 / 10.0 * 1e-2 * l1 + 2e-5;
        assert!((mix.kv[1] - kv1).abs() < 1e-18);
        assert!((mix.av[1] - av1).abs() < 1e-18);

        assert_eq!(mix.ktke.len(), 3);
        let ktke0 = 30.0 * 0.5 * (mix.av[0] + mix.av[1]);
        assert!((mix.ktke[0] - ktke0).abs() < 1e-18);
    }

    #[test]
    fn test_profile_mode_adds_background() {
        let grid = VerticalGrid::uniform(2, 5.0).unwrap();
        let params = ClosureParams {
            kv_back: 1e-5,
            av_back: 1e-4,
            ..ClosureParams::default()
        };
        let mode = MixingMode::Profile {
            kv: vec![0.0, 1e-3, 0.0],
            av: vec![0.0, 2e-3, 0.0],
        };
        let gradients = gradients_with_n2(vec![0.0; 3]);
        let mix = diagnose_mixing(&params, &mode, &grid, &[1e-6; 3], &gradients);

        assert!((mix.kv[1] - 1.01e-3).abs() < 1e-15);
        assert!((mix.av[1] - 2.1e-3).abs() < 1e-15);
        assert_eq!(mix.kv[0], 1e-5);
    }

    #[test]
    fn test_convective_adjustment() {
        let grid = VerticalGrid::uniform(3, 1.0).unwrap();
        let params = ClosureParams {
            convective_adjustment: true,
            kv_conv: 0.25,
            ..ClosureParams::default()
        };
        let gradients = gradients_with_n2(vec![0.0, -1e-5, 1e-5, 0.0]);
        let mix = diagnose_mixing(&params, &MixingMode::Closure, &grid, &[1e-6; 4], &gradients);

        assert_eq!(mix.kv[1], 0.25);
        assert!(mix.kv[2] < 0.25);
        // Viscosity is not adjusted
        assert!(mix.av[1] < 0.25);
    }
}
