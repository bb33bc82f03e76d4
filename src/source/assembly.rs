//! Explicit source terms of the column equations.
//!
//! These fill the named contributions of the tendency sets that do not come
//! from vertical diffusion. Diffusion is added by the integrator once the
//! implicit systems are solved.

use crate::solver::tendencies::{BuoyancyTendencies, MomentumTendencies, TkeTendencies};
use crate::turbulence::VerticalGradients;
use crate::vertical::VerticalGrid;

use super::Coriolis;

/// Explicit momentum sources for both velocity components.
#[derive(Clone, Debug, PartialEq)]
pub struct MomentumSources {
    /// u tendencies with an empty diffusion part
    pub u: MomentumTendencies,
    /// v tendencies with an empty diffusion part
    pub v: MomentumTendencies,
    /// Rotated velocities from an implicit Coriolis step
    pub rotated: Option<(Vec<f64>, Vec<f64>)>,
}

/// Inputs of [`momentum_sources`] that stay fixed during a run.
#[derive(Clone, Copy, Debug)]
pub struct MomentumForcing<'a> {
    /// Coriolis term
    pub coriolis: Coriolis,
    /// ∂p/∂x at centers
    pub dpdx: &'a [f64],
    /// ∂p/∂y at centers
    pub dpdy: &'a [f64],
    /// Quadratic bottom drag coefficient
    pub bottom_drag: f64,
}

/// Quadratic drag on the bottom cell, `-C_d/dz |U| U`.
pub fn quadratic_bottom_drag(grid: &VerticalGrid, u: f64, v: f64, cd: f64) -> (f64, f64) {
    let dz = grid.dz()[grid.nz() - 1];
    let speed = (u * u + v * v).sqrt();
    (-cd / dz * speed * u, -cd / dz * speed * v)
}

/// Coriolis, pressure gradient, wind and bottom drag tendencies.
///
/// # Arguments
/// * `grid` - Column grid
/// * `u`, `v` - Velocities at the old time level
/// * `forcing` - Static momentum forcing
/// * `stress` - Kinematic surface stress (m²/s²)
/// * `dt` - Time step (s)
pub fn momentum_sources(
    grid: &VerticalGrid,
    u: &[f64],
    v: &[f64],
    forcing: &MomentumForcing<'_>,
    stress: (f64, f64),
    dt: f64,
) -> MomentumSources {
    let nz = grid.nz();
    let mut tu = MomentumTendencies::zeros(nz);
    let mut tv = MomentumTendencies::zeros(nz);

    let coriolis = forcing.coriolis.tendencies(u, v, dt);
    tu.coriolis = coriolis.du;
    tv.coriolis = coriolis.dv;

    tu.pressure_gradient = forcing.dpdx.iter().map(|p| -p).collect();
    tv.pressure_gradient = forcing.dpdy.iter().map(|p| -p).collect();

    let dz0 = grid.dz()[0];
    tu.wind[0] = stress.0 / dz0;
    tv.wind[0] = stress.1 / dz0;

    let (du, dv) = quadratic_bottom_drag(grid, u[nz - 1], v[nz - 1], forcing.bottom_drag);
    tu.bottom_drag[nz - 1] = du;
    tv.bottom_drag[nz - 1] = dv;

    MomentumSources {
        u: tu,
        v: tv,
        rotated: coriolis.rotated,
    }
}

/// Vertical advection `-∂(w b)/∂z` in flux form.
///
/// Face values are plain averages of the adjacent centers; no flux crosses
/// the surface or the bottom.
pub fn vertical_advection(grid: &VerticalGrid, b: &[f64], w: &[f64]) -> Vec<f64> {
    let nz = grid.nz();
    let mut flux = vec![0.0; nz + 1];
    for k in 1..nz {
        flux[k] = w[k] * 0.5 * (b[k - 1] + b[k]);
    }
    (0..nz)
        .map(|k| -(flux[k] - flux[k + 1]) / grid.dz()[k])
        .collect()
}

/// Inputs of [`buoyancy_sources`] that stay fixed during a run.
#[derive(Clone, Copy, Debug)]
pub struct BuoyancyForcingProfiles<'a> {
    /// Restoring profile at centers
    pub b0: &'a [f64],
    /// Restoring rate (1/s)
    pub lam_b: f64,
    /// Heat flux to buoyancy flux factor `g α / (ρ₀ c_p)`
    pub heat_to_buoyancy: f64,
}

/// Advection, relaxation and surface flux tendencies of buoyancy.
///
/// # Arguments
/// * `grid` - Column grid
/// * `b` - Buoyancy at the old time level
/// * `w` - Vertical velocity at faces
/// * `forcing` - Static buoyancy forcing
/// * `heat_flux` - Surface heat flux (W/m²)
pub fn buoyancy_sources(
    grid: &VerticalGrid,
    b: &[f64],
    w: &[f64],
    forcing: &BuoyancyForcingProfiles<'_>,
    heat_flux: f64,
) -> BuoyancyTendencies {
    let mut tb = BuoyancyTendencies::zeros(grid.nz());
    tb.advection = vertical_advection(grid, b, w);
    tb.relaxation = forcing
        .b0
        .iter()
        .zip(b)
        .map(|(target, b)| forcing.lam_b * (target - b))
        .collect();
    tb.surface_flux[0] = forcing.heat_to_buoyancy / grid.dz()[0] * heat_flux;
    tb
}

/// Shear and buoyancy production of TKE at faces.
pub fn tke_production(kv: &[f64], av: &[f64], gradients: &VerticalGradients) -> TkeTendencies {
    let mut tt = TkeTendencies::zeros(kv.len());
    tt.buoyancy_production = kv.iter().zip(&gradients.n2).map(|(k, n2)| -k * n2).collect();
    tt.shear_production = av
        .iter()
        .zip(gradients.shear_squared())
        .map(|(a, s2)| a * s2)
        .collect();
    tt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentum_sources_place_boundary_terms() {
        let grid = VerticalGrid::uniform(4, 5.0).unwrap();
        let u = vec![0.0, 0.0, 0.0, 0.2];
        let v = vec![0.0, 0.0, 0.0, 0.0];
        let dpdx = vec![1e-6; 4];
        let dpdy = vec![0.0; 4];
        let forcing = MomentumForcing {
            coriolis: Coriolis::new(0.0, true),
            dpdx: &dpdx,
            dpdy: &dpdy,
            bottom_drag: 2e-3,
        };

        let s = momentum_sources(&grid, &u, &v, &forcing, (1e-4, -5e-5), 600.0);

        assert!((s.u.wind[0] - 2e-5).abs() < 1e-20);
        assert!(s.u.wind[1..].iter().all(|&w| w == 0.0));
        assert!((s.v.wind[0] + 1e-5).abs() < 1e-20);
        assert!(s.u.pressure_gradient.iter().all(|&p| p == -1e-6));
        assert!((s.u.bottom_drag[3] + 2e-3 / 5.0 * 0.2 * 0.2).abs() < 1e-18);
        assert_eq!(s.v.bottom_drag[3], 0.0);
        assert!(s.u.coriolis.iter().all(|&c| c == 0.0));
        assert!(s.rotated.is_some());
        assert!(s.u.diffusion.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_vertical_advection_conserves_content() {
        let grid = VerticalGrid::new(vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        let b = vec![4e-3, 3e-3, 1e-3, -2e-3];
        let w = vec![0.0, 1e-5, -2e-5, 3e-5, 0.0];

        let adv = vertical_advection(&grid, &b, &w);
        assert!(grid.integrate_centers(&adv).abs() < 1e-20);
        // Upwelling at face 1 carries the face value into the top cell
        let flux1 = 1e-5 * 0.5 * (4e-3 + 3e-3);
        let flux2 = -2e-5 * 0.5 * (3e-3 + 1e-3);
        assert!((adv[0] - flux1 / 1.0).abs() < 1e-20);
        assert!((adv[1] - (flux2 - flux1) / 2.0).abs() < 1e-20);
    }

    #[test]
    fn test_buoyancy_sources() {
        let grid = VerticalGrid::uniform(3, 2.0).unwrap();
        let b = vec![1e-3, 0.0, -1e-3];
        let b0 = vec![0.0; 3];
        let forcing = BuoyancyForcingProfiles {
            b0: &b0,
            lam_b: 1e-5,
            heat_to_buoyancy: 4.6e-10,
        };
        let tb = buoyancy_sources(&grid, &b, &[0.0; 4], &forcing, -100.0);

        assert!((tb.relaxation[0] + 1e-8).abs() < 1e-22);
        assert_eq!(tb.relaxation[1], 0.0);
        assert!((tb.relaxation[2] - 1e-8).abs() < 1e-22);
        assert!((tb.surface_flux[0] + 4.6e-10 / 2.0 * 100.0).abs() < 1e-22);
        assert_eq!(tb.surface_flux[1..], [0.0, 0.0]);
        assert!(tb.advection.iter().all(|&a| a == 0.0));
    }

    #[test]
    fn test_tke_production_signs() {
        let gradients = VerticalGradients {
            n2: vec![0.0, 1e-4, -1e-4, 0.0],
            uz: vec![0.0, 1e-2, 0.0, 0.0],
            vz: vec![0.0, 0.0, 2e-2, 0.0],
        };
        let kv = vec![0.0, 1e-3, 1e-3, 0.0];
        let av = vec![0.0, 2e-3, 2e-3, 0.0];

        let tt = tke_production(&kv, &av, &gradients);
        assert!(tt.buoyancy_production[1] < 0.0, "stable: sink");
        assert!(tt.buoyancy_production[2] > 0.0, "unstable: source");
        assert!((tt.shear_production[1] - 2e-7).abs() < 1e-20);
        assert!((tt.shear_production[2] - 8e-7).abs() < 1e-20);
    }
}
