//! Tridiagonal solver against a dense LU reference.
//!
//! The Thomas algorithm must agree with a full-pivoting dense solve on the
//! backward-Euler systems the column model actually builds.

use faer::{Mat, linalg::solvers::SpSolver};
use vmix_rs::operators::{BottomBoundary, DiffusionOperator};
use vmix_rs::solver::TridiagonalSystem;
use vmix_rs::vertical::VerticalGrid;

/// Dense copy of a tridiagonal system.
fn dense(lower: &[f64], diag: &[f64], upper: &[f64]) -> Mat<f64> {
    let n = diag.len();
    let mut m = Mat::<f64>::zeros(n, n);
    for i in 0..n {
        m[(i, i)] = diag[i];
        if i > 0 {
            m[(i, i - 1)] = lower[i];
        }
        if i + 1 < n {
            m[(i, i + 1)] = upper[i];
        }
    }
    m
}

fn dense_solve(system: &TridiagonalSystem) -> Vec<f64> {
    let m = dense(&system.lower, &system.diag, &system.upper);
    let n = system.len();
    let mut rhs = Mat::<f64>::zeros(n, 1);
    for i in 0..n {
        rhs[(i, 0)] = system.rhs[i];
    }
    let x = m.as_ref().full_piv_lu().solve(&rhs);
    (0..n).map(|i| x[(i, 0)]).collect()
}

fn assert_close(a: &[f64], b: &[f64], tol: f64) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        let scale = 1.0 + x.abs().max(y.abs());
        assert!((x - y).abs() < tol * scale, "row {}: {} vs {}", i, x, y);
    }
}

/// Layers thickening with depth, 2 m at the surface.
fn stretched_grid(nz: usize) -> VerticalGrid {
    VerticalGrid::new((0..nz).map(|k| 2.0 * 1.08_f64.powi(k as i32)).collect()).unwrap()
}

#[test]
fn test_random_dominant_systems_match_dense_lu() {
    // Deterministic pseudo-random coefficients
    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        (seed >> 11) as f64 / (1u64 << 53) as f64 - 0.5
    };

    for n in [3, 5, 17, 64] {
        let lower: Vec<f64> = (0..n).map(|i| if i > 0 { next() } else { 0.0 }).collect();
        let upper: Vec<f64> = (0..n).map(|i| if i + 1 < n { next() } else { 0.0 }).collect();
        let diag: Vec<f64> = (0..n)
            .map(|i| 1.0 + lower[i].abs() + upper[i].abs() + next().abs())
            .collect();
        let rhs: Vec<f64> = (0..n).map(|_| next()).collect();

        let system = TridiagonalSystem::new(lower, diag, upper, rhs).unwrap();
        let reference = dense_solve(&system);
        let x = system.solve().unwrap();
        assert_close(&x, &reference, 1e-12);
    }
}

#[test]
fn test_momentum_system_matches_dense_lu() {
    let grid = stretched_grid(30);
    let av: Vec<f64> = grid
        .zu()
        .iter()
        .map(|z| 1e-2 * (z / 20.0).exp() + 1e-5)
        .collect();
    let rhs: Vec<f64> = grid.zt().iter().map(|z| 0.2 * (z / 15.0).exp()).collect();

    for bottom in [BottomBoundary::NoSlip, BottomBoundary::FreeSlip] {
        let op = DiffusionOperator::centers(&grid, &av, bottom);
        let system = op.implicit_system(1800.0, rhs.clone()).unwrap();
        let reference = dense_solve(&system);
        let x = system.solve().unwrap();
        assert_close(&x, &reference, 1e-11);
    }
}

#[test]
fn test_tke_system_with_dissipation_matches_dense_lu() {
    let grid = stretched_grid(25);
    let nz = grid.nz();
    let ktke: Vec<f64> = (0..nz).map(|k| 0.3 / (1.0 + k as f64)).collect();
    let op = DiffusionOperator::faces(&grid, &ktke);

    let rhs: Vec<f64> = (0..=nz).map(|k| 1e-4 / (1.0 + k as f64)).collect();
    let mut dissipation = vec![0.0; nz + 1];
    for (k, d) in dissipation.iter_mut().enumerate().take(nz).skip(1) {
        *d = 1800.0 * 1e-3 * (k as f64).sqrt();
    }

    let mut system = op.implicit_system(1800.0, rhs).unwrap();
    system.add_to_diagonal(&dissipation);
    let reference = dense_solve(&system);
    let x = system.solve().unwrap();
    assert_close(&x, &reference, 1e-11);
    assert!(x.iter().all(|&e| e > 0.0));
}

#[test]
fn test_implicit_diffusion_conserves_content() {
    // Zero-flux ends: backward Euler keeps Σ b dz
    let grid = stretched_grid(40);
    let kv: Vec<f64> = (0..=40).map(|k| 1e-3 * (1.0 + (k % 7) as f64)).collect();
    let b: Vec<f64> = grid.zt().iter().map(|z| 1e-3 * (z / 10.0).sin()).collect();

    let op = DiffusionOperator::centers(&grid, &kv, BottomBoundary::FreeSlip);
    let new = op.implicit_system(3600.0, b.clone()).unwrap().solve().unwrap();

    let before = grid.integrate_centers(&b);
    let after = grid.integrate_centers(&new);
    assert!((before - after).abs() < 1e-13, "{} vs {}", before, after);
}
