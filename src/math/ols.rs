//! Weighted linear least squares.
//!
//! Power-law fits start from a linear regression in log-log space:
//!
//! ```text
//! minimize Σ s_i² (z_i - Σ_k β_k t_i^k)²
//! ```
//!
//! with `t = ln x`, `z = ln y` and per-row scales `s_i`. The result is only an
//! initial guess for the nonlinear solver, so robustness matters more than speed.
//!
//! Rows are scaled by `s_i` and the resulting ordinary problem is solved by SVD,
//! which handles tall design matrices and near-collinear columns (e.g. a narrow
//! `ln x` range for the parabolic term).

use nalgebra::{DMatrix, DVector};

/// Rank cut-offs tried in turn, relative to the largest singular value.
const RCOND_LADDER: [f64; 3] = [1e-12, 1e-9, 1e-6];

/// Minimum-norm least squares solution of `design · β ≈ rhs`.
///
/// Returns `None` when no cut-off yields a finite solution.
pub fn solve_least_squares(design: &DMatrix<f64>, rhs: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = design.clone().svd(true, true);
    let sigma_max = svd.singular_values.max();
    RCOND_LADDER.iter().find_map(|rcond| {
        let beta = svd.solve(rhs, rcond * sigma_max).ok()?;
        beta.iter().all(|v| v.is_finite()).then_some(beta)
    })
}

/// Fit a polynomial `z ≈ Σ_k β_k t^k` (`k = 0..=degree`) with per-row scales.
///
/// Returns coefficients in ascending order of power, or `None` when the inputs
/// are inconsistent, contain non-finite values, or the system cannot be solved.
pub fn weighted_polyfit(t: &[f64], z: &[f64], scale: &[f64], degree: usize) -> Option<Vec<f64>> {
    let n = t.len();
    let p = degree + 1;
    if n < p || z.len() != n || scale.len() != n {
        return None;
    }
    if t.iter().chain(z).chain(scale).any(|v| !v.is_finite()) {
        return None;
    }

    let mut xs = DMatrix::<f64>::zeros(n, p);
    let mut zs = DVector::<f64>::zeros(n);
    for i in 0..n {
        let mut power = 1.0;
        for k in 0..p {
            xs[(i, k)] = power * scale[i];
            power *= t[i];
        }
        zs[i] = z[i] * scale[i];
    }

    solve_least_squares(&xs, &zs).map(|beta| beta.iter().copied().collect())
}
