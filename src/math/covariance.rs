//! Parameter covariance from a residual Jacobian.
//!
//! For a least-squares optimum with Jacobian `J` (m × p), residual sum of
//! squares `S` and `n` informative observations, the covariance estimate is
//!
//! ```text
//! cov = S / (n - p) · (JᵀJ)⁺
//! ```
//!
//! Zero-weight observations contribute zero rows to `J` and are not counted in
//! `n`. `(JᵀJ)⁺` is built from the SVD of `J` (`V Σ⁻² Vᵀ`), dropping singular
//! values below `ε · max(m, p) · σ_max`. When `n <= p` the estimate is undefined
//! and every entry is `+∞`.

use nalgebra::DMatrix;

/// Covariance estimate for the parameters behind `jacobian`, with `n_effective`
/// observations carrying nonzero weight.
pub fn covariance_from_jacobian(jacobian: &DMatrix<f64>, residual_ss: f64, n_effective: usize) -> DMatrix<f64> {
    let p = jacobian.ncols();
    if n_effective <= p || !residual_ss.is_finite() {
        return DMatrix::from_element(p, p, f64::INFINITY);
    }

    let Some(inv) = normal_pseudo_inverse(jacobian) else {
        return DMatrix::from_element(p, p, f64::INFINITY);
    };
    let s_sq = residual_ss / (n_effective - p) as f64;
    inv * s_sq
}

/// `(JᵀJ)⁺` via the SVD of `J`.
fn normal_pseudo_inverse(jacobian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let (m, p) = jacobian.shape();
    if jacobian.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let svd = jacobian.clone().svd(false, true);
    let v_t = svd.v_t?;

    let s_max = svd.singular_values.max();
    let threshold = f64::EPSILON * m.max(p) as f64 * s_max;

    let mut inv = DMatrix::<f64>::zeros(p, p);
    for (k, &s) in svd.singular_values.iter().enumerate() {
        if s > threshold {
            let row = v_t.row(k);
            inv += row.transpose() * row / (s * s);
        }
    }
    Some(inv)
}

/// Square roots of the covariance diagonal.
pub fn standard_errors(cov: &DMatrix<f64>) -> Vec<f64> {
    cov.diagonal().iter().map(|v| v.abs().sqrt()).collect()
}
