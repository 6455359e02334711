//! Initial guesses for the nonlinear solver.
//!
//! Levenberg–Marquardt only finds the local minimum nearest its start, so the
//! guesses matter:
//!
//! - Power laws: a weighted polynomial fit of `ln y` on `ln x` (degree 1 for the
//!   straight law, degree 2 for the parabola). A residual `w (y - f)` becomes
//!   roughly `w y · (ln y - ln f)` in log space, so rows are scaled by `|w y|`.
//! - Kelvin: equal amplitudes summing to `max(y)` and rates log-spaced across the
//!   reciprocal of the sampled `x` range.

use crate::error::FitError;
use crate::math::{log_space, weighted_polyfit};

/// Starting point for a power-law fit: `[a, b]`, or `[a, b, c]` when `parabolic`.
///
/// Falls back to `a = mean(y)`, `b = 1`, `c = 0` when the log-log regression is
/// not available (non-positive `y`, degenerate data).
pub fn power_guess(x: &[f64], y: &[f64], weight: &[f64], parabolic: bool) -> Vec<f64> {
    let degree = if parabolic { 2 } else { 1 };
    log_log_guess(x, y, weight, degree).unwrap_or_else(|| fallback_power_guess(y, parabolic))
}

fn log_log_guess(x: &[f64], y: &[f64], weight: &[f64], degree: usize) -> Option<Vec<f64>> {
    if x.iter().chain(y).any(|v| *v <= 0.0) {
        return None;
    }
    let t: Vec<f64> = x.iter().map(|v| v.ln()).collect();
    let z: Vec<f64> = y.iter().map(|v| v.ln()).collect();
    let scale: Vec<f64> = weight.iter().zip(y).map(|(w, yi)| (w * yi).abs()).collect();

    let coeffs = weighted_polyfit(&t, &z, &scale, degree)?;
    let mut guess = Vec::with_capacity(coeffs.len());
    guess.push(coeffs[0].exp());
    guess.extend_from_slice(&coeffs[1..]);
    let usable = guess[0] > 0.0 && guess.iter().all(|v| v.is_finite());
    usable.then_some(guess)
}

fn fallback_power_guess(y: &[f64], parabolic: bool) -> Vec<f64> {
    let mean = y.iter().sum::<f64>() / y.len().max(1) as f64;
    let a = if mean.is_finite() && mean != 0.0 { mean } else { 1.0 };
    if parabolic { vec![a, 1.0, 0.0] } else { vec![a, 1.0] }
}

/// Starting point for a `terms`-component Kelvin fit: `[a_1..a_n, b_1..b_n]`.
pub fn kelvin_guess(x: &[f64], y: &[f64], terms: usize) -> Result<Vec<f64>, FitError> {
    let y_max = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let amplitude = if y_max.is_finite() && y_max > 0.0 {
        y_max / terms as f64
    } else {
        1.0
    };

    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let x_min = x.iter().copied().filter(|v| *v > 0.0).fold(f64::INFINITY, f64::min);
    let rates = if x_min.is_finite() && x_max.is_finite() && x_max > 0.0 {
        let (mut lo, mut hi) = (1.0 / x_max, 1.0 / x_min);
        if hi / lo < 10.0 {
            lo /= 10.0;
            hi *= 10.0;
        }
        log_space(lo, hi, terms)?
    } else {
        vec![1.0; terms]
    };

    let mut guess = vec![amplitude; terms];
    guess.extend(rates);
    Ok(guess)
}
