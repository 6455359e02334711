//! Model evaluation for the Kelvin, power-sum and log-exponent families.
//!
//! - Kelvin: `y = Σ a_i (1 - exp(-b_i x))`
//! - power sum: `y = Σ a_i x^b_i`
//! - log-exponent power law: `y = a x^(b + c ln x)`, a parabola in log-log space
//!
//! Besides the public evaluators this module exposes the per-point gradients the
//! fitters use to build analytic Jacobians.

use crate::domain::ModelKind;
use crate::error::FitError;
use crate::math::{Abscissa, creep, creep_rate_slope};

/// Evaluate a Kelvin-Voigt creep sum `Σ a_i (1 - exp(-b_i x))`.
///
/// `a` are the amplitudes and `b` the rate constants; they are paired by index.
///
/// # Errors
/// - [`FitError::LengthMismatch`] if `a` and `b` differ in length.
/// - [`FitError::NegativeParameter`] if any amplitude or rate is negative.
pub fn kelvin<X>(x: &X, a: &[f64], b: &[f64]) -> Result<X::Output, FitError>
where
    X: Abscissa + ?Sized,
{
    ensure_paired(a, b)?;
    ensure_non_negative("amplitude", a)?;
    ensure_non_negative("rate", b)?;
    Ok(x.broadcast(|xi| kelvin_at(xi, a, b)))
}

/// Evaluate a sum of power terms `Σ a_i x^b_i`.
///
/// # Errors
/// [`FitError::LengthMismatch`] if `a` and `b` differ in length.
pub fn power_sum<X>(x: &X, a: &[f64], b: &[f64]) -> Result<X::Output, FitError>
where
    X: Abscissa + ?Sized,
{
    ensure_paired(a, b)?;
    Ok(x.broadcast(|xi| power_sum_at(xi, a, b)))
}

/// Evaluate the log-exponent power law `a x^(b + c ln x)`.
///
/// # Errors
/// [`FitError::Domain`] if any `x` is not strictly positive (NaN included).
pub fn log_power<X>(x: &X, a: f64, b: f64, c: f64) -> Result<X::Output, FitError>
where
    X: Abscissa + ?Sized,
{
    ensure_positive(x.values())?;
    Ok(x.broadcast(|xi| log_power_at(xi, a, b, c)))
}

/// Predict `y(x)` for a fitted model.
///
/// Parameter layouts:
/// - `PowerLaw`: `[a, b]`
/// - `Parabolic`: `[a, b, c]`
/// - `Kelvin { terms: n }`: `[a_1..a_n, b_1..b_n]`
pub fn predict(model: ModelKind, x: f64, params: &[f64]) -> Result<f64, FitError> {
    ensure_arity(model, params)?;
    match model {
        ModelKind::PowerLaw => power_sum(&x, &params[..1], &params[1..2]),
        ModelKind::Parabolic => log_power(&x, params[0], params[1], params[2]),
        ModelKind::Kelvin { terms } => kelvin(&x, &params[..terms], &params[terms..]),
    }
}

/// Check that `params` has the length `model` expects.
pub fn ensure_arity(model: ModelKind, params: &[f64]) -> Result<(), FitError> {
    let expected = model.param_len();
    if expected == 0 || params.len() != expected {
        return Err(FitError::Arity {
            model: model.display_name(),
            expected: expected.to_string(),
            got: params.len(),
        });
    }
    Ok(())
}

pub(crate) fn kelvin_at(x: f64, a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&ai, &bi)| ai * creep(x, bi)).sum()
}

pub(crate) fn power_sum_at(x: f64, a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(&ai, &bi)| ai * x.powf(bi)).sum()
}

/// Unchecked `a x^(b + c ln x)`; callers guarantee `x > 0`.
pub(crate) fn log_power_at(x: f64, a: f64, b: f64, c: f64) -> f64 {
    let l = x.ln();
    a * (l * (b + c * l)).exp()
}

/// Gradient of `a x^(b + c ln x)` with respect to `[a, b, c]`.
pub(crate) fn log_power_gradient(x: f64, a: f64, b: f64, c: f64) -> [f64; 3] {
    let l = x.ln();
    let g = (l * (b + c * l)).exp();
    let f = a * g;
    [g, f * l, f * l * l]
}

/// Gradient of the Kelvin sum with respect to `[a_1..a_n, b_1..b_n]`, written
/// into `out` (length `2n`).
pub(crate) fn kelvin_gradient(x: f64, a: &[f64], b: &[f64], out: &mut [f64]) {
    let n = a.len();
    for k in 0..n {
        out[k] = creep(x, b[k]);
        out[n + k] = a[k] * creep_rate_slope(x, b[k]);
    }
}

fn ensure_paired(a: &[f64], b: &[f64]) -> Result<(), FitError> {
    if a.len() != b.len() {
        return Err(FitError::mismatch("a", a.len(), "b", b.len()));
    }
    Ok(())
}

fn ensure_non_negative(name: &'static str, values: &[f64]) -> Result<(), FitError> {
    match values.iter().find(|v| **v < 0.0) {
        Some(&value) => Err(FitError::NegativeParameter { name, value }),
        None => Ok(()),
    }
}

pub(crate) fn ensure_positive(x: &[f64]) -> Result<(), FitError> {
    match x.iter().find(|v| !(**v > 0.0)) {
        Some(&value) => Err(FitError::Domain { value }),
        None => Ok(()),
    }
}
