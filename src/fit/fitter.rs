//! Fit orchestration.
//!
//! Given:
//! - abscissae `x_i`
//! - observed values `y_i`
//! - weights `w_i` (uniform when omitted)
//!
//! we validate the inputs, pick a starting point, minimize `Σ (w_i (y_i - f(x_i)))²`
//! with Levenberg–Marquardt, and package the optimum together with the fitted
//! curve, covariance estimate and residual diagnostics into a [`FitResult`].

use levenberg_marquardt::{LevenbergMarquardt, MinimizationReport, TerminationReason};
use nalgebra::DMatrix;

use crate::domain::{FitOptions, FitResult, FitSummary, ModelKind, Observations, OriginalData, check_observations};
use crate::error::FitError;
use crate::fit::guess::{kelvin_guess, power_guess};
use crate::fit::problem::{KelvinProblem, PowerProblem, kelvin_jacobian};
use crate::math::{covariance_from_jacobian, standard_errors};
use crate::models::{ensure_arity, ensure_positive, predict};

/// Fit a weighted power law (`parabolic = false`) or log-log parabola
/// (`parabolic = true`) with default solver options.
///
/// Parameters in the result are `[a, b]` for `a x^b` and `[a, b, c]` for
/// `a x^(b + c ln x)`.
///
/// # Errors
/// - [`FitError::LengthMismatch`] if `x`, `y`, `weight` differ in length
///   (checked before the solver runs)
/// - [`FitError::EmptyInput`] for zero-length data
/// - [`FitError::Domain`] for non-positive `x`
/// - [`FitError::InsufficientData`] with fewer points than parameters
pub fn fit_power_weighted(
    x: &[f64],
    y: &[f64],
    weight: Option<&[f64]>,
    parabolic: bool,
) -> Result<FitResult, FitError> {
    fit_power_weighted_with(x, y, weight, parabolic, &FitOptions::default())
}

/// [`fit_power_weighted`] with explicit solver options.
pub fn fit_power_weighted_with(
    x: &[f64],
    y: &[f64],
    weight: Option<&[f64]>,
    parabolic: bool,
    options: &FitOptions,
) -> Result<FitResult, FitError> {
    let uniform;
    let weight = match weight {
        Some(w) => w,
        None => {
            uniform = vec![1.0; x.len()];
            &uniform
        }
    };
    check_observations(x, y, weight)?;
    options.validate()?;
    ensure_positive(x)?;

    let model = if parabolic { ModelKind::Parabolic } else { ModelKind::PowerLaw };
    ensure_enough_points(x.len(), model.param_len())?;

    let initial = match &options.initial_guess {
        Some(guess) => {
            ensure_arity(model, guess)?;
            guess.clone()
        }
        None => power_guess(x, y, weight, parabolic),
    };
    log::debug!("fitting {} to {} points from {:?}", model.display_name(), x.len(), initial);

    let problem = PowerProblem::new(x, y, weight, parabolic, &initial);
    let (solved, report) = solver(options).minimize(problem);
    check_termination(model, &report)?;

    let params = solved.parameters();
    ensure_finite_params(&params)?;
    let jacobian = solved.jacobian_matrix();
    package(model, x, y, weight, params, &jacobian, &report)
}

/// Fit a `terms`-component Kelvin creep model `Σ a_i (1 - exp(-b_i x))`.
///
/// Amplitudes and rates are optimized in log space and therefore stay positive.
/// The result parameters are `[a_1..a_n, b_1..b_n]`; the covariance refers to
/// those natural parameters.
pub fn fit_kelvin(
    x: &[f64],
    y: &[f64],
    weight: Option<&[f64]>,
    terms: usize,
    options: &FitOptions,
) -> Result<FitResult, FitError> {
    let model = ModelKind::Kelvin { terms };
    if terms == 0 {
        return Err(FitError::Arity {
            model: model.display_name(),
            expected: "at least 1 term".to_string(),
            got: 0,
        });
    }
    let uniform;
    let weight = match weight {
        Some(w) => w,
        None => {
            uniform = vec![1.0; x.len()];
            &uniform
        }
    };
    check_observations(x, y, weight)?;
    options.validate()?;
    ensure_enough_points(x.len(), model.param_len())?;

    let initial = match &options.initial_guess {
        Some(guess) => {
            ensure_arity(model, guess)?;
            if let Some(&bad) = guess.iter().find(|v| !(**v > 0.0)) {
                return Err(FitError::InvalidOption(format!(
                    "Kelvin initial guess values must be > 0 (got {bad})"
                )));
            }
            guess.clone()
        }
        None => kelvin_guess(x, y, terms)?,
    };
    log::debug!("fitting {terms}-term Kelvin model to {} points from {:?}", x.len(), initial);

    let (mut solved, mut report) = solver(options).minimize(KelvinProblem::new(x, y, weight, &initial));
    if matches!(report.termination, TerminationReason::User(_) | TerminationReason::Numerical(_)) {
        let stepbound = (options.stepbound * 0.01).min(1.0);
        log::debug!(
            "Kelvin fit stopped with {:?}; retrying with stepbound {stepbound}",
            report.termination
        );
        (solved, report) = solver(options)
            .with_stepbound(stepbound)
            .minimize(KelvinProblem::new(x, y, weight, &initial));
    }
    check_termination(model, &report)?;

    let params = solved.parameters();
    ensure_finite_params(&params)?;
    let jacobian = kelvin_jacobian(x, weight, &params);
    package(model, x, y, weight, params, &jacobian, &report)
}

/// Fit any supported model to an observation set.
pub fn fit_observations(
    observations: &Observations,
    model: ModelKind,
    options: &FitOptions,
) -> Result<FitResult, FitError> {
    let (x, y, w) = (observations.x(), observations.y(), Some(observations.weight()));
    match model {
        ModelKind::PowerLaw => fit_power_weighted_with(x, y, w, false, options),
        ModelKind::Parabolic => fit_power_weighted_with(x, y, w, true, options),
        ModelKind::Kelvin { terms } => fit_kelvin(x, y, w, terms, options),
    }
}

fn solver(options: &FitOptions) -> LevenbergMarquardt<f64> {
    LevenbergMarquardt::new()
        .with_patience(options.patience)
        .with_ftol(options.ftol)
        .with_xtol(options.xtol)
        .with_gtol(options.gtol)
        .with_stepbound(options.stepbound)
        .with_scale_diag(options.scale_diag)
}

fn ensure_enough_points(n: usize, p: usize) -> Result<(), FitError> {
    if n < p {
        return Err(FitError::InsufficientData { needed: p, got: n });
    }
    Ok(())
}

fn ensure_finite_params(params: &[f64]) -> Result<(), FitError> {
    if params.iter().any(|v| !v.is_finite()) {
        return Err(FitError::Solver(format!("non-finite parameters {params:?}")));
    }
    Ok(())
}

/// Running out of evaluations is reported through `FitSummary::converged`;
/// every other unsuccessful termination is an error.
fn check_termination(model: ModelKind, report: &MinimizationReport<f64>) -> Result<(), FitError> {
    match &report.termination {
        TerminationReason::LostPatience => {
            log::warn!(
                "{} fit stopped after {} evaluations without converging",
                model.display_name(),
                report.number_of_evaluations
            );
            Ok(())
        }
        reason if reason.was_successful() => {
            log::debug!(
                "{} fit terminated: {:?} after {} evaluations",
                model.display_name(),
                reason,
                report.number_of_evaluations
            );
            Ok(())
        }
        reason => Err(FitError::Solver(format!("{reason:?}"))),
    }
}

fn package(
    model: ModelKind,
    x: &[f64],
    y: &[f64],
    weight: &[f64],
    params: Vec<f64>,
    jacobian: &DMatrix<f64>,
    report: &MinimizationReport<f64>,
) -> Result<FitResult, FitError> {
    let fitted = x
        .iter()
        .map(|&xi| predict(model, xi, &params))
        .collect::<Result<Vec<f64>, FitError>>()?;
    if fitted.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("fitted values"));
    }

    let squared_diffs: Vec<f64> = y.iter().zip(&fitted).map(|(yi, fi)| (yi - fi).powi(2)).collect();
    let weighted_sse: f64 = squared_diffs.iter().zip(weight).map(|(d, w)| w * w * d).sum();

    let n = x.len();
    let n_weighted = weight.iter().filter(|w| **w != 0.0).count();
    let p = params.len();
    let cov_matrix = covariance_from_jacobian(jacobian, weighted_sse, n_weighted);
    if n_weighted <= p {
        log::warn!("covariance undefined: {n_weighted} weighted points for {p} parameters");
    }
    let reduced_chi_square = if n_weighted > p {
        weighted_sse / (n_weighted - p) as f64
    } else {
        f64::INFINITY
    };

    let summary = FitSummary {
        model,
        n_points: n,
        n_weighted,
        n_params: p,
        weighted_sse,
        rmse: (squared_diffs.iter().sum::<f64>() / n as f64).sqrt(),
        reduced_chi_square,
        std_errors: standard_errors(&cov_matrix),
        termination: format!("{:?}", report.termination),
        converged: report.termination.was_successful(),
        evaluations: report.number_of_evaluations,
    };

    Ok(FitResult::new(
        params,
        OriginalData {
            x: x.to_vec(),
            y: y.to_vec(),
        },
        fitted,
        cov_matrix,
        squared_diffs,
        weight.to_vec(),
        summary,
    ))
}
