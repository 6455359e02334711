//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for reporting or plotting

use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Which model family to fit (CLI-level choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelSpec {
    /// Straight power law `a x^b`.
    Power,
    /// Log-log parabola `a x^(b + c ln x)`.
    Parabolic,
    /// Kelvin-Voigt creep sum `Σ a_i (1 - exp(-b_i x))`.
    Kelvin,
}

impl ModelSpec {
    /// Resolve to a concrete model; `terms` only matters for Kelvin.
    pub fn to_kind(self, terms: usize) -> ModelKind {
        match self {
            ModelSpec::Power => ModelKind::PowerLaw,
            ModelSpec::Parabolic => ModelKind::Parabolic,
            ModelSpec::Kelvin => ModelKind::Kelvin { terms },
        }
    }
}

/// Concrete fitted model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    PowerLaw,
    Parabolic,
    Kelvin { terms: usize },
}

impl ModelKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::PowerLaw => "power law",
            ModelKind::Parabolic => "log-log parabola",
            ModelKind::Kelvin { .. } => "Kelvin",
        }
    }

    /// Number of free parameters.
    pub fn param_len(self) -> usize {
        match self {
            ModelKind::PowerLaw => 2,
            ModelKind::Parabolic => 3,
            ModelKind::Kelvin { terms } => 2 * terms,
        }
    }

    /// Parameter labels in vector order.
    pub fn param_names(self) -> Vec<String> {
        match self {
            ModelKind::PowerLaw => vec!["a".to_string(), "b".to_string()],
            ModelKind::Parabolic => vec!["a".to_string(), "b".to_string(), "c".to_string()],
            ModelKind::Kelvin { terms } => (1..=terms)
                .map(|i| format!("a{i}"))
                .chain((1..=terms).map(|i| format!("b{i}")))
                .collect(),
        }
    }
}

/// An observation set: parallel `x`, `y` and `weight` arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observations {
    x: Vec<f64>,
    y: Vec<f64>,
    weight: Vec<f64>,
}

impl Observations {
    /// Build an observation set, applying uniform weights when `weight` is `None`.
    ///
    /// # Errors
    /// Length mismatches, empty input, or non-finite values.
    pub fn new(x: Vec<f64>, y: Vec<f64>, weight: Option<Vec<f64>>) -> Result<Self, FitError> {
        let weight = weight.unwrap_or_else(|| vec![1.0; x.len()]);
        check_observations(&x, &y, &weight)?;
        Ok(Self { x, y, weight })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn weight(&self) -> &[f64] {
        &self.weight
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Validate a raw `(x, y, weight)` triple.
///
/// Lengths are checked first, then emptiness, then finiteness.
pub fn check_observations(x: &[f64], y: &[f64], weight: &[f64]) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::mismatch("x", x.len(), "y", y.len()));
    }
    if x.len() != weight.len() {
        return Err(FitError::mismatch("x", x.len(), "weight", weight.len()));
    }
    if x.is_empty() {
        return Err(FitError::EmptyInput);
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("x"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("y"));
    }
    if weight.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite("weight"));
    }
    Ok(())
}

/// Levenberg–Marquardt configuration.
///
/// Defaults follow MINPACK conventions, with tolerances tightened so that
/// noiseless data converges to machine precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Evaluation budget multiplier: the solver stops after `patience · (p + 1)`
    /// residual evaluations.
    pub patience: usize,
    /// Relative reduction in the sum of squares considered converged.
    pub ftol: f64,
    /// Relative change in the parameters considered converged.
    pub xtol: f64,
    /// Orthogonality between residuals and Jacobian columns considered converged.
    pub gtol: f64,
    /// Initial step bound factor.
    pub stepbound: f64,
    /// Rescale parameters by Jacobian column norms.
    pub scale_diag: bool,
    /// Explicit starting point; when `None` a heuristic guess is used.
    pub initial_guess: Option<Vec<f64>>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            patience: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 0.0,
            stepbound: 100.0,
            scale_diag: true,
            initial_guess: None,
        }
    }
}

impl FitOptions {
    /// Check option ranges (the solver asserts on them otherwise).
    pub fn validate(&self) -> Result<(), FitError> {
        if self.patience == 0 {
            return Err(FitError::InvalidOption("patience must be > 0".to_string()));
        }
        for (name, value) in [("ftol", self.ftol), ("xtol", self.xtol), ("gtol", self.gtol)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FitError::InvalidOption(format!("{name} must be finite and >= 0 (got {value})")));
            }
        }
        if !(self.stepbound.is_finite() && self.stepbound > 0.0) {
            return Err(FitError::InvalidOption(format!(
                "stepbound must be finite and > 0 (got {})",
                self.stepbound
            )));
        }
        Ok(())
    }
}

/// The `{x, y}` inputs of a fit, exactly as passed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginalData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Fit diagnostics beyond the core result arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub model: ModelKind,
    /// All observations, zero-weight ones included.
    pub n_points: usize,
    /// Observations with nonzero weight; the degrees of freedom are
    /// `n_weighted - n_params`.
    pub n_weighted: usize,
    pub n_params: usize,
    /// `Σ (w (y - f))²` at the optimum.
    pub weighted_sse: f64,
    /// `sqrt(Σ (y - f)² / n_points)`.
    pub rmse: f64,
    /// `weighted_sse / (n_weighted - p)`; infinite when `n_weighted <= p`.
    #[serde(with = "finite_or_null")]
    pub reduced_chi_square: f64,
    /// Square roots of the covariance diagonal.
    #[serde(with = "finite_or_null::vec")]
    pub std_errors: Vec<f64>,
    /// Solver termination reason.
    pub termination: String,
    pub converged: bool,
    pub evaluations: usize,
}

/// Result of a single fit call.
///
/// Created once by the fitter; all fields are read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    optimized_parameters: Vec<f64>,
    original_data: OriginalData,
    fitted_data: Vec<f64>,
    #[serde(with = "finite_or_null::matrix")]
    cov_matrix: DMatrix<f64>,
    squared_diffs: Vec<f64>,
    weights: Vec<f64>,
    summary: FitSummary,
}

impl FitResult {
    pub(crate) fn new(
        optimized_parameters: Vec<f64>,
        original_data: OriginalData,
        fitted_data: Vec<f64>,
        cov_matrix: DMatrix<f64>,
        squared_diffs: Vec<f64>,
        weights: Vec<f64>,
        summary: FitSummary,
    ) -> Self {
        Self {
            optimized_parameters,
            original_data,
            fitted_data,
            cov_matrix,
            squared_diffs,
            weights,
            summary,
        }
    }

    /// Converged parameter vector (layout per [`ModelKind`]).
    pub fn optimized_parameters(&self) -> &[f64] {
        &self.optimized_parameters
    }

    pub fn original_data(&self) -> &OriginalData {
        &self.original_data
    }

    /// Model evaluated at the optimum over the input `x`.
    pub fn fitted_data(&self) -> &[f64] {
        &self.fitted_data
    }

    /// Parameter covariance estimate (`p × p`).
    pub fn cov_matrix(&self) -> &DMatrix<f64> {
        &self.cov_matrix
    }

    /// `(y - fitted)²` per point.
    pub fn squared_diffs(&self) -> &[f64] {
        &self.squared_diffs
    }

    /// Weights used by the fit (uniform when the caller gave none).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn summary(&self) -> &FitSummary {
        &self.summary
    }

    pub fn model(&self) -> ModelKind {
        self.summary.model
    }
}

/// Serde helpers mapping non-finite floats to JSON `null` and back to `+∞`.
///
/// JSON has no representation for infinities; undefined covariances and
/// chi-square values are reported as infinite.
mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    fn to_option(v: f64) -> Option<f64> {
        v.is_finite().then_some(v)
    }

    fn from_option(v: Option<f64>) -> f64 {
        v.unwrap_or(f64::INFINITY)
    }

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        to_option(*value).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Option::<f64>::deserialize(d).map(from_option)
    }

    pub mod vec {
        use super::*;

        pub fn serialize<S: Serializer>(values: &[f64], s: S) -> Result<S::Ok, S::Error> {
            let out: Vec<Option<f64>> = values.iter().copied().map(to_option).collect();
            out.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
            let raw = Vec::<Option<f64>>::deserialize(d)?;
            Ok(raw.into_iter().map(from_option).collect())
        }
    }

    pub mod matrix {
        use nalgebra::DMatrix;
        use serde::de::Error;

        use super::*;

        /// Row-major nested arrays.
        pub fn serialize<S: Serializer>(m: &DMatrix<f64>, s: S) -> Result<S::Ok, S::Error> {
            let rows: Vec<Vec<Option<f64>>> = m
                .row_iter()
                .map(|row| row.iter().copied().map(to_option).collect())
                .collect();
            rows.serialize(s)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DMatrix<f64>, D::Error> {
            let rows = Vec::<Vec<Option<f64>>>::deserialize(d)?;
            let n_rows = rows.len();
            let n_cols = rows.first().map_or(0, Vec::len);
            if rows.iter().any(|r| r.len() != n_cols) {
                return Err(D::Error::custom("covariance rows have unequal lengths"));
            }
            let flat: Vec<f64> = rows.into_iter().flatten().map(from_option).collect();
            Ok(DMatrix::from_row_slice(n_rows, n_cols, &flat))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observations_default_to_uniform_weights() {
        let obs = Observations::new(vec![1.0, 2.0], vec![3.0, 4.0], None).unwrap();
        assert_eq!(obs.weight(), &[1.0, 1.0]);
        assert_eq!(obs.len(), 2);
    }

    #[test]
    fn observations_reject_mismatch_and_empty() {
        assert!(matches!(
            Observations::new(vec![1.0, 2.0, 3.0], vec![2.0, 4.0], None),
            Err(FitError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Observations::new(vec![1.0], vec![2.0], Some(vec![1.0, 1.0])),
            Err(FitError::LengthMismatch { .. })
        ));
        assert_eq!(Observations::new(vec![], vec![], None), Err(FitError::EmptyInput));
        assert_eq!(
            Observations::new(vec![1.0], vec![f64::NAN], None),
            Err(FitError::NonFinite("y"))
        );
    }

    #[test]
    fn kelvin_parameter_names_follow_vector_layout() {
        let names = ModelKind::Kelvin { terms: 2 }.param_names();
        assert_eq!(names, vec!["a1", "a2", "b1", "b2"]);
        assert_eq!(ModelKind::Kelvin { terms: 2 }.param_len(), 4);
    }

    #[test]
    fn model_kind_serializes_with_tag() {
        let json = serde_json::to_string(&ModelKind::Kelvin { terms: 3 }).unwrap();
        assert_eq!(json, r#"{"kind":"kelvin","terms":3}"#);
        let back: ModelKind = serde_json::from_str(r#"{"kind":"power_law"}"#).unwrap();
        assert_eq!(back, ModelKind::PowerLaw);
    }

    #[test]
    fn options_validation_catches_bad_ranges() {
        assert!(FitOptions::default().validate().is_ok());
        let bad = FitOptions {
            patience: 0,
            ..FitOptions::default()
        };
        assert!(bad.validate().is_err());
        let bad = FitOptions {
            ftol: -1.0,
            ..FitOptions::default()
        };
        assert!(bad.validate().is_err());
    }
}
