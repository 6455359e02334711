//! Residual functions: the objectives handed to the least-squares solver.
//!
//! Convention: residuals are `observed - predicted`, and weighted residuals are
//! `weight · (observed - predicted)`. The solver minimizes `Σ r_i²`, so a weight
//! acts like an inverse standard deviation for its point.

use serde::{Deserialize, Serialize};

use crate::error::FitError;
use crate::models::{ensure_positive, kelvin, log_power_at, power_sum};

/// Keyed residual arguments, mirroring a `{x, y, weight}` map.
///
/// Fields are optional so a bundle can be deserialized from partial JSON; the
/// residual function reports which one is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidualBundle {
    pub x: Option<Vec<f64>>,
    pub y: Option<Vec<f64>>,
    pub weight: Option<Vec<f64>>,
}

impl ResidualBundle {
    pub fn new(x: Vec<f64>, y: Vec<f64>, weight: Vec<f64>) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            weight: Some(weight),
        }
    }

    /// Borrow `(x, y, weight)`, failing on the first missing field.
    pub fn fields(&self) -> Result<(&[f64], &[f64], &[f64]), FitError> {
        let x = self.x.as_deref().ok_or(FitError::MissingField("x"))?;
        let y = self.y.as_deref().ok_or(FitError::MissingField("y"))?;
        let weight = self.weight.as_deref().ok_or(FitError::MissingField("weight"))?;
        Ok((x, y, weight))
    }
}

/// Weighted residual of the log-exponent power law, `params = [a, b, c]`.
///
/// Returns `weight · (y - a x^(b + c ln x))`; `c = 0` is the plain power law.
///
/// # Errors
/// Checked in order: missing field, empty input, arity, length mismatch,
/// non-positive `x`.
pub fn weighted_power_residual(params: &[f64], bundle: &ResidualBundle) -> Result<Vec<f64>, FitError> {
    let (x, y, weight) = bundle.fields()?;
    weighted_log_power(params, x, y, weight)
}

/// Unweighted power-law residual `y - a x^b`, `params = [a, b]`.
pub fn power_residual(params: &[f64], x: &[f64], y: &[f64]) -> Result<Vec<f64>, FitError> {
    if params.len() != 2 {
        return Err(FitError::Arity {
            model: "power law",
            expected: "2".to_string(),
            got: params.len(),
        });
    }
    ensure_same_len(x, y)?;
    let predicted = power_sum(x, &params[..1], &params[1..])?;
    Ok(difference(y, &predicted))
}

/// Unweighted Kelvin residual `y - Σ a_i (1 - exp(-b_i x))`.
///
/// `params = [a_1..a_n, b_1..b_n]`, so its length must be even and non-zero.
pub fn kelvin_residual(params: &[f64], x: &[f64], y: &[f64]) -> Result<Vec<f64>, FitError> {
    if params.is_empty() || params.len() % 2 != 0 {
        return Err(FitError::Arity {
            model: "Kelvin",
            expected: "an even number >= 2".to_string(),
            got: params.len(),
        });
    }
    ensure_same_len(x, y)?;
    let (a, b) = params.split_at(params.len() / 2);
    let predicted = kelvin(x, a, b)?;
    Ok(difference(y, &predicted))
}

/// Slice form of [`weighted_power_residual`], used directly by the fitter.
pub(crate) fn weighted_log_power(
    params: &[f64],
    x: &[f64],
    y: &[f64],
    weight: &[f64],
) -> Result<Vec<f64>, FitError> {
    if x.is_empty() || y.is_empty() || weight.is_empty() {
        return Err(FitError::EmptyInput);
    }
    let &[a, b, c] = params else {
        return Err(FitError::Arity {
            model: "log-log parabola",
            expected: "3".to_string(),
            got: params.len(),
        });
    };
    ensure_same_len(x, y)?;
    if weight.len() != x.len() {
        return Err(FitError::mismatch("x", x.len(), "weight", weight.len()));
    }
    ensure_positive(x)?;

    Ok(x
        .iter()
        .zip(y)
        .zip(weight)
        .map(|((&xi, &yi), &wi)| wi * (yi - log_power_at(xi, a, b, c)))
        .collect())
}

fn ensure_same_len(x: &[f64], y: &[f64]) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::mismatch("x", x.len(), "y", y.len()));
    }
    Ok(())
}

fn difference(observed: &[f64], predicted: &[f64]) -> Vec<f64> {
    observed.iter().zip(predicted).map(|(o, p)| o - p).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn weighted_residual_matches_hand_computation() {
        let bundle = ResidualBundle::new(vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0], vec![1.0, 0.5, 2.0]);
        let r = weighted_power_residual(&[1.0, 2.0, 3.0], &bundle).unwrap();
        for (i, (&x, &y)) in [1.0_f64, 2.0, 3.0].iter().zip(&[2.0, 4.0, 6.0]).enumerate() {
            let w = [1.0, 0.5, 2.0][i];
            let f = x.powf(2.0 + 3.0 * x.ln());
            assert_relative_eq!(r[i], w * (y - f), max_relative = 1e-12);
        }
    }

    #[test]
    fn weighted_residual_checks_parameter_count() {
        let bundle = ResidualBundle::new(vec![1.0], vec![2.0], vec![1.0]);
        assert!(matches!(
            weighted_power_residual(&[1.0, 2.0], &bundle),
            Err(FitError::Arity { got: 2, .. })
        ));
        assert!(matches!(
            weighted_power_residual(&[1.0, 2.0, 3.0, 4.0], &bundle),
            Err(FitError::Arity { got: 4, .. })
        ));
    }

    #[test]
    fn weighted_residual_reports_missing_weight() {
        let bundle = ResidualBundle {
            x: Some(vec![1.0, 2.0]),
            y: Some(vec![2.0, 4.0]),
            weight: None,
        };
        assert_eq!(
            weighted_power_residual(&[1.0, 2.0, 3.0], &bundle),
            Err(FitError::MissingField("weight"))
        );
    }

    #[test]
    fn bundle_from_partial_json_is_missing_fields() {
        let bundle: ResidualBundle = serde_json::from_str(r#"{"x": [1.0], "weight": [1.0]}"#).unwrap();
        assert_eq!(bundle.fields(), Err(FitError::MissingField("y")));
    }

    #[test]
    fn weighted_residual_handles_various_sizes() {
        let params = [1.0, 2.0, 3.0];
        let small = ResidualBundle::new(vec![1.0], vec![2.0], vec![1.0]);
        let large = ResidualBundle::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![2.0, 4.0, 6.0, 8.0, 10.0],
            vec![1.0; 5],
        );
        assert_eq!(weighted_power_residual(&params, &small).unwrap().len(), 1);
        assert_eq!(weighted_power_residual(&params, &large).unwrap().len(), 5);
    }

    #[test]
    fn weighted_residual_rejects_empty_input() {
        let empty = ResidualBundle::new(vec![], vec![], vec![]);
        assert_eq!(weighted_power_residual(&[], &empty), Err(FitError::EmptyInput));
        assert_eq!(weighted_power_residual(&[1.0, 2.0, 3.0], &empty), Err(FitError::EmptyInput));
    }

    #[test]
    fn weighted_residual_rejects_non_positive_x() {
        let bundle = ResidualBundle::new(vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 1.0]);
        assert!(matches!(
            weighted_power_residual(&[1.0, 1.0, 0.0], &bundle),
            Err(FitError::Domain { .. })
        ));
    }

    #[test]
    fn unit_weights_reduce_to_unweighted_residual() {
        let x = vec![0.5, 1.0, 2.0, 4.0];
        let y = vec![0.3, 1.1, 3.9, 16.5];
        let weighted =
            weighted_power_residual(&[1.2, 2.0, 0.0], &ResidualBundle::new(x.clone(), y.clone(), vec![1.0; 4]))
                .unwrap();
        let plain = power_residual(&[1.2, 2.0], &x, &y).unwrap();
        for (w, p) in weighted.iter().zip(&plain) {
            assert_relative_eq!(*w, *p, max_relative = 1e-12);
        }
    }

    #[test]
    fn power_residual_matches_formula() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 8.0];
        let r = power_residual(&[1.0, 2.0], &x, &y).unwrap();
        for (ri, expected) in r.iter().zip([1.0, 0.0, -1.0]) {
            assert_relative_eq!(*ri, expected, epsilon = 1e-12);
        }
        assert!(matches!(power_residual(&[1.0], &x, &y), Err(FitError::Arity { .. })));
        assert!(matches!(
            power_residual(&[1.0, 2.0], &x, &y[..2]),
            Err(FitError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn kelvin_residual_splits_amplitudes_and_rates() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        let r = kelvin_residual(&[1.0, 2.0], &x, &y).unwrap();
        for i in 0..3 {
            let f = 1.0 - (-2.0 * x[i]).exp();
            assert_relative_eq!(r[i], y[i] - f, max_relative = 1e-12);
        }
        assert!(matches!(kelvin_residual(&[1.0], &x, &y), Err(FitError::Arity { .. })));
        assert!(matches!(kelvin_residual(&[], &x, &y), Err(FitError::Arity { .. })));
        assert!(matches!(
            kelvin_residual(&[-1.0, 2.0], &x, &y),
            Err(FitError::NegativeParameter { .. })
        ));
    }
}
