//! Log-spaced grids.
//!
//! Used for initial Kelvin rate constants and for synthetic sample abscissae.
//! Lag times in microrheology span decades, so even spacing in `ln x` is the
//! natural choice.

use crate::error::FitError;

/// Generate `steps` log-spaced points between `min` and `max` (inclusive).
///
/// With `steps == 1` the single point is the geometric midpoint `sqrt(min·max)`.
pub fn log_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, FitError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max >= min) {
        return Err(FitError::InvalidOption(format!(
            "invalid log range: min={min}, max={max} (must be finite, >0, and max>=min)"
        )));
    }
    if steps == 0 {
        return Err(FitError::InvalidOption("log grid needs at least one step".to_string()));
    }
    if steps == 1 {
        return Ok(vec![(min * max).sqrt()]);
    }

    let ln_min = min.ln();
    let ln_max = max.ln();
    let step = (ln_max - ln_min) / (steps as f64 - 1.0);

    let mut out = Vec::with_capacity(steps);
    for i in 0..steps {
        out.push((ln_min + step * i as f64).exp());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_space_includes_endpoints() {
        let v = log_space(0.1, 10.0, 5).unwrap();
        assert_eq!(v.len(), 5);
        assert!((v[0] - 0.1).abs() < 1e-12);
        assert!((v[2] - 1.0).abs() < 1e-12);
        assert!((v[v.len() - 1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn single_step_is_geometric_midpoint() {
        let v = log_space(1.0, 100.0, 1).unwrap();
        assert_eq!(v.len(), 1);
        assert!((v[0] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        assert!(log_space(0.0, 1.0, 3).is_err());
        assert!(log_space(2.0, 1.0, 3).is_err());
        assert!(log_space(1.0, 2.0, 0).is_err());
    }
}
