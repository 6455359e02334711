//! Creep basis for Kelvin-Voigt elements.
//!
//! A single element with rate `b` contributes `1 - exp(-b·x)` per unit amplitude.
//!
//! Numerical notes:
//! - For small `b·x`, `1 - exp(-b·x)` suffers from catastrophic cancellation, so we
//!   evaluate it as `-expm1(-b·x)`.
//! - At `x = 0` the basis is exactly `0` (`expm1(-0) = -0`).

/// `1 - exp(-rate·x)`, evaluated without cancellation.
pub fn creep(x: f64, rate: f64) -> f64 {
    -(-rate * x).exp_m1()
}

/// Derivative of [`creep`] with respect to `rate`: `x·exp(-rate·x)`.
pub fn creep_rate_slope(x: f64, rate: f64) -> f64 {
    x * (-rate * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creep_is_zero_at_origin() {
        for &rate in &[0.0, 1e-9, 1.0, 250.0] {
            assert_eq!(creep(0.0, rate), 0.0);
        }
    }

    #[test]
    fn creep_keeps_precision_for_tiny_arguments() {
        let v = creep(1e-12, 1.0);
        assert!((v - 1e-12).abs() < 1e-24, "expected ~1e-12, got {v}");
    }

    #[test]
    fn creep_rate_slope_matches_finite_difference() {
        let (x, rate, h) = (0.7, 2.0, 1e-6);
        let fd = (creep(x, rate + h) - creep(x, rate - h)) / (2.0 * h);
        assert!((creep_rate_slope(x, rate) - fd).abs() < 1e-8);
    }
}
