//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - choose a starting point (log-log regression or Kelvin rate grid)
//! - adapt the weighted residuals to the Levenberg–Marquardt solver
//! - package the optimum, covariance and diagnostics into a `FitResult`

pub mod fitter;
pub mod guess;
mod problem;

pub use fitter::*;
pub use guess::*;
