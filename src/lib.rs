//! `mpt-fit` library crate.
//!
//! Power-law, log-log parabola and Kelvin creep models for mean squared
//! displacement curves, with weighted Levenberg–Marquardt fitting.
//!
//! The binary (`mptfit`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the model and residual functions are reusable on their own

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod residuals;

pub use domain::{FitOptions, FitResult, ModelKind, Observations};
pub use error::{AppError, FitError};
pub use fit::{fit_kelvin, fit_observations, fit_power_weighted, fit_power_weighted_with};
pub use models::{kelvin, log_power, power_sum, predict};
pub use residuals::{ResidualBundle, kelvin_residual, power_residual, weighted_power_residual};
