//! Closed-form model evaluators.
//!
//! Models are implemented as small, pure functions so that residual and fitting
//! code can stay generic. Each evaluator validates its parameters up front and
//! accepts either a scalar `x` or an array of them (see [`crate::math::Abscissa`]).

pub mod model;

pub use model::*;
