//! Numerical utilities shared by models and fitters.
//!
//! - scalar / array broadcasting for model inputs (`broadcast`)
//! - stable creep basis for the Kelvin model (`basis`)
//! - weighted linear least squares (`ols`)
//! - parameter covariance from a Jacobian (`covariance`)
//! - log-spaced grids (`grid`)

pub mod basis;
pub mod broadcast;
pub mod covariance;
pub mod grid;
pub mod ols;

pub use basis::*;
pub use broadcast::*;
pub use covariance::*;
pub use grid::*;
pub use ols::*;
