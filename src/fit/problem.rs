//! Least-squares problem adapters for the Levenberg–Marquardt solver.
//!
//! Each adapter borrows the observation arrays and owns only the current
//! parameter vector. Residuals come straight from [`crate::residuals`]; the
//! Jacobians are analytic.
//!
//! - [`PowerProblem`]: weighted log-exponent power law, in natural parameters.
//!   The straight power law pins `c = 0` and exposes only `[a, b]`.
//! - [`KelvinProblem`]: weighted Kelvin sum, optimized over `ln a_i, ln b_i` so
//!   amplitudes and rates stay positive.

use levenberg_marquardt::LeastSquaresProblem;
use nalgebra::{DMatrix, DVector, Dyn, Matrix, Owned, Vector};

use crate::models::{kelvin_gradient, log_power_gradient};
use crate::residuals::{kelvin_residual, weighted_log_power};

#[derive(Debug, Clone)]
pub(crate) struct PowerProblem<'a> {
    x: &'a [f64],
    y: &'a [f64],
    weight: &'a [f64],
    parabolic: bool,
    params: DVector<f64>,
}

impl<'a> PowerProblem<'a> {
    pub(crate) fn new(x: &'a [f64], y: &'a [f64], weight: &'a [f64], parabolic: bool, initial: &[f64]) -> Self {
        Self {
            x,
            y,
            weight,
            parabolic,
            params: DVector::from_column_slice(initial),
        }
    }

    pub(crate) fn parameters(&self) -> Vec<f64> {
        self.params.iter().copied().collect()
    }

    fn full_params(&self) -> [f64; 3] {
        let c = if self.parabolic { self.params[2] } else { 0.0 };
        [self.params[0], self.params[1], c]
    }

    /// Jacobian of `w (y - f)` with respect to the free parameters.
    pub(crate) fn jacobian_matrix(&self) -> DMatrix<f64> {
        let p = self.params.len();
        let [a, b, c] = self.full_params();
        let mut jac = DMatrix::<f64>::zeros(self.x.len(), p);
        for (i, (&xi, &wi)) in self.x.iter().zip(self.weight).enumerate() {
            let grad = log_power_gradient(xi, a, b, c);
            for k in 0..p {
                jac[(i, k)] = -wi * grad[k];
            }
        }
        jac
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for PowerProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, params: &Vector<f64, Dyn, Self::ParameterStorage>) {
        self.params.clone_from(params);
    }

    fn params(&self) -> Vector<f64, Dyn, Self::ParameterStorage> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<Vector<f64, Dyn, Self::ResidualStorage>> {
        let r = weighted_log_power(&self.full_params(), self.x, self.y, self.weight).ok()?;
        all_finite(&r).then(|| DVector::from_vec(r))
    }

    fn jacobian(&self) -> Option<Matrix<f64, Dyn, Dyn, Self::JacobianStorage>> {
        let jac = self.jacobian_matrix();
        all_finite(jac.as_slice()).then_some(jac)
    }
}

/// Bound on `|ln a_i|` and `|ln b_i|` seen by the residuals, so an overshooting
/// trial step scores as a large finite residual instead of overflowing.
const LOG_PARAM_LIMIT: f64 = 300.0;

#[derive(Debug, Clone)]
pub(crate) struct KelvinProblem<'a> {
    x: &'a [f64],
    y: &'a [f64],
    weight: &'a [f64],
    /// `[ln a_1..ln a_n, ln b_1..ln b_n]`
    log_params: DVector<f64>,
}

impl<'a> KelvinProblem<'a> {
    /// `initial` is in natural units and must be strictly positive.
    pub(crate) fn new(x: &'a [f64], y: &'a [f64], weight: &'a [f64], initial: &[f64]) -> Self {
        Self {
            x,
            y,
            weight,
            log_params: DVector::from_iterator(initial.len(), initial.iter().map(|v| v.ln())),
        }
    }

    /// Current `[a_1..a_n, b_1..b_n]`.
    pub(crate) fn parameters(&self) -> Vec<f64> {
        self.log_params
            .iter()
            .map(|v| v.clamp(-LOG_PARAM_LIMIT, LOG_PARAM_LIMIT).exp())
            .collect()
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for KelvinProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, params: &Vector<f64, Dyn, Self::ParameterStorage>) {
        self.log_params.clone_from(params);
    }

    fn params(&self) -> Vector<f64, Dyn, Self::ParameterStorage> {
        self.log_params.clone()
    }

    fn residuals(&self) -> Option<Vector<f64, Dyn, Self::ResidualStorage>> {
        let params = self.parameters();
        let r = kelvin_residual(&params, self.x, self.y).ok()?;
        let r: Vec<f64> = r.iter().zip(self.weight).map(|(ri, wi)| wi * ri).collect();
        all_finite(&r).then(|| DVector::from_vec(r))
    }

    fn jacobian(&self) -> Option<Matrix<f64, Dyn, Dyn, Self::JacobianStorage>> {
        let params = self.parameters();
        let mut jac = kelvin_jacobian(self.x, self.weight, &params);
        // d/d(ln p) = p · d/dp
        for (k, &p) in params.iter().enumerate() {
            jac.column_mut(k).scale_mut(p);
        }
        all_finite(jac.as_slice()).then_some(jac)
    }
}

/// Jacobian of `w (y - kelvin(x))` with respect to `[a_1..a_n, b_1..b_n]`.
pub(crate) fn kelvin_jacobian(x: &[f64], weight: &[f64], params: &[f64]) -> DMatrix<f64> {
    let (a, b) = params.split_at(params.len() / 2);
    let mut jac = DMatrix::<f64>::zeros(x.len(), params.len());
    let mut grad = vec![0.0; params.len()];
    for (i, (&xi, &wi)) in x.iter().zip(weight).enumerate() {
        kelvin_gradient(xi, a, b, &mut grad);
        for (k, g) in grad.iter().enumerate() {
            jac[(i, k)] = -wi * g;
        }
    }
    jac
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
