//! Scalar / array dispatch for model inputs.
//!
//! Model evaluators accept either a single `x` or a whole array of them and
//! return the same shape they were given. [`Abscissa`] makes that dispatch
//! explicit: it exposes the raw values (for validation) and maps a scalar
//! function over them.

use nalgebra::DVector;

/// Independent-variable input for a model evaluator.
pub trait Abscissa {
    /// Shape of the evaluated output (`f64` for scalars, an array otherwise).
    type Output;

    /// All `x` values, in order.
    fn values(&self) -> &[f64];

    /// Apply `f` to every `x`, preserving the input shape.
    fn broadcast<F>(&self, f: F) -> Self::Output
    where
        F: FnMut(f64) -> f64;
}

impl Abscissa for f64 {
    type Output = f64;

    fn values(&self) -> &[f64] {
        std::slice::from_ref(self)
    }

    fn broadcast<F>(&self, mut f: F) -> f64
    where
        F: FnMut(f64) -> f64,
    {
        f(*self)
    }
}

impl Abscissa for [f64] {
    type Output = Vec<f64>;

    fn values(&self) -> &[f64] {
        self
    }

    fn broadcast<F>(&self, f: F) -> Vec<f64>
    where
        F: FnMut(f64) -> f64,
    {
        self.iter().copied().map(f).collect()
    }
}

impl Abscissa for Vec<f64> {
    type Output = Vec<f64>;

    fn values(&self) -> &[f64] {
        self.as_slice()
    }

    fn broadcast<F>(&self, f: F) -> Vec<f64>
    where
        F: FnMut(f64) -> f64,
    {
        self.as_slice().broadcast(f)
    }
}

impl<const N: usize> Abscissa for [f64; N] {
    type Output = [f64; N];

    fn values(&self) -> &[f64] {
        self.as_slice()
    }

    fn broadcast<F>(&self, f: F) -> [f64; N]
    where
        F: FnMut(f64) -> f64,
    {
        self.map(f)
    }
}

impl Abscissa for DVector<f64> {
    type Output = DVector<f64>;

    fn values(&self) -> &[f64] {
        self.as_slice()
    }

    fn broadcast<F>(&self, f: F) -> DVector<f64>
    where
        F: FnMut(f64) -> f64,
    {
        self.map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_and_array_shapes_are_preserved() {
        let scalar: f64 = 3.0_f64.broadcast(|x| x * 2.0);
        assert_eq!(scalar, 6.0);

        let array: [f64; 2] = [1.0, 2.0].broadcast(|x| x + 1.0);
        assert_eq!(array, [2.0, 3.0]);

        let v = vec![1.0, 4.0];
        assert_eq!(v.broadcast(f64::sqrt), vec![1.0, 2.0]);

        let d = DVector::from_vec(vec![1.0, -1.0]);
        assert_eq!(d.broadcast(f64::abs), DVector::from_vec(vec![1.0, 1.0]));
    }

    #[test]
    fn values_expose_scalar_as_single_element() {
        assert_eq!(2.5_f64.values(), &[2.5]);
    }
}
