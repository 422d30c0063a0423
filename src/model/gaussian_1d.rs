use crate::model::FitModel;

use nalgebra::{DMatrix, DVector};

const NPARAMS: usize = 3;

/// One-dimensional Gaussian
///
/// $$
/// y = A \exp\left(-\frac{(x - \mu)^2}{2\sigma^2}\right)
/// $$
///
/// Parameter order: `[amplitude, mean, stddev]`. `stddev == 0` is not
/// validated and yields non-finite predictions.
#[derive(Clone, Debug, PartialEq)]
pub struct Gaussian1D {
    params: DVector<f64>,
}

impl Gaussian1D {
    pub fn new(amplitude: f64, mean: f64, stddev: f64) -> Self {
        Self {
            params: DVector::from_column_slice(&[amplitude, mean, stddev]),
        }
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.params[0]
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.params[1]
    }

    #[inline]
    pub fn stddev(&self) -> f64 {
        self.params[2]
    }
}

impl Default for Gaussian1D {
    fn default() -> Self {
        Self::new(1.0, 0.0, 1.0)
    }
}

impl FitModel for Gaussian1D {
    fn inputs(&self) -> usize {
        NPARAMS
    }

    fn input_dim(&self) -> usize {
        1
    }

    fn params(&self) -> &DVector<f64> {
        &self.params
    }

    fn with_params(params: DVector<f64>) -> Self {
        assert_eq!(params.len(), NPARAMS, "Gaussian1D takes {NPARAMS} parameters");
        Self { params }
    }

    fn eval(&self, params: &DVector<f64>, x: &DMatrix<f64>) -> DVector<f64> {
        let (a, mean, stddev) = (params[0], params[1], params[2]);
        let inv_two_var = 0.5 / (stddev * stddev);
        DVector::from_iterator(
            x.nrows(),
            x.column(0)
                .iter()
                .map(|&t| a * f64::exp(-(t - mean).powi(2) * inv_two_var)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn peak_and_inflection_values() {
        let model = Gaussian1D::new(3.0, 1.0, 2.0);
        let x = DMatrix::from_column_slice(3, 1, &[1.0, 3.0, -1.0]);
        let y = model.predict(&x);

        assert_abs_diff_eq!(y[0], 3.0, epsilon = 1e-12);
        // one stddev away on both sides
        assert_abs_diff_eq!(y[1], 3.0 * f64::exp(-0.5), epsilon = 1e-12);
        assert_abs_diff_eq!(y[2], y[1], epsilon = 1e-12);
    }

    #[test]
    fn eval_ignores_stored_params() {
        let model = Gaussian1D::default();
        let trial = DVector::from_column_slice(&[2.0, 0.0, 1.0]);
        let x = DMatrix::from_column_slice(1, 1, &[0.0]);
        assert_abs_diff_eq!(model.eval(&trial, &x)[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(model.predict(&x)[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic]
    fn with_params_rejects_wrong_length() {
        let _ = Gaussian1D::with_params(DVector::from_column_slice(&[1.0, 2.0]));
    }
}
