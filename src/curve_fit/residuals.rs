use crate::model::FitModel;

use nalgebra::{DMatrix, DVector};

/// Weighted residual functor binding a model to observed data
///
/// Borrows one model, one x-data mesh, one y-data vector and one sigma
/// vector for the duration of a fit; nothing is copied, so the bindings
/// cannot outlive the caller's buffers. For a trial parameter vector `p` the
/// residual is `(ydata - model.eval(p, xdata)) / sigma` element-wise.
pub struct WeightedResiduals<'a, M> {
    model: &'a M,
    xdata: &'a DMatrix<f64>,
    ydata: &'a DVector<f64>,
    sigma: &'a DVector<f64>,
}

impl<'a, M> WeightedResiduals<'a, M>
where
    M: FitModel,
{
    /// Bind a model to observed data
    ///
    /// Panics unless `xdata`, `ydata` and `sigma` share the sample count and
    /// `xdata` has one column per model input dimension.
    pub fn new(
        model: &'a M,
        xdata: &'a DMatrix<f64>,
        ydata: &'a DVector<f64>,
        sigma: &'a DVector<f64>,
    ) -> Self {
        assert_eq!(
            xdata.nrows(),
            ydata.len(),
            "xdata and ydata sample counts differ"
        );
        assert_eq!(
            ydata.len(),
            sigma.len(),
            "ydata and sigma sample counts differ"
        );
        assert_eq!(
            xdata.ncols(),
            model.input_dim(),
            "xdata column count differs from the model input dimensionality"
        );
        Self {
            model,
            xdata,
            ydata,
            sigma,
        }
    }

    /// Number of free parameters
    pub fn inputs(&self) -> usize {
        self.model.inputs()
    }

    /// Number of residuals, i.e. the sample count
    pub fn values(&self) -> usize {
        self.ydata.len()
    }

    /// Weighted residual vector at trial parameters `p`
    pub fn residuals(&self, p: &DVector<f64>) -> DVector<f64> {
        (self.ydata - self.model.eval(p, self.xdata)).component_div(self.sigma)
    }

    /// Forward-difference Jacobian of the residual vector at `p`
    ///
    /// `r0` must be the residual vector already evaluated at `p`. The step is
    /// `sqrt(eps) * |p_j|`, floored at `sqrt(eps)` for vanishing parameters.
    pub fn jacobian(&self, p: &DVector<f64>, r0: &DVector<f64>) -> DMatrix<f64> {
        let sqrt_eps = f64::EPSILON.sqrt();
        let mut jac = DMatrix::zeros(self.values(), self.inputs());
        let mut p_step = p.clone();
        for j in 0..self.inputs() {
            let mut h = sqrt_eps * p[j].abs();
            if h == 0.0 {
                h = sqrt_eps;
            }
            p_step[j] = p[j] + h;
            let r_step = self.residuals(&p_step);
            p_step[j] = p[j];
            jac.set_column(j, &((r_step - r0) / h));
        }
        jac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gaussian1D;

    use approx::assert_abs_diff_eq;

    fn data() -> (DMatrix<f64>, DVector<f64>, DVector<f64>) {
        let x = DMatrix::from_fn(11, 1, |i, _| -2.5 + 0.5 * i as f64);
        let y = Gaussian1D::new(2.0, 0.0, 1.0).predict(&x);
        let sigma = DVector::from_element(11, 0.5);
        (x, y, sigma)
    }

    #[test]
    fn residuals_vanish_at_generating_params() {
        let model = Gaussian1D::new(2.0, 0.0, 1.0);
        let (x, y, sigma) = data();
        let functor = WeightedResiduals::new(&model, &x, &y, &sigma);
        let r = functor.residuals(model.params());
        assert_eq!(r.len(), functor.values());
        assert_abs_diff_eq!(r.norm(), 0.0, epsilon = 1e-14);
    }

    #[test]
    fn residuals_are_sigma_weighted() {
        let model = Gaussian1D::new(2.0, 0.0, 1.0);
        let (x, y, sigma) = data();
        let functor = WeightedResiduals::new(&model, &x, &y, &sigma);
        let p = DVector::from_column_slice(&[1.0, 0.0, 1.0]);
        let r = functor.residuals(&p);
        // at the mean: (2 - 1) / 0.5
        assert_abs_diff_eq!(r[5], 2.0, epsilon = 1e-14);
    }

    #[test]
    fn jacobian_matches_analytic_amplitude_column() {
        let model = Gaussian1D::new(2.0, 0.0, 1.0);
        let (x, y, sigma) = data();
        let functor = WeightedResiduals::new(&model, &x, &y, &sigma);
        let p = DVector::from_column_slice(&[1.5, 0.1, 0.9]);
        let r0 = functor.residuals(&p);
        let jac = functor.jacobian(&p, &r0);

        // d residual / d amplitude = -exp(...) / sigma, exact in the unit-amplitude model
        let unit = Gaussian1D::new(1.0, p[1], p[2]);
        let shape = unit.predict(&x);
        for i in 0..functor.values() {
            assert_abs_diff_eq!(jac[(i, 0)], -shape[i] / sigma[i], epsilon = 1e-6);
        }
    }

    #[test]
    #[should_panic]
    fn mismatched_sample_counts_are_rejected() {
        let model = Gaussian1D::default();
        let (x, y, _) = data();
        let sigma = DVector::from_element(7, 1.0);
        let _ = WeightedResiduals::new(&model, &x, &y, &sigma);
    }
}
