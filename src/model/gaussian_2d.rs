use crate::model::{FitModel, SurfaceModel};

use nalgebra::{DMatrix, DVector};

const NPARAMS: usize = 6;

/// Rotated elliptical two-dimensional Gaussian
///
/// $$
/// z = A \exp\left(-\left(a\,\Delta x^2 + 2b\,\Delta x \Delta y + c\,\Delta y^2\right)\right),
/// $$
/// with the quadratic form coefficients
/// $a = \cos^2\theta / 2\sigma_x^2 + \sin^2\theta / 2\sigma_y^2$,
/// $b = \sin 2\theta / 4\sigma_x^2 - \sin 2\theta / 4\sigma_y^2$,
/// $c = \sin^2\theta / 2\sigma_x^2 + \cos^2\theta / 2\sigma_y^2$.
///
/// Parameter order: `[amplitude, x_mean, y_mean, x_stddev, y_stddev, theta]`.
/// Zero stddevs are not validated and yield non-finite predictions.
#[derive(Clone, Debug, PartialEq)]
pub struct Gaussian2D {
    params: DVector<f64>,
}

impl Gaussian2D {
    pub fn new(
        amplitude: f64,
        x_mean: f64,
        y_mean: f64,
        x_stddev: f64,
        y_stddev: f64,
        theta: f64,
    ) -> Self {
        Self {
            params: DVector::from_column_slice(&[
                amplitude, x_mean, y_mean, x_stddev, y_stddev, theta,
            ]),
        }
    }

    #[inline]
    pub fn amplitude(&self) -> f64 {
        self.params[0]
    }

    #[inline]
    pub fn x_mean(&self) -> f64 {
        self.params[1]
    }

    #[inline]
    pub fn y_mean(&self) -> f64 {
        self.params[2]
    }

    #[inline]
    pub fn x_stddev(&self) -> f64 {
        self.params[3]
    }

    #[inline]
    pub fn y_stddev(&self) -> f64 {
        self.params[4]
    }

    #[inline]
    pub fn theta(&self) -> f64 {
        self.params[5]
    }
}

impl Default for Gaussian2D {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 1.0, 0.0)
    }
}

impl FitModel for Gaussian2D {
    fn inputs(&self) -> usize {
        NPARAMS
    }

    fn input_dim(&self) -> usize {
        2
    }

    fn params(&self) -> &DVector<f64> {
        &self.params
    }

    fn with_params(params: DVector<f64>) -> Self {
        assert_eq!(params.len(), NPARAMS, "Gaussian2D takes {NPARAMS} parameters");
        Self { params }
    }

    fn eval(&self, params: &DVector<f64>, xy: &DMatrix<f64>) -> DVector<f64> {
        let (amplitude, x_mean, y_mean) = (params[0], params[1], params[2]);
        let (x_stddev, y_stddev, theta) = (params[3], params[4], params[5]);

        let (sin_t, cos_t) = theta.sin_cos();
        let inv_two_xvar = 0.5 / (x_stddev * x_stddev);
        let inv_two_yvar = 0.5 / (y_stddev * y_stddev);
        let a = cos_t * cos_t * inv_two_xvar + sin_t * sin_t * inv_two_yvar;
        let b = sin_t * cos_t * (inv_two_xvar - inv_two_yvar);
        let c = sin_t * sin_t * inv_two_xvar + cos_t * cos_t * inv_two_yvar;

        DVector::from_iterator(
            xy.nrows(),
            xy.row_iter().map(|row| {
                let dx = row[0] - x_mean;
                let dy = row[1] - y_mean;
                amplitude * f64::exp(-(a * dx * dx + 2.0 * b * dx * dy + c * dy * dy))
            }),
        )
    }
}

impl SurfaceModel for Gaussian2D {}
