//! Parametric models evaluated over sample meshes
//!
//! A model maps a parameter vector plus a matrix of independent-variable
//! samples (one row per sample, one column per input dimension) to a vector
//! of predicted values. Evaluation is pure: the solver probes trial parameter
//! vectors through [FitModel::eval] without ever mutating the model, and a
//! fit produces a fresh instance via [FitModel::with_params].

use itertools::iproduct;
use nalgebra::{DMatrix, DVector};

mod gaussian_1d;
pub use gaussian_1d::Gaussian1D;

mod gaussian_2d;
pub use gaussian_2d::Gaussian2D;

/// Contract shared by all parametric models
pub trait FitModel: Clone {
    /// Number of free parameters
    fn inputs(&self) -> usize;

    /// Dimensionality of the independent variable, i.e. the number of columns
    /// an evaluation mesh must have
    fn input_dim(&self) -> usize;

    /// Current parameter vector, always of length [FitModel::inputs]
    fn params(&self) -> &DVector<f64>;

    /// Construct a new instance from an explicit parameter vector
    ///
    /// Panics if the vector length does not match the declared parameter
    /// count.
    fn with_params(params: DVector<f64>) -> Self;

    /// Evaluate the model with trial parameters `params` on the mesh `x`,
    /// returning one predicted value per row of `x`
    ///
    /// Must be pure: neither `params` nor `x` is mutated, and the stored
    /// parameter vector is ignored.
    fn eval(&self, params: &DVector<f64>, x: &DMatrix<f64>) -> DVector<f64>;

    /// Evaluate with the stored parameter vector
    fn predict(&self, x: &DMatrix<f64>) -> DVector<f64> {
        self.eval(self.params(), x)
    }
}

/// Capability of models defined over a two-dimensional domain
///
/// Only models with `input_dim() == 2` implement this trait, which makes the
/// mesh expansion a compile-time capability rather than a runtime check.
pub trait SurfaceModel: FitModel {
    /// Expand per-axis coordinate vectors into a flat `(nx * ny, 2)` sample
    /// mesh
    ///
    /// Row `k` holds `(x[k % nx], y[k / nx])`: the first axis cycles fastest,
    /// so a flat evaluation over the mesh reshapes row-major into an
    /// `(ny, nx)` matrix. [SurfaceModel::eval_on_axes] relies on exactly this
    /// ordering.
    fn meshgrid(x: &DVector<f64>, y: &DVector<f64>) -> DMatrix<f64> {
        let (nx, ny) = (x.len(), y.len());
        let mut xy = DMatrix::zeros(nx * ny, 2);
        for (k, (&yv, &xv)) in iproduct!(y.iter(), x.iter()).enumerate() {
            xy[(k, 0)] = xv;
            xy[(k, 1)] = yv;
        }
        xy
    }

    /// Evaluate on separate axis vectors, reshaping the flat result into an
    /// `(ny, nx)` matrix: entry `(i, j)` is the model value at
    /// `(x[j], y[i])`
    fn eval_on_axes(
        &self,
        params: &DVector<f64>,
        x: &DVector<f64>,
        y: &DVector<f64>,
    ) -> DMatrix<f64> {
        let nx = x.len();
        let flat = self.eval(params, &Self::meshgrid(x, y));
        DMatrix::from_fn(y.len(), nx, |i, j| flat[i * nx + j])
    }
}
