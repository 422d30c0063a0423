#![doc = include_str!("../README.md")]

mod error;
pub use error::ConvolutionError;

mod float_trait;
pub use float_trait::Float;

pub mod curve_fit;
pub use curve_fit::{
    FitResult, FitStatus, LmOptions, WeightedResiduals, curve_fit, curve_fit_with_options,
};

pub mod filter;
pub use filter::{
    ConvolutionStrategy, ConvolveTrait, DirectConvolution, FftConvolution, FilterCoefficients,
    WindowedDotConvolution, design_filter,
};

pub mod model;
pub use model::{FitModel, Gaussian1D, Gaussian2D, SurfaceModel};

pub use nalgebra;
pub use ndarray;
