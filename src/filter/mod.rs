//! Kaiser-windowed sinc band-pass design and interchangeable convolution engines
//!
//! [design_filter] builds a zero-phase FIR band-pass from pass-band edges in
//! Nyquist units and a sidelobe attenuation request. The resulting
//! [FilterCoefficients] feed any of three [ConvolutionStrategy] engines:
//! a time-domain reference, a circular FFT path and an `ndarray`
//! window-contraction path. All engines agree element-wise within 1e-5 on
//! their common index range, so callers choose by output framing and speed.

mod convolve;
pub use convolve::{
    ConvolutionStrategy, ConvolveTrait, DirectConvolution, FftConvolution, WindowedDotConvolution,
};

mod design;
pub use design::{FilterCoefficients, design_filter};
