use crate::error::ConvolutionError;
use crate::filter::FilterCoefficients;
use crate::float_trait::Float;

use enum_dispatch::enum_dispatch;
use ndarray::ArrayView1;
use num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Apply a symmetric FIR filter to a signal
///
/// Every engine computes the same filtered stream; they differ in output
/// framing. The time-domain engines drop the edge samples without complete
/// filter overlap, the FFT engine keeps the full circular result. On the
/// common index range all engines agree within 1e-5.
#[enum_dispatch]
pub trait ConvolveTrait: Send + Sync + Clone + Debug {
    fn convolve<T: Float>(
        &self,
        signal: &[T],
        coef: &FilterCoefficients<T>,
    ) -> Result<Vec<T>, ConvolutionError>;
}

/// Interchangeable convolution engine
///
/// Serializable, so a pipeline configuration can pick the engine by name.
#[enum_dispatch(ConvolveTrait)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConvolutionStrategy {
    Direct(DirectConvolution),
    Fft(FftConvolution),
    Windowed(WindowedDotConvolution),
}

impl ConvolutionStrategy {
    pub fn direct() -> Self {
        Self::Direct(DirectConvolution)
    }

    pub fn fft() -> Self {
        Self::Fft(FftConvolution)
    }

    pub fn windowed() -> Self {
        Self::Windowed(WindowedDotConvolution)
    }
}

fn check_length(n_samples: usize, n_coef: usize) -> Result<(), ConvolutionError> {
    if n_samples < n_coef {
        Err(ConvolutionError::SignalTooShort { n_samples, n_coef })
    } else {
        Ok(())
    }
}

/// Time-domain reference engine
///
/// Slides the filter across the signal and keeps only the positions with
/// complete overlap, so `n_terms` samples fall off each edge and the output
/// is `n - 2 * n_terms` long.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "Direct")]
pub struct DirectConvolution;

impl ConvolveTrait for DirectConvolution {
    fn convolve<T: Float>(
        &self,
        signal: &[T],
        coef: &FilterCoefficients<T>,
    ) -> Result<Vec<T>, ConvolutionError> {
        check_length(signal.len(), coef.len())?;
        let c = coef.as_slice();
        Ok((0..=signal.len() - c.len())
            .map(|start| {
                c.iter()
                    .enumerate()
                    .fold(T::zero(), |acc, (j, &cj)| acc + cj * signal[start + j])
            })
            .collect())
    }
}

/// Circular frequency-domain engine
///
/// Zero-pads the filter to the signal length with its center lag at the
/// middle of the buffer, multiplies the spectra and transforms back. The
/// output keeps all `n` samples; the circular rotation against
/// [DirectConvolution] is exposed through [FftConvolution::aligned_index].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "Fft")]
pub struct FftConvolution;

impl FftConvolution {
    /// Index in the circular output where direct-engine sample `i` lands
    #[inline]
    pub fn aligned_index(n_samples: usize, n_terms: usize, i: usize) -> usize {
        ((n_samples - 1) / 2 + n_terms + i) % n_samples
    }
}

impl ConvolveTrait for FftConvolution {
    fn convolve<T: Float>(
        &self,
        signal: &[T],
        coef: &FilterCoefficients<T>,
    ) -> Result<Vec<T>, ConvolutionError> {
        let n = signal.len();
        check_length(n, coef.len())?;

        let mut planner = FftPlanner::<T>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);

        let mut spectrum: Vec<_> = signal
            .iter()
            .map(|&x| Complex::new(x, T::zero()))
            .collect();
        forward.process(&mut spectrum);

        // length check above guarantees pad_start >= 0
        let pad_start = (n - 1) / 2 - coef.n_terms();
        let mut kernel = vec![Complex::new(T::zero(), T::zero()); n];
        for (k, &c) in coef.as_slice().iter().enumerate() {
            kernel[pad_start + k] = Complex::new(c, T::zero());
        }
        forward.process(&mut kernel);

        for (s, k) in spectrum.iter_mut().zip(kernel.iter()) {
            *s *= *k;
        }
        inverse.process(&mut spectrum);

        // rustfft leaves the inverse transform unscaled
        let scale = T::from_f64_lossy(1.0 / n as f64);
        Ok(spectrum.into_iter().map(|z| z.re * scale).collect())
    }
}

/// Window-contraction engine
///
/// Views the signal as overlapping windows of the filter length and
/// contracts each window with the coefficient vector. Output framing matches
/// [DirectConvolution].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename = "Windowed")]
pub struct WindowedDotConvolution;

impl ConvolveTrait for WindowedDotConvolution {
    fn convolve<T: Float>(
        &self,
        signal: &[T],
        coef: &FilterCoefficients<T>,
    ) -> Result<Vec<T>, ConvolutionError> {
        check_length(signal.len(), coef.len())?;
        let kernel = ArrayView1::from(coef.as_slice());
        let signal = ArrayView1::from(signal);
        Ok(signal
            .windows(coef.len())
            .into_iter()
            .map(|window| window.dot(&kernel))
            .collect())
    }
}
