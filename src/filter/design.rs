use crate::float_trait::Float;

/// Symmetric FIR band-pass coefficient vector
///
/// Holds `2 * n_terms + 1` coefficients mirrored around the center lag, as
/// produced by [design_filter]. The mirror symmetry makes the filter
/// zero-phase, so none of the convolution engines need to reverse it.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCoefficients<T> {
    coef: Vec<T>,
    n_terms: usize,
}

impl<T: Float> FilterCoefficients<T> {
    /// One-sided lag count; the coefficient vector is `2 * n_terms + 1` long
    #[inline]
    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.coef.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coef.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.coef
    }
}

/// Modified Bessel function of the first kind, order zero
///
/// Abramowitz & Stegun 9.8.1 / 9.8.2 polynomial approximations, accurate to
/// a few 1e-7 relative over the whole real line.
fn bessel_i0(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 3.75 {
        let t = (x / 3.75).powi(2);
        1.0 + t
            * (3.5156229
                + t * (3.0899424
                    + t * (1.2067492 + t * (0.2659732 + t * (0.0360768 + t * 0.0045813)))))
    } else {
        let t = 3.75 / ax;
        (ax.exp() / ax.sqrt())
            * (0.39894228
                + t * (0.01328592
                    + t * (0.00225319
                        + t * (-0.00157565
                            + t * (0.00916281
                                + t * (-0.02057706
                                    + t * (0.02635537 + t * (-0.01647633 + t * 0.00392377))))))))
    }
}

/// Kaiser shape parameter for a requested sidelobe attenuation in dB
///
/// `a_gibbs <= 21` degenerates to a rectangular window.
fn kaiser_shape(a_gibbs: f64) -> f64 {
    if a_gibbs <= 21.0 {
        0.0
    } else if a_gibbs >= 50.0 {
        // exactly 50 dB belongs to this branch; the recorded reference
        // output in tests/data was produced with this boundary assignment
        0.1102 * (a_gibbs - 8.7)
    } else {
        0.5842 * (a_gibbs - 21.0).powf(0.4) + 0.07886 * (a_gibbs - 21.0)
    }
}

/// Design a Kaiser-windowed sinc band-pass filter
///
/// `f_low` and `f_high` are pass-band edges in Nyquist units, so `1.0` is
/// half the sampling rate. `a_gibbs` is the requested sidelobe attenuation in
/// dB and controls the window taper. The result has `2 * n_terms + 1`
/// coefficients: the center lag carries `f_high - f_low` and lag `k` carries
/// the windowed ideal-band-pass kernel
/// `(sin(k pi f_high) - sin(k pi f_low)) / (k pi)`, mirrored to both sides.
///
/// Accumulation is always in `f64`; the `f32` instantiation only rounds on
/// output. The caller is responsible for `0 <= f_low < f_high <= 1` and
/// `n_terms >= 1`; degenerate inputs are not validated and produce a
/// degenerate filter rather than an error.
pub fn design_filter<T: Float>(
    f_low: f64,
    f_high: f64,
    a_gibbs: f64,
    n_terms: usize,
) -> FilterCoefficients<T> {
    let alpha = kaiser_shape(a_gibbs);
    let i0_alpha = bessel_i0(alpha);

    let n_coef = 2 * n_terms + 1;
    let mut coef = vec![T::zero(); n_coef];
    coef[n_terms] = T::from_f64_lossy(f_high - f_low);
    for k in 1..=n_terms {
        let fraction = k as f64 / n_terms as f64;
        let window = bessel_i0(alpha * (1.0 - fraction * fraction).sqrt()) / i0_alpha;
        let k_pi = k as f64 * std::f64::consts::PI;
        let ideal = ((k_pi * f_high).sin() - (k_pi * f_low).sin()) / k_pi;
        let c = T::from_f64_lossy(window * ideal);
        coef[n_terms + k] = c;
        coef[n_terms - k] = c;
    }

    FilterCoefficients { coef, n_terms }
}
