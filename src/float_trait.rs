use ndarray::LinalgScalar;
use num_traits::{FromPrimitive, NumAssign, float::FloatConst};

/// Floating-point scalar the filtering stack is generic over
///
/// Implemented for `f32` and `f64` only. Filter design always accumulates in
/// `f64` and converts on output, so both instantiations stay numerically
/// consistent.
pub trait Float:
    num_traits::Float + FloatConst + FromPrimitive + NumAssign + LinalgScalar + rustfft::FftNum
{
    /// Narrowing `f64` conversion, named apart from
    /// [FromPrimitive::from_f64] which is reachable through the supertraits
    fn from_f64_lossy(x: f64) -> Self;
}

impl Float for f32 {
    #[inline]
    fn from_f64_lossy(x: f64) -> Self {
        x as f32
    }
}

impl Float for f64 {
    #[inline]
    fn from_f64_lossy(x: f64) -> Self {
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // called through the trait bound, the way the filter stack resolves it
    fn narrow<T: Float>(x: f64) -> T {
        T::from_f64_lossy(x)
    }

    #[test]
    fn narrowing_resolves_and_rounds() {
        assert_eq!(narrow::<f64>(0.625), 0.625);
        assert_eq!(narrow::<f32>(0.625), 0.625f32);
        assert_eq!(narrow::<f32>(1.0 + 1e-12), 1.0f32);
    }
}
