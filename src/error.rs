/// Error returned from [convolution engines](crate::ConvolutionStrategy)
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConvolutionError {
    #[error("signal length {n_samples} is shorter than the filter length {n_coef}")]
    SignalTooShort { n_samples: usize, n_coef: usize },
}
