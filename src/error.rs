use std::path::PathBuf;

pub type Result<T, E = PostError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("resource not found: {}", path.display())]
    ResourceNotFound { path: PathBuf },

    #[error("failed to decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("invalid filter spec: {0}")]
    InvalidFilterSpec(String),

    #[error("shape mismatch: expected {expected} samples, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("resampling failed: {0}")]
    Resample(String),

    #[error("FFT failed: {0}")]
    Fft(#[from] realfft::FftError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
