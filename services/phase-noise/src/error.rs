//! Error types for capture loading and spectral analysis

use std::path::PathBuf;

/// Errors raised while loading captures or analyzing them
#[derive(Debug, thiserror::Error)]
pub enum PhaseNoiseError {
    /// Capture file missing or unreadable
    #[error("failed to read capture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Byte stream does not hold a whole number of complex64 samples
    #[error("capture is {len} bytes, not a whole number of 8-byte complex samples")]
    TruncatedCapture { len: usize },

    #[error("sampling rate must be positive and finite, got {0} Hz")]
    InvalidSamplingRate(f64),

    #[error("segment length must be at least one sample")]
    InvalidSegmentLength,

    /// Cross spectrum requested between captures sampled at different rates
    #[error("sampling rates differ: {left} Hz vs {right} Hz")]
    SamplingRateMismatch { left: f64, right: f64 },

    /// Cross spectrum requested between datasets with different effective segment lengths
    #[error("segment lengths differ: {left} vs {right} points")]
    SegmentLengthMismatch { left: usize, right: usize },
}

pub type Result<T> = std::result::Result<T, PhaseNoiseError>;
