//! Configuration loaded from environment variables

use std::path::PathBuf;

/// Report configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// First capture (`.bin`, complex64)
    pub capture_a: PathBuf,

    /// Sampling rate of the first capture in Hz
    pub sample_rate_a: f64,

    /// Optional second capture; enables the cross spectrum
    pub capture_b: Option<PathBuf>,

    /// Sampling rate of the second capture in Hz
    pub sample_rate_b: f64,

    /// Requested Welch segment length (clamped per capture)
    pub fft_points: usize,

    /// Where to write the JSON report (stdout when unset)
    pub report_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            capture_a: std::env::var("CAPTURE_A")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("SDR1_ch0.bin")),

            sample_rate_a: std::env::var("SAMPLE_RATE_A")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100.0),

            capture_b: std::env::var("CAPTURE_B").ok().map(PathBuf::from),

            sample_rate_b: std::env::var("SAMPLE_RATE_B")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100.0),

            fft_points: std::env::var("FFT_POINTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(32 * 128),

            report_path: std::env::var("REPORT_PATH").ok().map(PathBuf::from),
        }
    }
}
