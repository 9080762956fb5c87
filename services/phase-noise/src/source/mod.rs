//! Complex I/Q sample sources
//!
//! A capture is a flat run of complex64 samples:
//! 1. Each sample is two little-endian f32 values, real then imaginary
//! 2. No header or metadata
//! 3. Byte length must be a multiple of 8

mod file;

pub use file::BinFileSource;

use num_complex::Complex32;

use crate::error::{PhaseNoiseError, Result};

/// Bytes per complex64 sample (f32 I + f32 Q)
pub const BYTES_PER_SAMPLE: usize = 8;

/// Anything that can hand over an ordered run of complex samples
pub trait SampleSource {
    /// Read every sample of the capture, in order
    fn read_samples(&self) -> Result<Vec<Complex32>>;

    /// Human-readable name used in logs and reports
    fn label(&self) -> String;
}

/// Samples already resident in memory
#[derive(Debug, Clone)]
pub struct MemorySource {
    samples: Vec<Complex32>,
}

impl MemorySource {
    pub const LABEL: &'static str = "memory";

    pub fn new(samples: Vec<Complex32>) -> Self {
        Self { samples }
    }
}

impl SampleSource for MemorySource {
    fn read_samples(&self) -> Result<Vec<Complex32>> {
        Ok(self.samples.clone())
    }

    fn label(&self) -> String {
        Self::LABEL.to_string()
    }
}

impl From<Vec<Complex32>> for MemorySource {
    fn from(samples: Vec<Complex32>) -> Self {
        Self::new(samples)
    }
}

/// Decode a raw complex64 byte stream into samples
///
/// Rejects streams that end partway through a sample rather than dropping
/// the tail.
pub fn decode_samples(bytes: &[u8]) -> Result<Vec<Complex32>> {
    if bytes.len() % BYTES_PER_SAMPLE != 0 {
        return Err(PhaseNoiseError::TruncatedCapture { len: bytes.len() });
    }

    let samples = bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|chunk| {
            let re = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let im = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            Complex32::new(re, im)
        })
        .collect();

    Ok(samples)
}
