//! Headerless complex64 capture files (`.bin`) as written by the receivers

use std::path::{Path, PathBuf};

use num_complex::Complex32;
use tracing::debug;

use super::{decode_samples, SampleSource};
use crate::error::{PhaseNoiseError, Result};

/// Capture stored on disk as raw little-endian complex64 samples
#[derive(Debug, Clone)]
pub struct BinFileSource {
    path: PathBuf,
}

impl BinFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SampleSource for BinFileSource {
    fn read_samples(&self) -> Result<Vec<Complex32>> {
        let bytes = std::fs::read(&self.path).map_err(|source| PhaseNoiseError::Io {
            path: self.path.clone(),
            source,
        })?;

        let samples = decode_samples(&bytes)?;
        debug!(
            "Loaded {} samples ({} bytes) from {}",
            samples.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(samples)
    }

    fn label(&self) -> String {
        self.path.display().to_string()
    }
}
