//! Phase-noise dataset for a single capture
//!
//! Construction runs the whole time-domain chain once (wrapped phase, unwrap,
//! linear detrend) and then computes the spectral view. The phase and time
//! series never change afterwards; the spectral view is recomputed eagerly
//! whenever the segment length changes.

use std::path::Path;

use num_complex::Complex32;
use tracing::debug;

use crate::dsp::{
    detrend_linear, CrossSpectralEstimator, CrossSpectrum, PhaseExtractor, SpectralEstimator,
    Spectrum,
};
use crate::error::{PhaseNoiseError, Result};
use crate::source::{BinFileSource, MemorySource, SampleSource};

/// Derived phase-noise characterization of one capture
#[derive(Debug, Clone)]
pub struct Dataset {
    label: String,
    sampling_rate: f64,
    /// Unwrapped, detrended phase in radians
    phase: Vec<f64>,
    time: Vec<f64>,
    /// Segment length as asked for by the caller
    requested_segment_length: usize,
    /// Segment length actually applied (never above the sample count)
    segment_length: usize,
    spectrum: Spectrum,
    /// dBc/Hz per bin of `spectrum`
    phase_noise: Vec<f64>,
}

impl Dataset {
    /// Segment length used when callers have no preference
    pub const DEFAULT_SEGMENT_LENGTH: usize = 256;

    /// Build a dataset from any sample source
    pub fn new<S: SampleSource + ?Sized>(
        source: &S,
        sampling_rate: f64,
        segment_length: usize,
    ) -> Result<Self> {
        let samples = source.read_samples()?;
        Self::build(source.label(), &samples, sampling_rate, segment_length)
    }

    /// Build a dataset from a headerless complex64 `.bin` capture
    pub fn from_file(path: impl AsRef<Path>, sampling_rate: f64, segment_length: usize) -> Result<Self> {
        Self::new(&BinFileSource::new(path), sampling_rate, segment_length)
    }

    /// Build a dataset from samples already in memory
    pub fn from_samples(samples: &[Complex32], sampling_rate: f64, segment_length: usize) -> Result<Self> {
        Self::build(MemorySource::LABEL.to_string(), samples, sampling_rate, segment_length)
    }

    fn build(
        label: String,
        samples: &[Complex32],
        sampling_rate: f64,
        requested_segment_length: usize,
    ) -> Result<Self> {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(PhaseNoiseError::InvalidSamplingRate(sampling_rate));
        }
        if requested_segment_length == 0 {
            return Err(PhaseNoiseError::InvalidSegmentLength);
        }

        // Linear detrend removes the constant frequency offset between oscillators
        let phase = detrend_linear(&PhaseExtractor::new().extract(samples));
        let time = (0..phase.len()).map(|i| i as f64 / sampling_rate).collect();

        let mut dataset = Self {
            label,
            sampling_rate,
            phase,
            time,
            requested_segment_length,
            segment_length: 0,
            spectrum: Spectrum::default(),
            phase_noise: Vec::new(),
        };
        dataset.apply_segment_length(requested_segment_length)?;

        debug!(
            "Dataset {}: {} samples at {} Hz, segment length {} (requested {})",
            dataset.label,
            dataset.sample_count(),
            dataset.sampling_rate,
            dataset.segment_length,
            dataset.requested_segment_length
        );

        Ok(dataset)
    }

    /// Change the requested segment length and recompute the spectral view
    ///
    /// Lengths above the sample count are clamped, as at construction.
    pub fn set_segment_length(&mut self, segment_length: usize) -> Result<()> {
        if segment_length == 0 {
            return Err(PhaseNoiseError::InvalidSegmentLength);
        }
        self.apply_segment_length(segment_length)
    }

    fn apply_segment_length(&mut self, requested: usize) -> Result<()> {
        self.requested_segment_length = requested;
        self.segment_length = requested.min(self.phase.len());
        if self.segment_length < requested {
            debug!(
                "Segment length {} clamped to {} available samples",
                requested, self.segment_length
            );
        }
        self.compute_phase_noise()
    }

    /// Recompute `frequency` and `phase_noise` from the current segment length
    ///
    /// Fewer than two points per segment leaves both empty.
    pub fn compute_phase_noise(&mut self) -> Result<()> {
        if self.segment_length < 2 {
            self.spectrum = Spectrum::default();
            self.phase_noise = Vec::new();
            return Ok(());
        }

        let estimator = SpectralEstimator::new(self.sampling_rate, self.segment_length)?;
        let spectrum = estimator.psd(&self.phase);
        self.phase_noise = spectrum.to_dbc_per_hz();
        self.spectrum = spectrum;
        Ok(())
    }

    /// Complex cross spectral density against another dataset
    ///
    /// Both datasets must share a sampling rate and an effective segment length.
    pub fn cross_spectrum(&self, other: &Dataset) -> Result<CrossSpectrum> {
        if self.sampling_rate != other.sampling_rate {
            return Err(PhaseNoiseError::SamplingRateMismatch {
                left: self.sampling_rate,
                right: other.sampling_rate,
            });
        }
        if self.segment_length != other.segment_length {
            return Err(PhaseNoiseError::SegmentLengthMismatch {
                left: self.segment_length,
                right: other.segment_length,
            });
        }
        if self.segment_length < 2 {
            return Ok(CrossSpectrum::default());
        }

        let estimator = CrossSpectralEstimator::new(self.sampling_rate, self.segment_length)?;
        Ok(estimator.csd(&self.phase, &other.phase))
    }

    /// Cross spectrum as (frequency bins, dBc/Hz), the form plotted next to `phase_noise`
    pub fn xspec_with(&self, other: &Dataset) -> Result<(Vec<f64>, Vec<f64>)> {
        let cross = self.cross_spectrum(other)?;
        let dbc = cross.to_dbc_per_hz();
        Ok((cross.frequency, dbc))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn sample_count(&self) -> usize {
        self.phase.len()
    }

    pub fn phase(&self) -> &[f64] {
        &self.phase
    }

    /// Sample times in seconds, `i / fs`
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    pub fn requested_segment_length(&self) -> usize {
        self.requested_segment_length
    }

    pub fn frequency(&self) -> &[f64] {
        &self.spectrum.frequency
    }

    /// Phase PSD in rad²/Hz
    pub fn psd(&self) -> &[f64] {
        &self.spectrum.density
    }

    /// Phase noise in dBc/Hz
    pub fn phase_noise(&self) -> &[f64] {
        &self.phase_noise
    }

    pub fn segments_averaged(&self) -> usize {
        self.spectrum.segments
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }
}
