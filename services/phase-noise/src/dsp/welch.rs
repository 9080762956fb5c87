//! Welch power and cross spectral density estimation
//!
//! Segment policy shared by both estimators:
//! - Segments of `L` points overlapping by `L/2` (step `L - L/2`)
//! - Trailing samples that do not fill a whole segment are dropped
//! - Each segment is linearly detrended, then Hann windowed
//! - One-sided density: `|X_k|² / (fs · Σw²)`, doubled except at DC and
//!   the Nyquist bin (even `L` only), in rad²/Hz
//!
//! Reported phase noise is `10·log10(density) - 3` dBc/Hz.

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use tracing::debug;

use super::detrend::detrend_linear;
use super::window::{hann_window, window_energy};
use crate::error::{PhaseNoiseError, Result};

/// Fixed offset converting the one-sided density to single-sideband dBc/Hz
pub const SSB_CORRECTION_DB: f64 = 3.0;

/// Convert a one-sided phase PSD value (rad²/Hz) to dBc/Hz
#[inline]
pub fn phase_noise_dbc(density: f64) -> f64 {
    10.0 * density.log10() - SSB_CORRECTION_DB
}

/// Averaged one-sided power spectral density of one series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spectrum {
    /// Bin centers in Hz: `0, fs/L, ..., fs/2`
    pub frequency: Vec<f64>,
    /// Density per bin in rad²/Hz
    pub density: Vec<f64>,
    /// Number of periodograms averaged
    pub segments: usize,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Phase noise in dBc/Hz, one entry per bin
    pub fn to_dbc_per_hz(&self) -> Vec<f64> {
        self.density.iter().map(|&p| phase_noise_dbc(p)).collect()
    }
}

/// Averaged one-sided cross spectral density of two series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossSpectrum {
    pub frequency: Vec<f64>,
    /// Complex density per bin, `conj(X)·Y` convention
    pub density: Vec<Complex64>,
    pub segments: usize,
}

impl CrossSpectrum {
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Magnitude of the cross density per bin
    pub fn magnitude(&self) -> Vec<f64> {
        self.density.iter().map(|p| p.norm()).collect()
    }

    /// Cross spectrum magnitude in dBc/Hz, same convention as [`Spectrum`]
    pub fn to_dbc_per_hz(&self) -> Vec<f64> {
        self.density.iter().map(|p| phase_noise_dbc(p.norm())).collect()
    }
}

/// Welch PSD estimator for a fixed sampling rate and segment length
#[derive(Clone)]
pub struct SpectralEstimator {
    sampling_rate: f64,
    segment_length: usize,
    window: Vec<f64>,
    window_energy: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl SpectralEstimator {
    pub fn new(sampling_rate: f64, segment_length: usize) -> Result<Self> {
        if !(sampling_rate.is_finite() && sampling_rate > 0.0) {
            return Err(PhaseNoiseError::InvalidSamplingRate(sampling_rate));
        }
        if segment_length == 0 {
            return Err(PhaseNoiseError::InvalidSegmentLength);
        }
        Ok(Self::build(sampling_rate, segment_length))
    }

    /// Parameters already validated
    fn build(sampling_rate: f64, segment_length: usize) -> Self {
        let window = hann_window(segment_length);
        let window_energy = window_energy(&window);
        let fft = FftPlanner::<f64>::new().plan_fft_forward(segment_length);

        Self {
            sampling_rate,
            segment_length,
            window,
            window_energy,
            fft,
        }
    }

    pub fn sampling_rate(&self) -> f64 {
        self.sampling_rate
    }

    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Samples shared by consecutive segments
    pub fn overlap(&self) -> usize {
        self.segment_length / 2
    }

    pub fn step(&self) -> usize {
        self.segment_length - self.overlap()
    }

    /// Number of one-sided bins, `L/2 + 1`
    pub fn bins(&self) -> usize {
        self.segment_length / 2 + 1
    }

    /// Whole segments that fit in `len` samples
    pub fn segment_count(&self, len: usize) -> usize {
        if len < self.segment_length {
            0
        } else {
            (len - self.segment_length) / self.step() + 1
        }
    }

    /// Bin centers in Hz
    pub fn frequencies(&self) -> Vec<f64> {
        let resolution = self.sampling_rate / self.segment_length as f64;
        (0..self.bins()).map(|k| k as f64 * resolution).collect()
    }

    /// Welch PSD of `series`
    ///
    /// Series shorter than the segment length are analyzed as a single
    /// segment of their own length; an empty series yields an empty spectrum.
    pub fn psd(&self, series: &[f64]) -> Spectrum {
        if series.is_empty() {
            return Spectrum::default();
        }
        if series.len() < self.segment_length {
            debug!(
                "Segment length {} exceeds {} samples, clamping",
                self.segment_length,
                series.len()
            );
            return Self::build(self.sampling_rate, series.len()).psd(series);
        }

        let segments = self.segment_count(series.len());
        let mut accum = vec![0.0f64; self.bins()];

        for start in (0..segments).map(|s| s * self.step()) {
            let spectrum = self.segment_spectrum(&series[start..start + self.segment_length]);
            for (k, (a, x)) in accum.iter_mut().zip(spectrum.iter()).enumerate() {
                *a += x.norm_sqr() * self.density_scale(k);
            }
        }

        let inv = 1.0 / segments as f64;
        accum.iter_mut().for_each(|a| *a *= inv);

        debug!(
            "Welch PSD: {} segments of {} points at {} Hz",
            segments, self.segment_length, self.sampling_rate
        );

        Spectrum {
            frequency: self.frequencies(),
            density: accum,
            segments,
        }
    }

    /// Detrend, window and transform one segment, keeping the one-sided bins
    fn segment_spectrum(&self, segment: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = detrend_linear(segment)
            .iter()
            .zip(self.window.iter())
            .map(|(&x, &w)| Complex64::new(x * w, 0.0))
            .collect();

        self.fft.process(&mut buffer);
        buffer.truncate(self.bins());
        buffer
    }

    /// One-sided density normalization for bin `k`
    fn density_scale(&self, k: usize) -> f64 {
        let scale = 1.0 / (self.sampling_rate * self.window_energy);
        let nyquist = self.segment_length % 2 == 0 && k == self.segment_length / 2;
        if k == 0 || nyquist {
            scale
        } else {
            2.0 * scale
        }
    }
}

impl std::fmt::Debug for SpectralEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralEstimator")
            .field("sampling_rate", &self.sampling_rate)
            .field("segment_length", &self.segment_length)
            .field("window_energy", &self.window_energy)
            .finish()
    }
}

/// Welch cross spectral density estimator
///
/// Same segmentation, window and per-segment detrend as [`SpectralEstimator`],
/// averaging `conj(X)·Y` instead of `|X|²`.
#[derive(Debug, Clone)]
pub struct CrossSpectralEstimator {
    inner: SpectralEstimator,
}

impl CrossSpectralEstimator {
    pub fn new(sampling_rate: f64, segment_length: usize) -> Result<Self> {
        Ok(Self {
            inner: SpectralEstimator::new(sampling_rate, segment_length)?,
        })
    }

    pub fn segment_length(&self) -> usize {
        self.inner.segment_length()
    }

    pub fn sampling_rate(&self) -> f64 {
        self.inner.sampling_rate()
    }

    /// Welch CSD of `x` against `y`
    ///
    /// The shorter series is zero-padded to the length of the longer one.
    pub fn csd(&self, x: &[f64], y: &[f64]) -> CrossSpectrum {
        let len = x.len().max(y.len());
        if len == 0 {
            return CrossSpectrum::default();
        }
        if x.len() != y.len() {
            debug!("Zero-padding cross spectrum inputs ({} vs {} samples)", x.len(), y.len());
            return self.csd(&zero_padded(x, len), &zero_padded(y, len));
        }
        if len < self.inner.segment_length {
            debug!(
                "Segment length {} exceeds {} samples, clamping",
                self.inner.segment_length, len
            );
            let clamped = Self {
                inner: SpectralEstimator::build(self.inner.sampling_rate, len),
            };
            return clamped.csd(x, y);
        }

        let est = &self.inner;
        let segments = est.segment_count(len);
        let mut accum = vec![Complex64::new(0.0, 0.0); est.bins()];

        for start in (0..segments).map(|s| s * est.step()) {
            let end = start + est.segment_length;
            let sx = est.segment_spectrum(&x[start..end]);
            let sy = est.segment_spectrum(&y[start..end]);
            for (k, a) in accum.iter_mut().enumerate() {
                *a += sx[k].conj() * sy[k] * est.density_scale(k);
            }
        }

        let inv = 1.0 / segments as f64;
        accum.iter_mut().for_each(|a| *a *= inv);

        debug!(
            "Welch CSD: {} segments of {} points at {} Hz",
            segments, est.segment_length, est.sampling_rate
        );

        CrossSpectrum {
            frequency: est.frequencies(),
            density: accum,
            segments,
        }
    }
}

impl From<SpectralEstimator> for CrossSpectralEstimator {
    fn from(inner: SpectralEstimator) -> Self {
        Self { inner }
    }
}

fn zero_padded(series: &[f64], len: usize) -> Vec<f64> {
    let mut padded = series.to_vec();
    padded.resize(len, 0.0);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};
    use std::f64::consts::PI;

    fn white_noise(seed: u64, sigma: f64, len: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        (0..len).map(|_| normal.sample(&mut rng)).collect()
    }

    /// Direct DFT Welch estimate, written out longhand
    fn reference_psd(x: &[f64], fs: f64, l: usize) -> Vec<f64> {
        let step = l - l / 2;
        let window = hann_window(l);
        let energy: f64 = window.iter().map(|w| w * w).sum();
        let segments = (x.len() - l) / step + 1;
        let mut accum = vec![0.0; l / 2 + 1];

        for s in 0..segments {
            let seg = detrend_linear(&x[s * step..s * step + l]);
            for (k, a) in accum.iter_mut().enumerate() {
                let (mut re, mut im) = (0.0, 0.0);
                for n in 0..l {
                    let angle = -2.0 * PI * (k * n) as f64 / l as f64;
                    re += seg[n] * window[n] * angle.cos();
                    im += seg[n] * window[n] * angle.sin();
                }
                let mut p = (re * re + im * im) / (fs * energy);
                if k != 0 && !(l % 2 == 0 && k == l / 2) {
                    p *= 2.0;
                }
                *a += p;
            }
        }
        accum.iter().map(|a| a / segments as f64).collect()
    }

    fn relative_variance(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        var / (mean * mean)
    }

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    #[test]
    fn test_rejects_bad_parameters() {
        assert!(matches!(
            SpectralEstimator::new(0.0, 64),
            Err(PhaseNoiseError::InvalidSamplingRate(_))
        ));
        assert!(matches!(
            SpectralEstimator::new(f64::NAN, 64),
            Err(PhaseNoiseError::InvalidSamplingRate(_))
        ));
        assert!(matches!(
            SpectralEstimator::new(100.0, 0),
            Err(PhaseNoiseError::InvalidSegmentLength)
        ));
    }

    #[test]
    fn test_frequency_bins() {
        let est = SpectralEstimator::new(100.0, 8).unwrap();
        assert_eq!(est.frequencies(), vec![0.0, 12.5, 25.0, 37.5, 50.0]);

        let odd = SpectralEstimator::new(10.0, 5).unwrap();
        assert_eq!(odd.bins(), 3);
        assert_abs_diff_eq!(odd.frequencies()[2], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segment_count_drops_partial_tail() {
        let est = SpectralEstimator::new(1.0, 256).unwrap();
        assert_eq!(est.step(), 128);
        assert_eq!(est.segment_count(256), 1);
        assert_eq!(est.segment_count(383), 1);
        assert_eq!(est.segment_count(384), 2);
        assert_eq!(est.segment_count(1000), 6);
        assert_eq!(est.segment_count(100), 0);

        let odd = SpectralEstimator::new(1.0, 5).unwrap();
        assert_eq!(odd.overlap(), 2);
        assert_eq!(odd.step(), 3);
        assert_eq!(odd.segment_count(11), 3);
    }

    #[test]
    fn test_matches_direct_dft() {
        let x = white_noise(11, 1.0, 40);
        for l in [16usize, 15] {
            let est = SpectralEstimator::new(250.0, l).unwrap();
            let spectrum = est.psd(&x);
            let expected = reference_psd(&x, 250.0, l);

            assert_eq!(spectrum.segments, (40 - l) / (l - l / 2) + 1);
            assert_eq!(spectrum.density.len(), expected.len());
            for (got, want) in spectrum.density.iter().zip(expected.iter()) {
                assert_relative_eq!(*got, *want, max_relative = 1e-9, epsilon = 1e-15);
            }
        }
    }

    #[test]
    fn test_white_noise_level() {
        let sigma = 0.01;
        let fs = 1000.0;
        let x = white_noise(3, sigma, 65536);
        let spectrum = SpectralEstimator::new(fs, 1024).unwrap().psd(&x);

        // One-sided white density is 2σ²/fs
        let expected = 2.0 * sigma * sigma / fs;
        let level = mean(&spectrum.density[4..512]);
        assert_relative_eq!(level, expected, max_relative = 0.05);
    }

    #[test]
    fn test_averaging_reduces_variance() {
        let x = white_noise(5, 1.0, 65536);
        let est = SpectralEstimator::new(1.0, 1024).unwrap();

        let single = est.psd(&x[..1024]);
        let averaged = est.psd(&x);
        assert_eq!(single.segments, 1);
        assert_eq!(averaged.segments, 127);

        let single_var = relative_variance(&single.density[4..512]);
        let averaged_var = relative_variance(&averaged.density[4..512]);

        assert!(single_var > 0.5, "single segment relative variance {}", single_var);
        assert!(averaged_var < 0.05, "averaged relative variance {}", averaged_var);
        assert!(single_var / averaged_var > 20.0);
    }

    #[test]
    fn test_dbc_conversion() {
        assert_abs_diff_eq!(phase_noise_dbc(1.0), -3.0);
        assert_abs_diff_eq!(phase_noise_dbc(1e-3), -33.0, epsilon = 1e-12);
        assert_eq!(phase_noise_dbc(0.0), f64::NEG_INFINITY);

        let x = white_noise(9, 1.0, 4096);
        let spectrum = SpectralEstimator::new(100.0, 256).unwrap().psd(&x);
        let dbc = spectrum.to_dbc_per_hz();
        assert_eq!(dbc.len(), spectrum.len());
        for (db, p) in dbc.iter().zip(spectrum.density.iter()) {
            assert_abs_diff_eq!(*db, 10.0 * p.log10() - 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_short_series_is_clamped() {
        let x = white_noise(1, 1.0, 10);
        let spectrum = SpectralEstimator::new(100.0, 64).unwrap().psd(&x);

        assert_eq!(spectrum.segments, 1);
        assert_eq!(spectrum.len(), 6);
        assert_abs_diff_eq!(spectrum.frequency[5], 50.0, epsilon = 1e-12);
        assert!(SpectralEstimator::new(100.0, 64).unwrap().psd(&[]).is_empty());
    }

    #[test]
    fn test_csd_of_identical_series_is_psd() {
        let x = white_noise(21, 0.5, 8192);
        let psd = SpectralEstimator::new(50.0, 512).unwrap().psd(&x);
        let csd = CrossSpectralEstimator::new(50.0, 512).unwrap().csd(&x, &x);

        assert_eq!(csd.frequency, psd.frequency);
        assert_eq!(csd.segments, psd.segments);
        for (c, p) in csd.density.iter().zip(psd.density.iter()) {
            assert_relative_eq!(c.re, *p, max_relative = 1e-12);
            assert_abs_diff_eq!(c.im, 0.0, epsilon = 1e-18);
        }
        for (c, p) in csd.to_dbc_per_hz().iter().zip(psd.to_dbc_per_hz().iter()) {
            assert_abs_diff_eq!(*c, *p, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_csd_of_independent_noise_falls_with_averaging() {
        let est = CrossSpectralEstimator::new(1.0, 1024).unwrap();
        let psd = SpectralEstimator::new(1.0, 1024).unwrap();

        let excess = |len: usize| {
            let x = white_noise(100, 1.0, len);
            let y = white_noise(200, 1.0, len);
            let cross = est.csd(&x, &y).to_dbc_per_hz();
            let own = psd.psd(&x).to_dbc_per_hz();
            let diff: Vec<f64> = cross[4..512]
                .iter()
                .zip(own[4..512].iter())
                .map(|(c, o)| c - o)
                .collect();
            mean(&diff)
        };

        let few = excess(1024 * 4);
        let many = excess(1024 * 64);

        assert!(few < 0.0, "few-segment excess {} dB", few);
        assert!(many < -6.0, "many-segment excess {} dB", many);
        assert!(many < few - 2.0, "{} dB vs {} dB", many, few);
    }

    #[test]
    fn test_csd_zero_pads_shorter_series() {
        let x = white_noise(31, 1.0, 600);
        let y = white_noise(32, 1.0, 450);
        let est = CrossSpectralEstimator::new(10.0, 128).unwrap();

        let mut padded = y.clone();
        padded.resize(600, 0.0);

        assert_eq!(est.csd(&x, &y), est.csd(&x, &padded));
        assert_eq!(est.csd(&x, &y).segments, 8);
    }
}
