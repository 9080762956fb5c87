//! Serializable phase-noise report
//!
//! Carries the same curves the measurement script plots: each channel's
//! phase noise and, for a pair of channels, their cross spectrum. Bins with
//! zero power have a level of -inf, which serializes as `null`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::Result;

/// Single-channel phase-noise curve
#[derive(Debug, Clone, Serialize)]
pub struct ChannelReport {
    pub label: String,
    pub sampling_rate: f64,
    pub sample_count: usize,
    pub requested_segment_length: usize,
    pub segment_length: usize,
    pub segments_averaged: usize,
    /// Offset frequency in Hz
    pub frequency: Vec<f64>,
    /// dBc/Hz
    pub phase_noise: Vec<f64>,
}

impl From<&Dataset> for ChannelReport {
    fn from(dataset: &Dataset) -> Self {
        Self {
            label: dataset.label().to_string(),
            sampling_rate: dataset.sampling_rate(),
            sample_count: dataset.sample_count(),
            requested_segment_length: dataset.requested_segment_length(),
            segment_length: dataset.segment_length(),
            segments_averaged: dataset.segments_averaged(),
            frequency: dataset.frequency().to_vec(),
            phase_noise: dataset.phase_noise().to_vec(),
        }
    }
}

impl ChannelReport {
    /// Lowest finite level in dBc/Hz, ignoring the DC bin
    pub fn floor_dbc(&self) -> Option<f64> {
        self.phase_noise
            .iter()
            .skip(1)
            .copied()
            .filter(|v| v.is_finite())
            .reduce(f64::min)
    }
}

impl std::fmt::Display for ChannelReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} samples @ {} Hz, {} pts x {} segments",
            self.label,
            self.sample_count,
            self.sampling_rate,
            self.segment_length,
            self.segments_averaged
        )?;
        if let Some(floor) = self.floor_dbc() {
            write!(f, ", floor {:.1} dBc/Hz", floor)?;
        }
        Ok(())
    }
}

/// Cross spectrum between two channels
#[derive(Debug, Clone, Serialize)]
pub struct CrossReport {
    pub labels: [String; 2],
    pub segments_averaged: usize,
    pub frequency: Vec<f64>,
    /// |CSD| in dBc/Hz
    pub cross_spectrum: Vec<f64>,
}

impl CrossReport {
    pub fn between(a: &Dataset, b: &Dataset) -> Result<Self> {
        let cross = a.cross_spectrum(b)?;
        Ok(Self {
            labels: [a.label().to_string(), b.label().to_string()],
            segments_averaged: cross.segments,
            cross_spectrum: cross.to_dbc_per_hz(),
            frequency: cross.frequency,
        })
    }
}

/// Full report for one or two captures
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub channels: Vec<ChannelReport>,
    pub cross: Option<CrossReport>,
}

impl Report {
    /// Report one capture, plus the cross spectrum when a second is given
    pub fn build(first: &Dataset, second: Option<&Dataset>) -> Result<Self> {
        let mut channels = vec![ChannelReport::from(first)];
        let cross = match second {
            Some(other) => {
                channels.push(ChannelReport::from(other));
                Some(CrossReport::between(first, other)?)
            }
            None => None,
        };

        Ok(Self {
            generated_at: Utc::now(),
            channels,
            cross,
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
