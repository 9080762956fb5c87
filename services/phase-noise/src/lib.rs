//! Phase noise characterization of dual-receiver I/Q captures
//!
//! Turns raw complex baseband captures into:
//! 1. A cleaned (unwrapped, detrended) phase time series
//! 2. A single-channel phase-noise spectrum in dBc/Hz (Welch)
//! 3. A cross spectrum between two channels, which averages down noise the
//!    two receivers do not share and keeps the device-under-test noise they do

pub mod config;
pub mod dataset;
pub mod dsp;
pub mod error;
pub mod report;
pub mod source;

pub use dataset::Dataset;
pub use dsp::{CrossSpectralEstimator, CrossSpectrum, PhaseExtractor, SpectralEstimator, Spectrum};
pub use error::{PhaseNoiseError, Result};
pub use report::{ChannelReport, CrossReport, Report};
pub use source::{BinFileSource, MemorySource, SampleSource};
