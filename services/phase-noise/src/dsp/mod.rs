//! Phase-noise signal processing
//!
//! 1. Wrapped phase from I/Q (atan2)
//! 2. Unwrap with a 1.5π jump threshold
//! 3. Remove the linear trend (constant frequency offset)
//! 4. Welch-average Hann-windowed, per-segment detrended periodograms
//! 5. Convert to dBc/Hz

pub mod detrend;
pub mod unwrap;
pub mod welch;
mod window;

pub use detrend::detrend_linear;
pub use unwrap::{classify_wrap, unwrap_phase, wrapped_phase, PhaseExtractor, WRAP_THRESHOLD};
pub use welch::{
    phase_noise_dbc, CrossSpectralEstimator, CrossSpectrum, SpectralEstimator, Spectrum,
    SSB_CORRECTION_DB,
};
pub use window::{hann_window, window_energy};
