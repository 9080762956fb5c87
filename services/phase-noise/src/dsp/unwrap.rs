//! Phase extraction and unwrapping
//!
//! Wrapped phase lives in (-π, π]. A true 2π wrap between two samples shows up
//! as a first difference near ±2π, so a jump is only treated as a wrap once it
//! reaches ±1.5π. Phase noise alone rarely moves that far in one sample.
//! The flip side: a genuine phase step smaller than 1.5π is never unwrapped.

use std::f64::consts::PI;

use num_complex::Complex32;

/// First-difference magnitude at which a jump counts as a 2π wrap (inclusive)
pub const WRAP_THRESHOLD: f64 = 1.5 * PI;

/// Classify one first difference: +1 positive wrap, -1 negative wrap, 0 none
#[inline]
pub fn classify_wrap(diff: f64) -> i64 {
    if diff >= WRAP_THRESHOLD {
        1
    } else if diff <= -WRAP_THRESHOLD {
        -1
    } else {
        0
    }
}

/// Wrapped phase angle of each sample, computed in f64
pub fn wrapped_phase(samples: &[Complex32]) -> Vec<f64> {
    samples
        .iter()
        .map(|s| (s.im as f64).atan2(s.re as f64))
        .collect()
}

/// Unwrap a wrapped phase series using the 1.5π threshold
///
/// Series shorter than two samples have no differences and come back as-is.
pub fn unwrap_phase(wrapped: &[f64]) -> Vec<f64> {
    let mut unwrapped = Vec::with_capacity(wrapped.len());
    let Some(&first) = wrapped.first() else {
        return unwrapped;
    };
    unwrapped.push(first);

    // Running wrap count up to (and including) the previous difference
    let mut wraps: i64 = 0;
    for pair in wrapped.windows(2) {
        wraps += classify_wrap(pair[1] - pair[0]);
        unwrapped.push(pair[1] - 2.0 * PI * wraps as f64);
    }

    unwrapped
}

/// Converts complex I/Q samples into an unwrapped phase series (radians)
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseExtractor;

impl PhaseExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, samples: &[Complex32]) -> Vec<f64> {
        unwrap_phase(&wrapped_phase(samples))
    }
}
