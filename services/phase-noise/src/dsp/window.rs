//! Hann window for Welch segments

use std::f64::consts::PI;

/// Periodic (DFT-even) Hann window of `size` points
pub fn hann_window(size: usize) -> Vec<f64> {
    if size == 1 {
        return vec![1.0];
    }
    (0..size)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / size as f64).cos())
        .collect()
}

/// Sum of squared window coefficients (density normalization)
pub fn window_energy(window: &[f64]) -> f64 {
    window.iter().map(|w| w * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hann_shape() {
        let w = hann_window(8);
        assert_eq!(w.len(), 8);
        assert_abs_diff_eq!(w[0], 0.0);
        assert_abs_diff_eq!(w[4], 1.0, epsilon = 1e-12);
        // Periodic: symmetric about the center sample, last point not zero
        assert_abs_diff_eq!(w[1], w[7], epsilon = 1e-12);
        assert!(w[7] > 0.0);
    }

    #[test]
    fn test_window_energy() {
        // Periodic Hann energy is 3L/8
        let w = hann_window(256);
        assert_abs_diff_eq!(window_energy(&w), 96.0, epsilon = 1e-9);
    }
}
