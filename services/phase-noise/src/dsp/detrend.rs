//! Linear least-squares detrending

/// Remove the ordinary least-squares line `a + b·i` from a series
///
/// One sample detrends to `[0.0]`; an empty series stays empty.
pub fn detrend_linear(series: &[f64]) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }

    let mean_i = (n - 1) as f64 / 2.0;
    let mean_y = series.iter().sum::<f64>() / n as f64;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let di = i as f64 - mean_i;
        sxy += di * (y - mean_y);
        sxx += di * di;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

    series
        .iter()
        .enumerate()
        .map(|(i, &y)| y - mean_y - slope * (i as f64 - mean_i))
        .collect()
}
