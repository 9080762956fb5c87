//! Phase noise report - loads one or two receiver captures and writes their
//! phase-noise and cross-spectral curves as JSON.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use phase_noise::config::Config;
use phase_noise::{Dataset, Report};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("phase_noise=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("===========================================");
    info!("   Phase Noise Report");
    info!("===========================================");

    let config = Config::from_env();

    info!("Configuration:");
    info!("  Capture A: {} @ {} Hz", config.capture_a.display(), config.sample_rate_a);
    if let Some(path) = &config.capture_b {
        info!("  Capture B: {} @ {} Hz", path.display(), config.sample_rate_b);
    }
    info!("  FFT points: {}", config.fft_points);

    let first = Dataset::from_file(&config.capture_a, config.sample_rate_a, config.fft_points)
        .with_context(|| format!("Failed to analyze {}", config.capture_a.display()))?;

    let second = match &config.capture_b {
        Some(path) => Some(
            Dataset::from_file(path, config.sample_rate_b, config.fft_points)
                .with_context(|| format!("Failed to analyze {}", path.display()))?,
        ),
        None => None,
    };

    let report = Report::build(&first, second.as_ref())
        .context("Failed to compute cross spectrum")?;

    for channel in &report.channels {
        info!("[Channel] {}", channel);
    }
    if let Some(cross) = &report.cross {
        info!(
            "[Cross] {} x {}: {} bins, {} segments",
            cross.labels[0],
            cross.labels[1],
            cross.frequency.len(),
            cross.segments_averaged
        );
    }

    let json = report.to_json().context("Failed to serialize report")?;
    match &config.report_path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
