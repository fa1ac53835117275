// Copyright (c) 2026 rhythmic contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! rhythmic - traffic pattern analysis engine
//!
//! Learns a traffic model from a Prometheus-compatible metrics backend (or
//! from a pre-fetched sample file) and writes a versioned JSON summary of
//! its wavelet/Fourier decomposition, spikes, and classified pattern.

use std::path::PathBuf;
use std::time::{Duration as StdDuration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use rhythmic::{Config, PrometheusCollector, SampleSeries, TrafficModel, TrafficModeler, Validator, VERSION};

/// rhythmic - traffic pattern analysis engine
#[derive(Parser, Debug)]
#[command(name = "rhythmic")]
#[command(author = "rhythmic contributors")]
#[command(version = VERSION)]
#[command(about = "Wavelet/Fourier traffic pattern learning for request-rate time series")]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable trace-level logging
    #[arg(long)]
    trace: bool,

    /// Verbose output (printed summary includes full coefficient list)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a metric from a live Prometheus-compatible backend and learn a model
    Learn {
        /// Metrics-backend base URL
        #[arg(long)]
        prometheus: Option<String>,

        /// Metric (or PromQL query) to learn from
        #[arg(long)]
        metric: Option<String>,

        /// Lookback duration (e.g. "7d", "1w", "24h")
        #[arg(long, default_value = "7d")]
        duration: String,

        /// Sample step in seconds
        #[arg(long, default_value_t = 60.0)]
        step: f64,

        /// Output model path
        #[arg(long, default_value = "traffic-model.json")]
        output: PathBuf,

        /// Wavelet family
        #[arg(long, default_value = "db4")]
        wavelet: String,

        /// Spike threshold in standard deviations
        #[arg(long, default_value_t = 3.0)]
        spike_threshold: f64,
    },
    /// Learn a model from a pre-fetched sample series JSON file
    Analyze {
        /// Path to a `SampleSeries` JSON file
        #[arg(long)]
        input: PathBuf,

        /// Output model path
        #[arg(long, default_value = "traffic-model.json")]
        output: PathBuf,

        /// Wavelet family
        #[arg(long, default_value = "db4")]
        wavelet: String,

        /// Spike threshold in standard deviations
        #[arg(long, default_value_t = 3.0)]
        spike_threshold: f64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.trace {
        Level::TRACE
    } else if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_file(args.debug)
        .with_line_number(args.debug)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("rhythmic v{} - traffic pattern analysis engine", VERSION);

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_create(&config_path)?;
    info!("configuration loaded from {:?}", config_path);

    match args.command {
        Command::Learn {
            prometheus,
            metric,
            duration,
            step,
            output,
            wavelet,
            spike_threshold,
        } => {
            let base_url = prometheus.unwrap_or(config.prometheus_url.clone());
            let metric = metric.unwrap_or(config.default_metric.clone());

            let collector = PrometheusCollector::new(base_url.clone(), StdDuration::from_secs(30))?;
            if !collector.test_connection() {
                warn!(base_url, "could not verify connection to metrics backend, continuing anyway");
            }

            info!(metric, duration, step, "fetching metrics");
            let series = collector.fetch_metrics(&metric, &duration, step)?;
            if series.values.len() < 50 {
                warn!(samples = series.values.len(), "fewer than 50 samples fetched, model may be unreliable");
            }
            if series.values.iter().all(|&v| v == 0.0) {
                warn!("all fetched samples are zero");
            }

            run_pipeline(series, &output, &wavelet, spike_threshold, args.verbose)
        }
        Command::Analyze {
            input,
            output,
            wavelet,
            spike_threshold,
        } => {
            let content = std::fs::read_to_string(&input).with_context(|| format!("reading {input:?}"))?;
            let series: SampleSeries = serde_json::from_str(&content).with_context(|| format!("parsing {input:?}"))?;
            run_pipeline(series, &output, &wavelet, spike_threshold, args.verbose)
        }
    }
}

fn run_pipeline(series: SampleSeries, output: &PathBuf, wavelet: &str, spike_threshold: f64, verbose: bool) -> Result<()> {
    let mut pipeline_config = Config::default().pipeline;
    pipeline_config.wavelet = wavelet.to_string();
    pipeline_config.spike_threshold_sigma = spike_threshold;

    let modeler = TrafficModeler::new(&pipeline_config);

    let started = Instant::now();
    let mut model = modeler.model(&series)?;
    model.metadata.analysis_duration_ms = Some(started.elapsed().as_millis() as u64);

    for warning in Validator::validate(&model) {
        warn!(warning, "model validation warning");
    }

    let file = std::fs::File::create(output).with_context(|| format!("creating {output:?}"))?;
    serde_json::to_writer_pretty(file, &model).context("writing model")?;
    info!(path = ?output, "wrote traffic model");

    print_summary(&model, verbose);
    Ok(())
}

fn print_summary(model: &TrafficModel, verbose: bool) {
    info!("--- traffic model summary ---");
    info!("pattern: {:?} (confidence {:.2})", model.pattern.pattern_type, model.pattern.confidence);
    info!(
        "baseline: mean={:.2} std={:.2} coefficients={}",
        model.baseline.mean,
        model.baseline.std,
        model.baseline.coefficients.len()
    );
    info!(
        "spikes: {} events, distribution={}",
        model.spikes.events.len(),
        model.spikes.distribution.kind
    );
    info!(
        "decomposition: wavelet={} levels={} smoothness_ratio={:.3}",
        model.decomposition.wavelet_type, model.decomposition.levels, model.decomposition.smoothness_ratio
    );

    if verbose {
        for coeff in &model.baseline.coefficients {
            info!(
                "  period={} confidence={:.2}",
                format_period(coeff.period_minutes),
                coeff.confidence
            );
        }
    }
}

/// Formats a period in minutes as a human-readable duration, grounded on
/// `main.py::_format_period`.
fn format_period(period_minutes: f64) -> String {
    if period_minutes < 60.0 {
        format!("{period_minutes:.1}m")
    } else if period_minutes < 1_440.0 {
        format!("{:.1}h", period_minutes / 60.0)
    } else {
        format!("{:.1}d", period_minutes / 1_440.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_period_chooses_the_right_unit() {
        assert_eq!(format_period(30.0), "30.0m");
        assert_eq!(format_period(120.0), "2.0h");
        assert_eq!(format_period(2_880.0), "2.0d");
    }
}
