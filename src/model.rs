//! Input/output data contracts and model assembly.
//!
//! Grounded on `examples/original_source/src/python/models/traffic_modeler.py`'s
//! `model()` return shape and `validate_model`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::decomposition::Decomposition;
use crate::fourier::FourierBaseline;
use crate::pattern::PatternVerdict;
use crate::spikes::SpikeResult;
use crate::statistics::StatisticalSummary;

const MODEL_VERSION: &str = "1.0.0";
const MIN_RELIABLE_SAMPLES: usize = 100;
const LOW_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// The core's input contract: a uniformly-sampled, unlabeled request-rate
/// series with millisecond timestamps. `duration` is the caller's
/// originally requested lookback (e.g. `"7d"`) and is carried through to
/// `Metadata` verbatim — it is not recomputed from `timestamps_ms`, since a
/// caller may request 7 days and receive fewer samples than that if the
/// backend's retention window is shorter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSeries {
    pub metric: String,
    pub duration: String,
    pub step_seconds: f64,
    pub timestamps_ms: Vec<f64>,
    pub values: Vec<f64>,
}

/// Provenance and shape information carried alongside the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub source: String,
    pub metric: String,
    pub duration: String,
    pub samples: usize,
    #[serde(rename = "step")]
    pub step_seconds: f64,
    pub timestamp_iso8601: String,
    pub analysis_duration_ms: Option<u64>,
}

/// Decomposition summary carried in the assembled model (the full
/// approximation/detail bands are not serialized — only their shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecompositionSummary {
    pub wavelet_type: String,
    pub levels: usize,
    pub smoothness_ratio: f64,
    pub energy_distribution: Vec<f64>,
}

impl From<&Decomposition> for DecompositionSummary {
    fn from(d: &Decomposition) -> Self {
        Self {
            wavelet_type: d.wavelet_type.clone(),
            levels: d.levels,
            smoothness_ratio: d.smoothness_ratio,
            energy_distribution: d.energy_distribution.clone(),
        }
    }
}

/// The versioned, JSON-serializable output of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficModel {
    pub version: String,
    pub metadata: Metadata,
    pub baseline: FourierBaseline,
    pub spikes: SpikeResult,
    pub pattern: PatternVerdict,
    pub statistics: StatisticalSummary,
    pub decomposition: DecompositionSummary,
}

/// Assembles the final `TrafficModel` from each stage's output.
pub struct ModelAssembler;

impl ModelAssembler {
    pub fn assemble(
        series: &SampleSeries,
        baseline: FourierBaseline,
        spikes: SpikeResult,
        pattern: PatternVerdict,
        statistics: StatisticalSummary,
        decomposition: &Decomposition,
    ) -> TrafficModel {
        TrafficModel {
            version: MODEL_VERSION.to_string(),
            metadata: Metadata {
                source: "prometheus".to_string(),
                metric: series.metric.clone(),
                duration: series.duration.clone(),
                samples: series.values.len(),
                step_seconds: series.step_seconds,
                timestamp_iso8601: Utc::now().to_rfc3339(),
                analysis_duration_ms: None,
            },
            baseline,
            spikes,
            pattern,
            statistics,
            decomposition: DecompositionSummary::from(decomposition),
        }
    }
}

/// Non-fatal sanity checks over an assembled model.
pub struct Validator;

impl Validator {
    pub fn validate(model: &TrafficModel) -> Vec<String> {
        let mut warnings = Vec::new();

        if model.metadata.samples == 0 {
            warnings.push("no samples in series".to_string());
        }
        if model.baseline.mean < 0.0 {
            warnings.push("negative baseline mean".to_string());
        }
        if model.baseline.coefficients.is_empty() {
            warnings.push("no periodic coefficients detected".to_string());
        }
        if model.pattern.confidence < LOW_CONFIDENCE_THRESHOLD {
            warnings.push("low pattern classification confidence".to_string());
        }
        if model.metadata.samples < MIN_RELIABLE_SAMPLES {
            warnings.push(format!(
                "small sample size ({}), model may be unreliable",
                model.metadata.samples
            ));
        }

        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternType, SpikeFrequency};
    use crate::spikes::SpikeDistribution;

    fn sample_model(samples: usize, baseline_mean: f64, confidence: f64) -> TrafficModel {
        TrafficModel {
            version: MODEL_VERSION.to_string(),
            metadata: Metadata {
                source: "prometheus".to_string(),
                metric: "http_requests_total".to_string(),
                duration: "1h".to_string(),
                samples,
                step_seconds: 60.0,
                timestamp_iso8601: "2026-01-01T00:00:00Z".to_string(),
                analysis_duration_ms: Some(10),
            },
            baseline: FourierBaseline {
                kind: "fourier",
                mean: baseline_mean,
                std: 1.0,
                coefficients: Vec::new(),
            },
            spikes: SpikeResult {
                threshold: 0.0,
                events: Vec::new(),
                distribution: SpikeDistribution {
                    kind: "none".to_string(),
                    count: 0,
                    lambda: None,
                    mean_interval_minutes: None,
                    coefficient_of_variation: None,
                },
            },
            pattern: PatternVerdict {
                pattern_type: PatternType::Mixed,
                confidence,
                daily_confidence: 0.0,
                weekly_confidence: 0.0,
                seasonal_confidence: 0.0,
                is_daily: false,
                is_weekly: false,
                is_seasonal: false,
                spike_frequency: SpikeFrequency::None,
            },
            statistics: StatisticalSummary {
                mean: 0.0,
                std: 0.0,
                variance: 0.0,
                p50: 0.0,
                p95: 0.0,
                p99: 0.0,
                min: 0.0,
                max: 0.0,
            },
            decomposition: DecompositionSummary {
                wavelet_type: "db4".to_string(),
                levels: 5,
                smoothness_ratio: 1.0,
                energy_distribution: vec![100.0],
            },
        }
    }

    #[test]
    fn flags_small_sample_size() {
        let model = sample_model(10, 100.0, 0.9);
        let warnings = Validator::validate(&model);
        assert!(warnings.iter().any(|w| w.contains("small sample size")));
    }

    #[test]
    fn flags_negative_baseline_mean() {
        let model = sample_model(1000, -5.0, 0.9);
        let warnings = Validator::validate(&model);
        assert!(warnings.iter().any(|w| w.contains("negative baseline mean")));
    }

    #[test]
    fn flags_low_confidence() {
        let model = sample_model(1000, 100.0, 0.1);
        let warnings = Validator::validate(&model);
        assert!(warnings.iter().any(|w| w.contains("confidence")));
    }

    #[test]
    fn clean_model_has_only_empty_coefficients_warning() {
        let model = sample_model(1000, 100.0, 0.9);
        let warnings = Validator::validate(&model);
        assert_eq!(warnings, vec!["no periodic coefficients detected".to_string()]);
    }
}
