//! End-to-end orchestration: decompose, derive a Fourier baseline from the
//! approximation band, detect spikes, classify the pattern, summarize, and
//! assemble the final model.
//!
//! Grounded on `examples/original_source/src/python/models/traffic_modeler.py::TrafficModeler.model`.

use crate::config::PipelineConfig;
use crate::decomposition::Decomposer;
use crate::error::CoreError;
use crate::fourier::FourierAnalyzer;
use crate::model::{ModelAssembler, SampleSeries, TrafficModel};
use crate::pattern::PatternClassifier;
use crate::spikes::SpikeDetector;
use crate::statistics::StatisticsAggregator;

/// Wires the leaf components together into the full traffic-modeling
/// pipeline described by the component design.
pub struct TrafficModeler {
    decomposer: Decomposer,
    fourier: FourierAnalyzer,
    spike_detector: SpikeDetector,
    pattern_classifier: PatternClassifier,
    statistics: StatisticsAggregator,
}

impl TrafficModeler {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            decomposer: Decomposer::new(&config.wavelet, config.wavelet_levels),
            fourier: FourierAnalyzer::new(config.fourier_peak_count),
            spike_detector: SpikeDetector::new(config.spike_threshold_sigma, config.spike_cluster_gap_minutes),
            pattern_classifier: PatternClassifier::new(),
            statistics: StatisticsAggregator::new(),
        }
    }

    pub fn model(&self, series: &SampleSeries) -> Result<TrafficModel, CoreError> {
        if series.values.len() != series.timestamps_ms.len() {
            return Err(CoreError::InvalidSampleSeries(format!(
                "{} values but {} timestamps",
                series.values.len(),
                series.timestamps_ms.len()
            )));
        }
        if series.step_seconds <= 0.0 {
            return Err(CoreError::InvalidSampleSeries("step_seconds must be positive".to_string()));
        }

        let decomposition = self.decomposer.decompose(&series.values)?;

        // The approximation band is decimated by 2 per level relative to the
        // original series, so its effective sample rate shrinks by the same
        // factor — analyzing it at the undecimated rate would compress every
        // recovered period by 2^levels.
        let sample_rate_hz = 1.0 / series.step_seconds;
        let approx_sample_rate_hz = sample_rate_hz / 2f64.powi(decomposition.levels as i32);
        let baseline = self.fourier.analyze(&decomposition.approximation, approx_sample_rate_hz)?;

        let spike_result = self.spike_detector.detect(&series.values, &decomposition.details);

        let total_duration_hours = series.values.len() as f64 * series.step_seconds / 3600.0;
        let pattern = self
            .pattern_classifier
            .classify(&baseline, &spike_result.events, total_duration_hours);

        let statistics = self.statistics.summarize(&series.values);

        Ok(ModelAssembler::assemble(
            series,
            baseline,
            spike_result,
            pattern,
            statistics,
            &decomposition,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_with(values: Vec<f64>, step_seconds: f64) -> SampleSeries {
        let timestamps_ms = (0..values.len()).map(|i| i as f64 * step_seconds * 1000.0).collect();
        SampleSeries {
            metric: "http_requests_total".to_string(),
            duration: "1d".to_string(),
            step_seconds,
            timestamps_ms,
            values,
        }
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let modeler = TrafficModeler::new(&PipelineConfig::default());
        let mut series = series_with(vec![1.0; 64], 60.0);
        series.timestamps_ms.pop();
        assert!(modeler.model(&series).is_err());
    }

    #[test]
    fn produces_a_complete_model_for_a_synthetic_daily_pattern() {
        let modeler = TrafficModeler::new(&PipelineConfig::default());
        let n = 2016; // 7 days at 5-minute steps
        let step = 300.0;
        let values: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 * step;
                let daily = 50.0 * (2.0 * std::f64::consts::PI * t / 86_400.0).sin();
                100.0 + daily
            })
            .collect();
        let series = series_with(values, step);
        let model = modeler.model(&series).unwrap();

        assert_eq!(model.version, "1.0.0");
        assert_eq!(model.metadata.samples, n);
        assert!(model.statistics.mean > 0.0);
    }

    #[test]
    fn constant_signal_produces_steady_pattern() {
        let modeler = TrafficModeler::new(&PipelineConfig::default());
        let series = series_with(vec![42.0; 1024], 60.0);
        let model = modeler.model(&series).unwrap();
        assert!(model.baseline.coefficients.is_empty());
        assert!(model.spikes.events.is_empty());
    }
}
