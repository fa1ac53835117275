// Copyright (c) 2026 rhythmic contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Two-channel spike detection: direct amplitude threshold plus a
//! wavelet high-frequency channel, merged by temporal clustering.
//!
//! Grounded on `examples/original_source/src/python/processors/spike_detector.py`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decomposition::combine_details;
use crate::numeric::{mean_std, median};

const MINUTE_MS: f64 = 60_000.0;

/// A merged spike event (one or more raw detections clustered together).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeEvent {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: f64,
    pub magnitude: f64,
    pub peak_magnitude: f64,
    pub duration_minutes: f64,
    pub spike_count: usize,
}

/// Inter-arrival characterization of the detected events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeDistribution {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    pub lambda: Option<f64>,
    pub mean_interval_minutes: Option<f64>,
    pub coefficient_of_variation: Option<f64>,
}

/// Output of the spike detector: threshold used, merged events, and a
/// coarse characterization of their temporal distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpikeResult {
    pub threshold: f64,
    pub events: Vec<SpikeEvent>,
    pub distribution: SpikeDistribution,
}

struct RawSpike {
    timestamp_ms: f64,
    magnitude: f64,
}

/// Detects and clusters spikes in a request-rate signal using a sigma
/// threshold on both the raw signal and a combined wavelet high-frequency
/// channel.
pub struct SpikeDetector {
    threshold_sigma: f64,
    cluster_gap_minutes: f64,
}

impl SpikeDetector {
    pub fn new(threshold_sigma: f64, cluster_gap_minutes: f64) -> Self {
        Self {
            threshold_sigma,
            cluster_gap_minutes,
        }
    }

    pub fn detect(&self, signal: &[f64], details: &[Vec<f64>]) -> SpikeResult {
        if signal.len() < 10 {
            debug!(len = signal.len(), "signal too short for spike detection");
            return SpikeResult {
                threshold: 0.0,
                events: Vec::new(),
                distribution: SpikeDistribution {
                    kind: "none".to_string(),
                    count: 0,
                    lambda: None,
                    mean_interval_minutes: None,
                    coefficient_of_variation: None,
                },
            };
        }

        let (mean, std) = mean_std(signal);
        let threshold = mean + self.threshold_sigma * std;

        let mut raw = self.direct_spikes(signal, mean, std, threshold);
        raw.extend(self.wavelet_spikes(signal.len(), details));
        raw.sort_by(|a, b| a.timestamp_ms.partial_cmp(&b.timestamp_ms).unwrap());

        let events = self.cluster(&raw);
        let distribution = self.analyze_distribution(&events);

        debug!(events = events.len(), threshold, "spike detection complete");
        SpikeResult {
            threshold,
            events,
            distribution,
        }
    }

    fn direct_spikes(&self, signal: &[f64], _mean: f64, std: f64, threshold: f64) -> Vec<RawSpike> {
        if std == 0.0 {
            return Vec::new();
        }
        signal
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > threshold)
            .map(|(i, &v)| RawSpike {
                timestamp_ms: i as f64 * MINUTE_MS,
                magnitude: v,
            })
            .collect()
    }

    fn wavelet_spikes(&self, target_len: usize, details: &[Vec<f64>]) -> Vec<RawSpike> {
        if details.is_empty() {
            return Vec::new();
        }
        let combined = combine_details(details, target_len);
        let (hf_mean, hf_std) = mean_std(&combined);
        if hf_std == 0.0 {
            return Vec::new();
        }
        let hf_threshold = hf_mean + self.threshold_sigma * hf_std;
        combined
            .iter()
            .enumerate()
            .filter(|(_, &v)| v.abs() > hf_threshold.abs())
            .map(|(i, &v)| RawSpike {
                timestamp_ms: i as f64 * MINUTE_MS,
                magnitude: v.abs(),
            })
            .collect()
    }

    fn cluster(&self, sorted_spikes: &[RawSpike]) -> Vec<SpikeEvent> {
        if sorted_spikes.is_empty() {
            return Vec::new();
        }

        let max_gap_ms = self.cluster_gap_minutes * MINUTE_MS;
        let mut clusters: Vec<Vec<&RawSpike>> = Vec::new();
        let mut current: Vec<&RawSpike> = vec![&sorted_spikes[0]];

        for spike in &sorted_spikes[1..] {
            let last_ts = current.last().unwrap().timestamp_ms;
            if spike.timestamp_ms - last_ts <= max_gap_ms {
                current.push(spike);
            } else {
                clusters.push(std::mem::take(&mut current));
                current.push(spike);
            }
        }
        clusters.push(current);

        clusters.iter().map(|c| merge_cluster(c)).collect()
    }

    fn analyze_distribution(&self, events: &[SpikeEvent]) -> SpikeDistribution {
        if events.len() < 2 {
            return SpikeDistribution {
                kind: "insufficient-data".to_string(),
                count: events.len(),
                lambda: None,
                mean_interval_minutes: None,
                coefficient_of_variation: None,
            };
        }

        let intervals: Vec<f64> = events
            .windows(2)
            .map(|w| (w[1].timestamp_ms - w[0].timestamp_ms) / MINUTE_MS)
            .collect();
        let mean_interval = intervals.iter().sum::<f64>() / intervals.len() as f64;
        let lambda = if mean_interval == 0.0 { 1.0 } else { 1.0 / mean_interval };
        if mean_interval <= 0.0 {
            return SpikeDistribution {
                kind: "bursty".to_string(),
                count: events.len(),
                lambda: Some(lambda),
                mean_interval_minutes: Some(mean_interval),
                coefficient_of_variation: None,
            };
        }

        let (_, interval_std) = mean_std(&intervals);
        let cv = interval_std / mean_interval;
        let kind = if cv < 0.5 {
            "regular"
        } else if cv <= 1.5 {
            "exponential"
        } else {
            "bursty"
        };

        SpikeDistribution {
            kind: kind.to_string(),
            count: events.len(),
            lambda: Some(lambda),
            mean_interval_minutes: Some(mean_interval),
            coefficient_of_variation: Some(cv),
        }
    }
}

fn merge_cluster(cluster: &[&RawSpike]) -> SpikeEvent {
    if cluster.len() == 1 {
        let s = cluster[0];
        return SpikeEvent {
            timestamp_ms: s.timestamp_ms,
            magnitude: s.magnitude,
            peak_magnitude: s.magnitude,
            duration_minutes: 1.0,
            spike_count: 1,
        };
    }

    let magnitudes: Vec<f64> = cluster.iter().map(|s| s.magnitude).collect();
    let timestamps: Vec<f64> = cluster.iter().map(|s| s.timestamp_ms).collect();
    let peak_magnitude = magnitudes.iter().cloned().fold(f64::MIN, f64::max);
    let mean_magnitude = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;
    let min_ts = timestamps.iter().cloned().fold(f64::MAX, f64::min);
    let max_ts = timestamps.iter().cloned().fold(f64::MIN, f64::max);

    SpikeEvent {
        timestamp_ms: median(&timestamps),
        magnitude: mean_magnitude,
        peak_magnitude,
        duration_minutes: ((max_ts - min_ts) / MINUTE_MS).max(1.0),
        spike_count: cluster.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_for_short_signal() {
        let detector = SpikeDetector::new(3.0, 10.0);
        let result = detector.detect(&[1.0; 5], &[]);
        assert_eq!(result.distribution.kind, "none");
        assert!(result.events.is_empty());
    }

    #[test]
    fn detects_an_isolated_spike() {
        let detector = SpikeDetector::new(3.0, 10.0);
        let mut signal = vec![10.0; 100];
        signal[50] = 500.0;
        let result = detector.detect(&signal, &[]);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].spike_count, 1);
    }

    #[test]
    fn clusters_nearby_spikes_into_one_event() {
        let detector = SpikeDetector::new(3.0, 10.0);
        let mut signal = vec![10.0; 100];
        signal[50] = 500.0;
        signal[52] = 480.0;
        let result = detector.detect(&signal, &[]);
        assert_eq!(result.events.len(), 1);
        assert_eq!(result.events[0].spike_count, 2);
    }

    #[test]
    fn two_events_is_insufficient_data_for_distribution() {
        let detector = SpikeDetector::new(3.0, 10.0);
        let mut signal = vec![10.0; 200];
        signal[20] = 500.0;
        signal[150] = 500.0;
        let result = detector.detect(&signal, &[]);
        assert_eq!(result.distribution.kind, "insufficient-data");
    }

    #[test]
    fn lambda_is_inverse_of_mean_interval() {
        let detector = SpikeDetector::new(3.0, 10.0);
        let mut signal = vec![10.0; 400];
        signal[20] = 500.0;
        signal[150] = 500.0;
        signal[280] = 500.0;
        let result = detector.detect(&signal, &[]);
        let mean_interval = result.distribution.mean_interval_minutes.unwrap();
        let lambda = result.distribution.lambda.unwrap();
        assert!((lambda - 1.0 / mean_interval).abs() < 1e-9);
    }

    #[test]
    fn constant_signal_yields_no_spikes() {
        let detector = SpikeDetector::new(3.0, 10.0);
        let result = detector.detect(&[5.0; 50], &[]);
        assert!(result.events.is_empty());
    }
}
