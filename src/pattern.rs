// Copyright (c) 2026 rhythmic contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Rule-based pattern classification fusing the Fourier baseline's
//! periodicity confidence with the spike detector's event frequency.
//!
//! Grounded on `examples/original_source/src/python/models/traffic_modeler.py`
//! (`_classify_pattern` / `_determine_pattern_type`). The original chains
//! its daily/weekly/seasonal period-hour checks as `elif`, so a single
//! dominant coefficient contributes to exactly one bucket; this port keeps
//! that mutual exclusivity rather than reading spec.md's bulleted list as
//! three independent checks (see DESIGN.md).

use serde::{Deserialize, Serialize};

use crate::fourier::FourierBaseline;
use crate::spikes::SpikeEvent;

const DAILY_HOURS: std::ops::RangeInclusive<f64> = 20.0..=28.0;
const WEEKLY_HOURS: std::ops::RangeInclusive<f64> = 144.0..=192.0;
const SEASONAL_HOURS_MIN: f64 = 600.0;

const DAILY_CONFIDENCE_THRESHOLD: f64 = 0.6;
const WEEKLY_CONFIDENCE_THRESHOLD: f64 = 0.5;
const SEASONAL_CONFIDENCE_THRESHOLD: f64 = 0.4;
const FLAG_THRESHOLD: f64 = 0.3;
const STEADY_CV_THRESHOLD: f64 = 0.3;

/// The classifier's verdict on a traffic series' dominant shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternType {
    BusinessHoursNormal,
    BusinessHoursHeavy,
    WeeklyBatch,
    Bursty,
    Steady,
    Seasonal,
    Mixed,
}

/// Coarse spike-rate bucket used by the classification cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpikeFrequency {
    Frequent,
    Occasional,
    Rare,
    None,
}

/// The final typed classification, with its supporting confidences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternVerdict {
    pub pattern_type: PatternType,
    pub confidence: f64,
    pub daily_confidence: f64,
    pub weekly_confidence: f64,
    pub seasonal_confidence: f64,
    pub is_daily: bool,
    pub is_weekly: bool,
    pub is_seasonal: bool,
    pub spike_frequency: SpikeFrequency,
}

pub struct PatternClassifier;

impl PatternClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, baseline: &FourierBaseline, events: &[SpikeEvent], total_duration_hours: f64) -> PatternVerdict {
        let (daily_confidence, weekly_confidence, seasonal_confidence) = self.period_confidences(baseline);

        let spike_rate_per_day = if total_duration_hours > 0.0 {
            events.len() as f64 / (total_duration_hours / 24.0)
        } else {
            0.0
        };
        let spike_frequency = classify_frequency(spike_rate_per_day);

        let cv = if baseline.mean > 0.0 {
            baseline.std / baseline.mean
        } else {
            f64::INFINITY
        };

        let (pattern_type, confidence) = if daily_confidence > DAILY_CONFIDENCE_THRESHOLD {
            let heavy = matches!(spike_frequency, SpikeFrequency::Frequent | SpikeFrequency::Occasional);
            let pattern_type = if heavy {
                PatternType::BusinessHoursHeavy
            } else {
                PatternType::BusinessHoursNormal
            };
            (pattern_type, daily_confidence)
        } else if weekly_confidence > WEEKLY_CONFIDENCE_THRESHOLD {
            (PatternType::WeeklyBatch, weekly_confidence)
        } else if spike_frequency == SpikeFrequency::Frequent {
            (PatternType::Bursty, 0.8)
        } else if spike_frequency == SpikeFrequency::None && cv < STEADY_CV_THRESHOLD {
            (PatternType::Steady, 0.9)
        } else if seasonal_confidence > SEASONAL_CONFIDENCE_THRESHOLD {
            (PatternType::Seasonal, seasonal_confidence)
        } else {
            let best = daily_confidence.max(weekly_confidence).max(seasonal_confidence);
            (PatternType::Mixed, best.max(0.3))
        };

        PatternVerdict {
            pattern_type,
            confidence,
            daily_confidence,
            weekly_confidence,
            seasonal_confidence,
            is_daily: daily_confidence > FLAG_THRESHOLD,
            is_weekly: weekly_confidence > FLAG_THRESHOLD,
            is_seasonal: seasonal_confidence > FLAG_THRESHOLD,
            spike_frequency,
        }
    }

    fn period_confidences(&self, baseline: &FourierBaseline) -> (f64, f64, f64) {
        let mut daily = 0.0_f64;
        let mut weekly = 0.0_f64;
        let mut seasonal = 0.0_f64;

        for coeff in &baseline.coefficients {
            let period_hours = coeff.period_minutes / 60.0;
            if DAILY_HOURS.contains(&period_hours) {
                daily = daily.max(coeff.confidence);
            } else if WEEKLY_HOURS.contains(&period_hours) {
                weekly = weekly.max(coeff.confidence);
            } else if period_hours >= SEASONAL_HOURS_MIN {
                seasonal = seasonal.max(coeff.confidence);
            }
        }

        (daily, weekly, seasonal)
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_frequency(spike_rate_per_day: f64) -> SpikeFrequency {
    if spike_rate_per_day > 10.0 {
        SpikeFrequency::Frequent
    } else if spike_rate_per_day > 2.0 {
        SpikeFrequency::Occasional
    } else if spike_rate_per_day > 0.1 {
        SpikeFrequency::Rare
    } else {
        SpikeFrequency::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::FrequencyCoefficient;

    fn baseline_with(period_minutes: f64, confidence: f64, mean: f64, std: f64) -> FourierBaseline {
        FourierBaseline {
            kind: "fourier",
            mean,
            std,
            coefficients: vec![FrequencyCoefficient {
                frequency_hz: 1.0 / (period_minutes * 60.0),
                period_minutes,
                amplitude: 1.0,
                phase: 0.0,
                confidence,
            }],
        }
    }

    #[test]
    fn daily_periodicity_with_frequent_spikes_is_business_hours_heavy() {
        let classifier = PatternClassifier::new();
        let baseline = baseline_with(24.0 * 60.0, 0.9, 100.0, 10.0);
        let events: Vec<SpikeEvent> = (0..50)
            .map(|i| SpikeEvent {
                timestamp_ms: i as f64 * 1000.0,
                magnitude: 100.0,
                peak_magnitude: 100.0,
                duration_minutes: 1.0,
                spike_count: 1,
            })
            .collect();
        let verdict = classifier.classify(&baseline, &events, 24.0);
        assert_eq!(verdict.pattern_type, PatternType::BusinessHoursHeavy);
        assert!(verdict.is_daily);
    }

    #[test]
    fn weekly_periodicity_without_daily_confidence_is_weekly_batch() {
        let classifier = PatternClassifier::new();
        let baseline = baseline_with(168.0 * 60.0, 0.7, 100.0, 10.0);
        let verdict = classifier.classify(&baseline, &[], 168.0);
        assert_eq!(verdict.pattern_type, PatternType::WeeklyBatch);
    }

    #[test]
    fn no_periodicity_no_spikes_low_cv_is_steady() {
        let classifier = PatternClassifier::new();
        let baseline = FourierBaseline {
            kind: "fourier",
            mean: 100.0,
            std: 5.0,
            coefficients: Vec::new(),
        };
        let verdict = classifier.classify(&baseline, &[], 100.0);
        assert_eq!(verdict.pattern_type, PatternType::Steady);
    }

    #[test]
    fn no_strong_signal_anywhere_is_mixed() {
        let classifier = PatternClassifier::new();
        let baseline = FourierBaseline {
            kind: "fourier",
            mean: 100.0,
            std: 80.0,
            coefficients: Vec::new(),
        };
        let events = vec![SpikeEvent {
            timestamp_ms: 0.0,
            magnitude: 10.0,
            peak_magnitude: 10.0,
            duration_minutes: 1.0,
            spike_count: 1,
        }];
        let verdict = classifier.classify(&baseline, &events, 1000.0);
        assert_eq!(verdict.pattern_type, PatternType::Mixed);
        assert!(verdict.confidence >= 0.3);
    }
}
