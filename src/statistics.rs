//! NaN-stripped descriptive statistics over the raw input series.
//!
//! Grounded on `traffic_modeler.py::_calculate_statistics`: strips NaNs,
//! returns all-zero on an empty result, otherwise population variance and
//! linearly-interpolated percentiles (matching `numpy.var`/`numpy.percentile`
//! defaults).

use serde::{Deserialize, Serialize};

use crate::numeric::{mean_std, percentile_sorted};

/// Summary statistics of a value series, with non-finite samples dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticalSummary {
    pub mean: f64,
    pub std: f64,
    pub variance: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

impl StatisticalSummary {
    fn zero() -> Self {
        Self {
            mean: 0.0,
            std: 0.0,
            variance: 0.0,
            p50: 0.0,
            p95: 0.0,
            p99: 0.0,
            min: 0.0,
            max: 0.0,
        }
    }
}

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, values: &[f64]) -> StatisticalSummary {
        let mut clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if clean.is_empty() {
            return StatisticalSummary::zero();
        }
        clean.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let (mean, std) = mean_std(&clean);
        StatisticalSummary {
            mean,
            std,
            variance: std * std,
            p50: percentile_sorted(&clean, 50.0),
            p95: percentile_sorted(&clean, 95.0),
            p99: percentile_sorted(&clean, 99.0),
            min: clean[0],
            max: clean[clean.len() - 1],
        }
    }
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_zeros() {
        let summary = StatisticsAggregator::new().summarize(&[]);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.max, 0.0);
    }

    #[test]
    fn nan_values_are_stripped() {
        let summary = StatisticsAggregator::new().summarize(&[1.0, f64::NAN, 3.0]);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
    }

    #[test]
    fn percentiles_on_uniform_data() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let summary = StatisticsAggregator::new().summarize(&values);
        assert!((summary.p50 - 50.5).abs() < 0.5);
        assert!(summary.p95 > summary.p50);
        assert!(summary.p99 > summary.p95);
    }

    #[test]
    fn variance_is_std_squared() {
        let summary = StatisticsAggregator::new().summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((summary.variance - summary.std * summary.std).abs() < 1e-9);
    }
}
