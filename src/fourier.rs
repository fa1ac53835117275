// Copyright (c) 2026 rhythmic contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Windowed FFT baseline over the wavelet approximation band.
//!
//! Grounded on `examples/original_source/src/python/processors/fourier_analyzer.py`:
//! center → pad to a power of two → Hann window → real FFT → peak-pick the
//! positive-frequency half, converting accepted peaks to periods.

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::numeric::{mean_std, pad_to_power_of_two};

const MIN_CONFIDENCE: f64 = 0.05;
const PEAK_HEIGHT_FRACTION: f64 = 0.1;
const DC_FREQUENCY_EPSILON: f64 = 1e-10;

/// A single ranked frequency component of the baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyCoefficient {
    #[serde(rename = "frequency")]
    pub frequency_hz: f64,
    pub period_minutes: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub confidence: f64,
}

/// The Fourier baseline of a (typically smoothed) signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FourierBaseline {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mean: f64,
    pub std: f64,
    pub coefficients: Vec<FrequencyCoefficient>,
}

/// Extracts a compact periodic baseline from a uniformly-sampled signal.
pub struct FourierAnalyzer {
    max_coefficients: usize,
}

impl FourierAnalyzer {
    pub fn new(max_coefficients: usize) -> Self {
        Self { max_coefficients }
    }

    /// `sample_rate` is in Hz (`1 / step_seconds`).
    pub fn analyze(&self, signal: &[f64], sample_rate: f64) -> Result<FourierBaseline, CoreError> {
        if signal.len() < 4 {
            return Err(CoreError::SignalTooShort {
                stage: "fourier",
                len: signal.len(),
                minimum: 4,
            });
        }

        let (mean, std) = mean_std(signal);
        if std == 0.0 {
            debug!("constant signal, no frequency content");
            return Ok(FourierBaseline {
                kind: "fourier",
                mean,
                std: 0.0,
                coefficients: Vec::new(),
            });
        }

        let centered: Vec<f64> = signal.iter().map(|&v| v - mean).collect();
        let (padded, original_len) = pad_to_power_of_two(&centered);
        let windowed = hann_window(&padded);

        let n = windowed.len();
        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let mut input = windowed;
        let mut spectrum = fft.make_output_vec();
        fft.process(&mut input, &mut spectrum)
            .map_err(|e| CoreError::InvalidSampleSeries(format!("fft failed: {e}")))?;

        let magnitudes: Vec<f64> = spectrum.iter().map(|c| (c.re * c.re + c.im * c.im).sqrt()).collect();
        let frequencies: Vec<f64> = (0..magnitudes.len())
            .map(|k| k as f64 * sample_rate / n as f64)
            .collect();

        let coefficients = self.select_peaks(&magnitudes, &frequencies, &spectrum);
        debug!(count = coefficients.len(), original_len, "fourier baseline computed");

        Ok(FourierBaseline {
            kind: "fourier",
            mean,
            std,
            coefficients,
        })
    }

    fn select_peaks(
        &self,
        magnitudes: &[f64],
        frequencies: &[f64],
        spectrum: &[num_complex::Complex<f64>],
    ) -> Vec<FrequencyCoefficient> {
        let usable: Vec<usize> = (0..magnitudes.len())
            .filter(|&k| frequencies[k] > DC_FREQUENCY_EPSILON)
            .collect();
        if usable.is_empty() {
            return Vec::new();
        }

        let max_mag = usable.iter().map(|&k| magnitudes[k]).fold(0.0_f64, f64::max);
        if max_mag <= 0.0 {
            return Vec::new();
        }

        let height_threshold = PEAK_HEIGHT_FRACTION * max_mag;
        let min_distance = (usable.len() / 50).max(1);

        let mut candidates = find_peaks(&usable, magnitudes, height_threshold, min_distance);
        if candidates.is_empty() {
            let mut by_magnitude = usable.clone();
            by_magnitude.sort_by(|&a, &b| magnitudes[b].partial_cmp(&magnitudes[a]).unwrap());
            candidates = by_magnitude.into_iter().take(self.max_coefficients).collect();
        }

        candidates.sort_by(|&a, &b| magnitudes[b].partial_cmp(&magnitudes[a]).unwrap());
        candidates.truncate(self.max_coefficients);

        candidates
            .into_iter()
            .map(|k| {
                let confidence = magnitudes[k] / max_mag;
                let freq = frequencies[k];
                FrequencyCoefficient {
                    frequency_hz: freq,
                    period_minutes: 1.0 / (freq * 60.0),
                    amplitude: magnitudes[k],
                    phase: spectrum[k].im.atan2(spectrum[k].re),
                    confidence,
                }
            })
            .filter(|c| c.confidence >= MIN_CONFIDENCE)
            .collect()
    }

    /// Reconstructs a signal of `length` samples from ranked coefficients.
    pub fn synthesize(&self, coefficients: &[FrequencyCoefficient], length: usize, sample_rate: f64) -> Vec<f64> {
        (0..length)
            .map(|i| {
                let t = i as f64 / sample_rate;
                coefficients
                    .iter()
                    .map(|c| c.amplitude * (2.0 * std::f64::consts::PI * c.frequency_hz * t + c.phase).cos())
                    .sum()
            })
            .collect()
    }

    /// Estimates background noise as the `percentile`-th magnitude in the
    /// upper (high-frequency) half of the raw (unwindowed) spectrum.
    pub fn estimate_noise(&self, signal: &[f64], percentile: f64) -> f64 {
        if signal.len() < 4 {
            return 0.0;
        }
        let (padded, _) = pad_to_power_of_two(signal);
        let n = padded.len();
        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(n);
        let mut input = padded;
        let mut spectrum = fft.make_output_vec();
        if fft.process(&mut input, &mut spectrum).is_err() {
            return 0.0;
        }
        let magnitudes: Vec<f64> = spectrum.iter().map(|c| (c.re * c.re + c.im * c.im).sqrt()).collect();
        let half = magnitudes.len() / 2;
        let mut upper = magnitudes[half..].to_vec();
        upper.sort_by(|a, b| a.partial_cmp(b).unwrap());
        crate::numeric::percentile_sorted(&upper, percentile)
    }
}

fn hann_window(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n <= 1 {
        return x.to_vec();
    }
    x.iter()
        .enumerate()
        .map(|(i, &v)| {
            let w = 0.5 - 0.5 * (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos();
            v * w
        })
        .collect()
}

/// Local maxima among `candidates` (indices into `magnitudes`) above
/// `height`, enforcing a minimum index spacing between selected peaks.
fn find_peaks(candidates: &[usize], magnitudes: &[f64], height: f64, min_distance: usize) -> Vec<usize> {
    let mut peaks = Vec::new();
    let mut last_selected: Option<usize> = None;

    for (pos, &k) in candidates.iter().enumerate() {
        if magnitudes[k] < height {
            continue;
        }
        let is_local_max = {
            let prev_ok = pos == 0 || magnitudes[candidates[pos - 1]] <= magnitudes[k];
            let next_ok = pos + 1 == candidates.len() || magnitudes[candidates[pos + 1]] <= magnitudes[k];
            prev_ok && next_ok
        };
        if !is_local_max {
            continue;
        }
        if let Some(last) = last_selected {
            if k - last < min_distance {
                continue;
            }
        }
        peaks.push(k);
        last_selected = Some(k);
    }
    peaks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(n: usize, period: f64, sample_rate: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                (2.0 * std::f64::consts::PI * t / period).sin()
            })
            .collect()
    }

    #[test]
    fn rejects_too_short_signals() {
        let analyzer = FourierAnalyzer::new(8);
        assert!(matches!(
            analyzer.analyze(&[1.0, 2.0], 1.0),
            Err(CoreError::SignalTooShort { .. })
        ));
    }

    #[test]
    fn constant_signal_has_no_coefficients() {
        let analyzer = FourierAnalyzer::new(8);
        let result = analyzer.analyze(&[5.0; 64], 1.0 / 60.0).unwrap();
        assert_eq!(result.std, 0.0);
        assert!(result.coefficients.is_empty());
    }

    #[test]
    fn recovers_dominant_period_of_a_pure_tone() {
        let analyzer = FourierAnalyzer::new(8);
        let sample_rate = 1.0 / 60.0;
        let period_seconds = 3600.0;
        let signal = sine(512, period_seconds, sample_rate);
        let baseline = analyzer.analyze(&signal, sample_rate).unwrap();
        assert!(!baseline.coefficients.is_empty());
        let top = &baseline.coefficients[0];
        let expected_period_minutes = period_seconds / 60.0;
        assert!(
            (top.period_minutes - expected_period_minutes).abs() / expected_period_minutes < 0.15,
            "got {} expected {}",
            top.period_minutes,
            expected_period_minutes
        );
    }

    #[test]
    fn coefficients_are_sorted_by_amplitude_descending() {
        let analyzer = FourierAnalyzer::new(8);
        let sample_rate = 1.0 / 60.0;
        let mut signal = sine(512, 3600.0, sample_rate);
        for (i, v) in sine(512, 7200.0, sample_rate).iter().enumerate() {
            signal[i] += 0.3 * v;
        }
        let baseline = analyzer.analyze(&signal, sample_rate).unwrap();
        for pair in baseline.coefficients.windows(2) {
            assert!(pair[0].amplitude >= pair[1].amplitude);
        }
    }
}
