//! Numeric primitives shared by the decomposition, Fourier, and spike stages.

/// Sum of squares. Non-negative by construction.
pub fn energy(x: &[f64]) -> f64 {
    x.iter().map(|&v| v * v).sum()
}

/// Pads `x` with its last value out to the next power of two. Returns the
/// padded vector alongside the original (pre-pad) length so callers can
/// truncate back down after any length-sensitive transform.
///
/// If `x` is already a power-of-two length (or empty), it is returned
/// unchanged.
pub fn pad_to_power_of_two(x: &[f64]) -> (Vec<f64>, usize) {
    let original_len = x.len();
    if original_len == 0 {
        return (Vec::new(), 0);
    }

    let next_pow2 = original_len.next_power_of_two();
    if next_pow2 == original_len {
        return (x.to_vec(), original_len);
    }

    let last = *x.last().unwrap();
    let mut padded = Vec::with_capacity(next_pow2);
    padded.extend_from_slice(x);
    padded.resize(next_pow2, last);
    (padded, original_len)
}

/// `w`-point "same"-length moving average with a box kernel. `w <= 1` is the
/// identity.
pub fn moving_average(x: &[f64], w: usize) -> Vec<f64> {
    if w <= 1 || x.is_empty() {
        return x.to_vec();
    }

    let n = x.len();
    let half = w / 2;
    (0..n)
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + (w - half)).min(n);
            let slice = &x[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Indices of simple local maxima strictly above `threshold`.
pub fn simple_peaks(x: &[f64], threshold: f64) -> Vec<usize> {
    if x.len() < 3 {
        return Vec::new();
    }
    (1..x.len() - 1)
        .filter(|&i| x[i] > x[i - 1] && x[i] > x[i + 1] && x[i] > threshold)
        .collect()
}

/// Mean and population standard deviation (`ddof = 0`, matching the
/// reference implementation's `numpy.std`).
pub fn mean_std(x: &[f64]) -> (f64, f64) {
    if x.is_empty() {
        return (0.0, 0.0);
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<f64>() / n;
    let variance = x.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Median of `x`. Not order-preserving; clones and sorts internally.
pub fn median(x: &[f64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentile (0-100) of a pre-sorted slice, linearly interpolated between
/// order statistics (matches `numpy.percentile`'s default `linear` method).
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi || hi >= sorted.len() {
        sorted[lo.min(sorted.len() - 1)]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}
