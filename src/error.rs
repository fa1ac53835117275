//! Typed error taxonomy for the analysis core.
//!
//! Most failure modes in the pipeline are *not* represented here: an unknown
//! wavelet name falls back to db4 with a warning, a constant signal yields
//! empty coefficients, and a decomposition failure degrades to pass-through.
//! Only the handful of hard failures that the spec requires callers to see
//! get a variant.

use thiserror::Error;

/// Errors surfaced by the analysis core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stage received fewer samples than its minimum input length.
    #[error("{stage}: input too short ({len} samples, need at least {minimum})")]
    SignalTooShort {
        stage: &'static str,
        len: usize,
        minimum: usize,
    },

    /// The input sample/timestamp vectors failed a data-contract invariant.
    #[error("invalid sample series: {0}")]
    InvalidSampleSeries(String),

    /// A duration string didn't match the `^(\d+)([hdwm])$` grammar.
    #[error("invalid duration format: {0}. use: 1h, 7d, 1w, 1m")]
    InvalidDuration(String),
}
