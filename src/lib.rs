// Copyright (c) 2026 rhythmic contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! rhythmic - traffic pattern analysis engine
//!
//! Decomposes a request-rate time series into a wavelet approximation and
//! detail bands, derives a compact Fourier baseline from the approximation,
//! detects and clusters spikes across both a direct and a wavelet
//! high-frequency channel, classifies the dominant pattern with a
//! deterministic rule cascade, and assembles everything into a versioned,
//! serializable traffic model.
//!
//! # Architecture
//!
//! ```text
//! SampleSeries
//!      │
//!      ▼
//! Decomposer ──► Decomposition (approximation, details, energy)
//!      │
//!      ▼ (approximation)
//! FourierAnalyzer ──► FourierBaseline (mean, std, ranked coefficients)
//!      │
//!      ▼ (+ original series, + detail bands)
//! SpikeDetector ──► SpikeResult (events, distribution)
//!      │
//!      ▼ (+ FourierBaseline, + SpikeResult)
//! PatternClassifier ──► PatternVerdict
//!      │
//!      ▼
//! ModelAssembler ──► TrafficModel
//! ```

#![warn(missing_docs)]
#![allow(dead_code)]

pub mod collector;
pub mod config;
pub mod decomposition;
pub mod duration;
pub mod error;
pub mod fourier;
pub mod model;
pub mod numeric;
pub mod pattern;
pub mod pipeline;
pub mod spikes;
pub mod statistics;

pub use collector::PrometheusCollector;
pub use config::{Config, PipelineConfig};
pub use decomposition::{Decomposer, Decomposition};
pub use duration::parse_duration;
pub use error::CoreError;
pub use fourier::{FourierAnalyzer, FourierBaseline, FrequencyCoefficient};
pub use model::{DecompositionSummary, Metadata, ModelAssembler, SampleSeries, TrafficModel, Validator};
pub use pattern::{PatternClassifier, PatternType, PatternVerdict, SpikeFrequency};
pub use pipeline::TrafficModeler;
pub use spikes::{SpikeDetector, SpikeDistribution, SpikeEvent, SpikeResult};
pub use statistics::{StatisticalSummary, StatisticsAggregator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = "rhythmic";
