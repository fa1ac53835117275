// Copyright (c) 2026 rhythmic contributors
// Licensed under the MIT License. See LICENSE file in the project root.

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Tunables for the analysis pipeline itself (wavelet choice, spike
/// sensitivity, peak budget).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Wavelet family name. Unknown names fall back to `db4` with a warning.
    pub wavelet: String,

    /// Number of decomposition levels.
    pub wavelet_levels: usize,

    /// Spike threshold in standard deviations above the mean.
    pub spike_threshold_sigma: f64,

    /// Maximum number of ranked Fourier coefficients to keep.
    pub fourier_peak_count: usize,

    /// Maximum gap between spikes, in minutes, before they're treated as
    /// separate events.
    pub spike_cluster_gap_minutes: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            wavelet: "db4".to_string(),
            wavelet_levels: 5,
            spike_threshold_sigma: 3.0,
            fourier_peak_count: 8,
            spike_cluster_gap_minutes: 10.0,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Application version
    pub version: String,

    /// Default output path for learned models
    pub output_path: PathBuf,

    /// Log level
    pub log_level: String,

    /// Default metrics-backend base URL
    pub prometheus_url: String,

    /// Default metric name to learn from
    pub default_metric: String,

    /// Pipeline (analysis) configuration
    pub pipeline: PipelineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "rhythmic".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            output_path: PathBuf::from("./traffic-model.json"),
            log_level: "info".to_string(),
            prometheus_url: "http://localhost:9090".to_string(),
            default_metric: "http_requests_total".to_string(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("rhythmic"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_defaults_match_spec() {
        let config = PipelineConfig::default();
        assert_eq!(config.wavelet, "db4");
        assert_eq!(config.wavelet_levels, 5);
        assert_eq!(config.spike_threshold_sigma, 3.0);
        assert_eq!(config.fourier_peak_count, 8);
        assert_eq!(config.spike_cluster_gap_minutes, 10.0);
    }

    #[test]
    fn load_or_create_round_trips_through_toml() {
        let dir = std::env::temp_dir().join(format!("rhythmic-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = std::fs::remove_file(&path);

        let created = Config::load_or_create(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(created.app_name, loaded.app_name);
        assert_eq!(loaded.pipeline.wavelet, "db4");

        std::fs::remove_file(&path).unwrap();
    }
}
