//! Analyzer configuration with TOML file round-trip.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Tunable parameters of the analysis pipeline.
///
/// # TOML Format
///
/// ```toml
/// window_size = 8192
/// peak_threshold = 30.0
/// max_peaks = 3
/// rapid_analyze_duration = 2.0
/// silence_timeout = 2.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Capture window length in frames.
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Minimum spectral magnitude for a bin to count as a peak.
    #[serde(default = "default_peak_threshold")]
    pub peak_threshold: f32,

    /// Peaks kept per time slice.
    #[serde(default = "default_max_peaks")]
    pub max_peaks: usize,

    /// Upper bound in seconds for the rapid-stage checkpoint; keeps the
    /// first match attempt early so notification latency stays low.
    #[serde(default = "default_rapid_analyze_duration")]
    pub rapid_analyze_duration: f64,

    /// Seconds without a detected peak after which a detection episode
    /// ends.
    #[serde(default = "default_silence_timeout")]
    pub silence_timeout: f64,
}

fn default_window_size() -> usize {
    8192
}

fn default_peak_threshold() -> f32 {
    30.0
}

fn default_max_peaks() -> usize {
    3
}

fn default_rapid_analyze_duration() -> f64 {
    2.0
}

fn default_silence_timeout() -> f64 {
    2.0
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size: default_window_size(),
            peak_threshold: default_peak_threshold(),
            max_peaks: default_max_peaks(),
            rapid_analyze_duration: default_rapid_analyze_duration(),
            silence_timeout: default_silence_timeout(),
        }
    }
}

impl AnalyzerConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save the configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.window_size, 8192);
        assert_eq!(config.peak_threshold, 30.0);
        assert_eq!(config.max_peaks, 3);
        assert_eq!(config.rapid_analyze_duration, 2.0);
        assert_eq!(config.silence_timeout, 2.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: AnalyzerConfig = toml::from_str("peak_threshold = 45.0").unwrap();
        assert_eq!(config.peak_threshold, 45.0);
        assert_eq!(config.window_size, 8192);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("campana.toml");

        let config = AnalyzerConfig {
            rapid_analyze_duration: 1.5,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = AnalyzerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
