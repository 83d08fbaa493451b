//! Configuration file management for peakline.
//!
//! Handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `peakline list-devices`
    /// - device name from `peakline list-devices`
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig {
            device: default_device(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

/// Chart geometry and refresh configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Aggregated points per second of audio
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Seconds of history shown in the chart window
    #[serde(default = "default_timeline_length")]
    pub timeline_length: u32,
    /// Chart refresh cadence in milliseconds
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Peak readout turns red at or above this level (0-100)
    #[serde(default = "default_peak_threshold")]
    pub peak_threshold: u8,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            precision: default_precision(),
            timeline_length: default_timeline_length(),
            update_interval_ms: default_update_interval_ms(),
            peak_threshold: default_peak_threshold(),
        }
    }
}

fn default_precision() -> u32 {
    32
}

fn default_timeline_length() -> u32 {
    4
}

fn default_update_interval_ms() -> u64 {
    100
}

fn default_peak_threshold() -> u8 {
    90
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PeaklineConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub chart: ChartConfig,
}

impl PeaklineConfig {
    /// Loads configuration from the user's config directory, falling back to
    /// defaults when no config file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If an existing config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::info!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(PeaklineConfig::default());
        }
        let config_content = fs::read_to_string(&config_path)?;
        let config: PeaklineConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = get_config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the peakline configuration file, creating the
/// config directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("peakline");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("peakline.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PeaklineConfig::default();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.chart.precision, 32);
        assert_eq!(config.chart.timeline_length, 4);
        assert_eq!(config.chart.update_interval_ms, 100);
        assert_eq!(config.chart.peak_threshold, 90);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: PeaklineConfig = toml::from_str(
            r#"
            [chart]
            timeline_length = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.chart.timeline_length, 8);
        assert_eq!(config.chart.precision, 32);
        assert_eq!(config.audio.device, "default");
    }

    #[test]
    fn test_round_trips_through_toml() {
        let mut config = PeaklineConfig::default();
        config.audio.device = "1".to_string();
        config.chart.update_interval_ms = 250;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: PeaklineConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.audio.device, "1");
        assert_eq!(parsed.chart.update_interval_ms, 250);
    }
}
