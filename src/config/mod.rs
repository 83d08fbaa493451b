//! Configuration management for peakline.
//!
//! Loads and saves application configuration from a TOML file in the user's
//! config directory.

pub mod file;

pub use file::{get_config_path, AudioConfig, ChartConfig, PeaklineConfig};
