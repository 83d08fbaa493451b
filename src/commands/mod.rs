//! Application command handlers for peakline.
//!
//! Each submodule handles one application command.
//!
//! # Commands
//! - `monitor`: Live peak-level chart (default command)
//! - `list_devices`: List available audio input devices
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod list_devices;
pub mod logs;
pub mod monitor;

pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use monitor::{handle_monitor, MonitorOptions};
