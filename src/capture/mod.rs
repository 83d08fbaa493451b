//! Live audio capture feeding the level series.
//!
//! Provides the cpal input stream that produces sample bursts and the
//! terminal chart that consumes the projected window.

pub mod audio;
pub mod ui;

pub use audio::AudioCapture;
pub use ui::{MonitorCommand, MonitorTui};
