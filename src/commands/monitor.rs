//! Live peak-level monitoring.
//!
//! Opens the configured input device, streams samples into the level series,
//! and redraws the terminal chart on a fixed cadence. Each redraw projects
//! the display window out of the series and prunes the history the window no
//! longer needs.

use crate::capture::{AudioCapture, MonitorCommand, MonitorTui};
use crate::config::PeaklineConfig;
use std::time::{Duration, Instant};

/// Command-line overrides for the monitor session.
#[derive(Debug, Default)]
pub struct MonitorOptions {
    pub device: Option<String>,
    pub timeline: Option<u32>,
    pub precision: Option<u32>,
}

/// Runs the live meter until the user quits.
pub fn handle_monitor(options: MonitorOptions) -> Result<(), anyhow::Error> {
    tracing::info!("=== peakline monitor started ===");

    let config = match PeaklineConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            return Err(anyhow::anyhow!(
                "Configuration error: {err}. Check your ~/.config/peakline/peakline.toml file."
            ));
        }
    };

    let device = options.device.unwrap_or_else(|| config.audio.device.clone());
    let timeline_length = options.timeline.unwrap_or(config.chart.timeline_length);
    let precision = options.precision.unwrap_or(config.chart.precision);

    tracing::info!(
        "Monitor settings: device={}, precision={} points/s, timeline={}s, refresh={}ms",
        device,
        precision,
        timeline_length,
        config.chart.update_interval_ms
    );

    let mut capture = AudioCapture::new(device, precision, timeline_length);
    let series = match capture.start() {
        Ok(series) => series,
        Err(e) => {
            tracing::error!("Failed to start capture: {}", e);
            return Err(e);
        }
    };

    let mut tui = MonitorTui::new(timeline_length, config.chart.peak_threshold)
        .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    let update_interval = Duration::from_millis(config.chart.update_interval_ms);
    let mut last_update = Instant::now() - update_interval;
    let mut tick_count = 0u64;

    let loop_result = loop {
        match tui.handle_input() {
            Ok(MonitorCommand::Continue) => {}
            Ok(MonitorCommand::TogglePause) => {
                capture.toggle_pause();
            }
            Ok(MonitorCommand::Quit) => {
                tracing::info!("Monitor stopped by user");
                break Ok(());
            }
            Err(e) => {
                break Err(anyhow::anyhow!("Input handling failed: {e}"));
            }
        }

        if last_update.elapsed() >= update_interval {
            last_update = Instant::now();

            // One short critical section per tick: read the window, then
            // release the chunks the read no longer reaches.
            let points = {
                let mut series = series.lock().unwrap();
                let (points, cursor) = series.project();
                series.prune(cursor);
                points
            };

            if let Err(e) = tui.render(&points) {
                break Err(anyhow::anyhow!("Rendering failed: {e}"));
            }

            tick_count += 1;
            if tick_count.is_multiple_of(600) {
                tracing::debug!("Monitor running: {} chart updates", tick_count);
            }
        }
    };

    capture.stop();
    if let Err(e) = tui.cleanup() {
        tracing::warn!("Terminal cleanup failed: {e}");
    }

    loop_result
}
