//! Audio input capture.
//!
//! Opens the configured input device at its native configuration, downmixes
//! multi-channel i16 input to mono by averaging channels, and feeds every
//! callback burst into the shared level series.

use crate::series::{LevelSeries, SeriesConfig, SharedSeries};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Captures audio from a specified or default input device into a
/// [`LevelSeries`].
///
/// The series geometry is derived from the device's actual sample rate, so
/// the series only exists once `start` has negotiated the stream. Pausing
/// skips ingestion without tearing the stream down.
pub struct AudioCapture {
    /// Device name, numeric index, or "default"
    device_name: String,
    /// Aggregated points per second of audio
    chart_precision: u32,
    /// Seconds of history in the display window
    timeline_length: u32,
    /// Active input stream (kept alive while capturing)
    stream: Option<cpal::Stream>,
    /// Whether ingestion is currently paused
    is_paused: Arc<Mutex<bool>>,
}

impl AudioCapture {
    pub fn new(device_name: String, chart_precision: u32, timeline_length: u32) -> Self {
        Self {
            device_name,
            chart_precision,
            timeline_length,
            stream: None,
            is_paused: Arc::new(Mutex::new(false)),
        }
    }

    /// Opens the input device and starts streaming into a fresh series.
    ///
    /// Returns the shared series handle for the consumer side.
    ///
    /// # Errors
    /// - If the device is not available or enumeration fails
    /// - If the device configuration cannot be read
    /// - If the series geometry is invalid for the device sample rate
    /// - If stream creation or playback fails
    pub fn start(&mut self) -> Result<SharedSeries> {
        // Get device while suppressing ALSA library warnings
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device()
                    .ok_or_else(|| anyhow!("No audio input device available"))
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Capture device: {}", device_name);

        let device_config = device.default_input_config()?;
        if device_config.sample_format() != cpal::SampleFormat::I16 {
            return Err(anyhow!(
                "Device '{}' does not capture signed 16-bit samples (native format: {})",
                device_name,
                device_config.sample_format()
            ));
        }
        let sample_rate = device_config.sample_rate().0;
        let num_channels = device_config.channels() as usize;

        tracing::debug!(
            "Device configuration: {}Hz, {} channels",
            sample_rate,
            num_channels
        );

        let config = SeriesConfig::new(sample_rate, self.chart_precision, self.timeline_length)?;
        tracing::info!(
            "Series geometry: {} samples/level, {} points over {}s",
            config.agg_size,
            config.points_count,
            self.timeline_length
        );

        let series = LevelSeries::shared(config);

        let series_arc = Arc::clone(&series);
        let pause_arc = Arc::clone(&self.is_paused);
        let callback_channels = num_channels;

        let stream = device.build_input_stream(
            &device_config.into(),
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let is_paused = *pause_arc.lock().unwrap();
                if !is_paused {
                    Self::handle_audio_callback(data, &series_arc, callback_channels);
                }
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        self.stream = Some(stream);

        tracing::debug!("Audio stream started");
        Ok(series)
    }

    /// Stops the audio stream.
    pub fn stop(&mut self) {
        self.stream = None;
        tracing::debug!("Audio stream stopped");
    }

    /// Handles one burst of samples from the audio callback.
    ///
    /// Downmixes to mono, then folds the burst into the series under its
    /// lock. Kept short: the lock spans one burst's aggregation, nothing
    /// else.
    fn handle_audio_callback(data: &[i16], series_arc: &SharedSeries, num_channels: usize) {
        match num_channels {
            1 => {
                series_arc.lock().unwrap().ingest(data);
            }
            2 => {
                // Stereo: average pairs of samples
                let mono: Vec<i16> = data
                    .chunks_exact(2)
                    .map(|frame| {
                        let left = frame[0] as i32;
                        let right = frame[1] as i32;
                        ((left + right) / 2) as i16
                    })
                    .collect();
                series_arc.lock().unwrap().ingest(&mono);
            }
            _ => {
                // Multi-channel: average all channels per frame
                let mono: Vec<i16> = data
                    .chunks_exact(num_channels)
                    .map(|frame| {
                        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                        (sum / num_channels as i32) as i16
                    })
                    .collect();
                series_arc.lock().unwrap().ingest(&mono);
            }
        }
    }

    /// Toggles between paused and capturing states.
    pub fn toggle_pause(&self) {
        let mut paused = self.is_paused.lock().unwrap();
        *paused = !*paused;
        if *paused {
            tracing::debug!("Capture paused");
        } else {
            tracing::debug!("Capture resumed");
        }
    }
}

/// Finds an audio input device by name or numeric index.
///
/// # Arguments
/// * `host` - The cpal audio host
/// * `device_spec` - Either "default", a device name, or a numeric index (0, 1, 2, etc.)
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    // Try to parse as a numeric index first
    if let Ok(index) = device_spec.parse::<usize>() {
        let devices: Vec<_> = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?
            .collect();

        if index < devices.len() {
            return Ok(devices.into_iter().nth(index).unwrap());
        } else {
            return Err(anyhow!(
                "Device index {} is out of range (0-{})",
                index,
                devices.len().saturating_sub(1)
            ));
        }
    }

    // Try to find by name
    let devices = host
        .input_devices()
        .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

    for device in devices {
        if let Ok(name) = device.name() {
            if name == device_spec {
                return Ok(device);
            }
        }
    }

    Err(anyhow!(
        "Audio input device '{device_spec}' not found. Use 'peakline list-devices' to see available devices."
    ))
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
/// On non-Linux platforms, this is a no-op since ALSA doesn't exist.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// On non-Linux platforms, no stderr suppression is needed since ALSA doesn't exist.
#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
