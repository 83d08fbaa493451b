//! Series geometry derived from the negotiated sample rate.
//!
//! All aggregation and windowing arithmetic is fixed once at startup, when the
//! actual device sample rate is known. Nothing here changes while a stream is
//! running.

use anyhow::anyhow;

/// Immutable aggregation geometry for one capture session.
///
/// Computed from the device sample rate and the chart settings; every other
/// series component is sized from this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesConfig {
    /// Device sample rate in Hz
    pub sample_rate: u32,
    /// Raw samples folded into one aggregated level
    pub agg_size: usize,
    /// Seconds of audio represented by one level
    pub time_step: f64,
    /// Number of levels spanning the display window
    pub points_count: usize,
    /// Levels per chunk; equals `points_count` so one window read touches at
    /// most two chunks
    pub chunk_capacity: usize,
}

impl SeriesConfig {
    /// Derives the series geometry from the device sample rate.
    ///
    /// # Arguments
    /// * `sample_rate` - Actual device sample rate in Hz
    /// * `chart_precision` - Aggregated points per second of audio
    /// * `timeline_length` - Seconds of history shown in the window
    ///
    /// # Errors
    /// - If `chart_precision` or `timeline_length` is zero
    /// - If the sample rate is below `chart_precision` (aggregation window
    ///   would be empty)
    pub fn new(
        sample_rate: u32,
        chart_precision: u32,
        timeline_length: u32,
    ) -> Result<Self, anyhow::Error> {
        if chart_precision == 0 {
            return Err(anyhow!("chart precision must be at least 1 point per second"));
        }
        if timeline_length == 0 {
            return Err(anyhow!("timeline length must be at least 1 second"));
        }
        if sample_rate < chart_precision {
            return Err(anyhow!(
                "sample rate {sample_rate}Hz is too low for chart precision {chart_precision}"
            ));
        }

        let agg_size = (sample_rate / chart_precision) as usize;
        let time_step = agg_size as f64 / sample_rate as f64;
        let points_count =
            (timeline_length as u64 * sample_rate as u64 / agg_size as u64) as usize;

        Ok(SeriesConfig {
            sample_rate,
            agg_size,
            time_step,
            points_count,
            chunk_capacity: points_count,
        })
    }

    /// Seconds of history the full window spans.
    pub fn window_seconds(&self) -> f64 {
        self.points_count as f64 * self.time_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_at_44100() {
        let config = SeriesConfig::new(44100, 32, 4).unwrap();
        assert_eq!(config.agg_size, 1378); // 44100 / 32, truncated
        assert_eq!(config.points_count, 4 * 44100 / 1378);
        assert_eq!(config.chunk_capacity, config.points_count);
        let expected_step = 1378.0 / 44100.0;
        assert!((config.time_step - expected_step).abs() < 1e-12);
    }

    #[test]
    fn test_geometry_at_16000() {
        let config = SeriesConfig::new(16000, 32, 4).unwrap();
        assert_eq!(config.agg_size, 500);
        assert_eq!(config.points_count, 128);
        assert!((config.time_step - 0.03125).abs() < 1e-12);
        assert!((config.window_seconds() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_zero_precision() {
        assert!(SeriesConfig::new(44100, 0, 4).is_err());
    }

    #[test]
    fn test_rejects_zero_timeline() {
        assert!(SeriesConfig::new(44100, 32, 0).is_err());
    }

    #[test]
    fn test_rejects_sample_rate_below_precision() {
        assert!(SeriesConfig::new(16, 32, 4).is_err());
    }
}
