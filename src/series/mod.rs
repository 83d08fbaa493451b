//! Rolling peak-level time series.
//!
//! Converts raw 16-bit sample bursts into a bounded history of 0-100 peak
//! levels and serves fixed-duration windows of it for rendering. The audio
//! callback is the producer, the render loop the consumer; both go through
//! one short-held lock around the [`LevelSeries`].

pub mod aggregate;
pub mod chunk;
pub mod config;
pub mod window;

pub use aggregate::Aggregator;
pub use chunk::{ChunkChain, PruneCursor};
pub use config::SeriesConfig;
pub use window::WindowPoint;

use std::sync::{Arc, Mutex};

/// The shared form both threads hold.
pub type SharedSeries = Arc<Mutex<LevelSeries>>;

/// The complete aggregation pipeline for one capture session: geometry,
/// running peak state, and the retained chunk chain.
pub struct LevelSeries {
    config: SeriesConfig,
    aggregator: Aggregator,
    chain: ChunkChain,
}

impl LevelSeries {
    pub fn new(config: SeriesConfig) -> Self {
        LevelSeries {
            aggregator: Aggregator::new(config.agg_size),
            chain: ChunkChain::new(config.chunk_capacity),
            config,
        }
    }

    /// Wraps a fresh series for sharing between the capture and render
    /// threads.
    pub fn shared(config: SeriesConfig) -> SharedSeries {
        Arc::new(Mutex::new(LevelSeries::new(config)))
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    /// Folds one callback burst into the history. Producer path.
    pub fn ingest(&mut self, samples: &[i16]) {
        self.aggregator.ingest(samples, &mut self.chain);
    }

    /// Reads the full display window, newest point first. Consumer path.
    pub fn project(&self) -> (Vec<WindowPoint>, PruneCursor) {
        self.project_window(self.config.points_count)
    }

    /// Reads the most recent `window` points, zero-padded past the recorded
    /// history.
    pub fn project_window(&self, window: usize) -> (Vec<WindowPoint>, PruneCursor) {
        window::project(&self.chain, window, self.config.time_step)
    }

    /// Releases chunks older than the oldest one the given projection
    /// visited. Call with the cursor of the most recent projection.
    pub fn prune(&mut self, cursor: PruneCursor) {
        self.chain.prune(cursor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn test_series(agg_size: usize, points_count: usize) -> LevelSeries {
        // Geometry assembled directly so tests control agg_size exactly.
        LevelSeries::new(SeriesConfig {
            sample_rate: 1000,
            agg_size,
            time_step: agg_size as f64 / 1000.0,
            points_count,
            chunk_capacity: points_count,
        })
    }

    #[test]
    fn test_ingest_project_example() {
        let mut series = test_series(4, 8);
        series.ingest(&[100, -200, 300, 16383]);
        series.ingest(&[-32767, 1, 1, 1]);

        let (points, _) = series.project_window(2);
        assert_eq!(points[0].level, 100);
        assert!((points[0].time_offset - 0.0).abs() < 1e-12);
        assert_eq!(points[1].level, 49);
        assert!((points[1].time_offset + series.config().time_step).abs() < 1e-12);
    }

    #[test]
    fn test_full_window_always_sized_to_config() {
        let mut series = test_series(2, 5);
        series.ingest(&[9000, 9000]);
        let (points, _) = series.project();
        assert_eq!(points.len(), 5);
        assert_eq!(points.iter().filter(|p| p.level > 0).count(), 1);
    }

    #[test]
    fn test_steady_state_memory_stays_bounded() {
        let mut series = test_series(1, 4);
        // Many display ticks' worth of appends, pruning after each read.
        for round in 0..50 {
            let samples = vec![500i16; 3 + round % 4];
            series.ingest(&samples);
            let (points, cursor) = series.project();
            assert_eq!(points.len(), 4);
            series.prune(cursor);
        }
        assert!(series.chain.chunk_count() <= 2);
    }

    #[test]
    fn test_interleaved_append_between_project_and_prune() {
        let mut series = test_series(1, 3);
        series.ingest(&[100, 200, 300, 400]);
        let (before, cursor) = series.project();

        // Producer squeezes in more bursts, forcing rollovers, before the
        // consumer gets to prune.
        series.ingest(&[500i16; 7]);
        series.prune(cursor);

        // Everything the pruned-for window covered is still reconstructible
        // relative to the pre-append head.
        let (after, _) = series.project();
        assert_eq!(after.len(), 3);
        assert!(after.iter().all(|p| p.level > 0));
        assert_eq!(before.len(), 3);
    }

    #[test]
    fn test_producer_and_consumer_share_series() {
        let shared = LevelSeries::shared(SeriesConfig {
            sample_rate: 1000,
            agg_size: 2,
            time_step: 0.002,
            points_count: 16,
            chunk_capacity: 16,
        });

        let producer = {
            let series = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..400 {
                    let burst = vec![(i % 3000) as i16; 5];
                    series.lock().unwrap().ingest(&burst);
                }
            })
        };

        for _ in 0..100 {
            let mut series = shared.lock().unwrap();
            let (points, cursor) = series.project();
            assert_eq!(points.len(), 16);
            assert!(points.iter().all(|p| p.level <= 100));
            series.prune(cursor);
        }
        producer.join().unwrap();

        let series = shared.lock().unwrap();
        let (points, _) = series.project();
        assert_eq!(points.len(), 16);
    }
}
