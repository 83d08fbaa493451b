//! Peak aggregation of raw sample bursts into chart levels.
//!
//! The audio callback hands over bursts of arbitrary length; the aggregator
//! folds every `agg_size` consecutive samples into one peak level and appends
//! it to the chain. Aggregation boundaries are independent of burst
//! boundaries: leftover state carries over between calls.

use crate::series::chunk::ChunkChain;

/// Running peak state for the in-progress aggregation window.
pub struct Aggregator {
    agg_size: usize,
    /// Peak absolute magnitude so far; u16 so |i16::MIN| = 32768 fits
    running_max: u16,
    running_count: usize,
}

impl Aggregator {
    pub fn new(agg_size: usize) -> Self {
        Aggregator {
            agg_size,
            running_max: 0,
            running_count: 0,
        }
    }

    /// Folds one burst of mono samples into the chain.
    ///
    /// Accepts any burst length, including empty. Each completed aggregation
    /// window emits one level; a partial window stays pending for the next
    /// call. No allocation happens here except chunk rollover inside
    /// [`ChunkChain::append`].
    pub fn ingest(&mut self, samples: &[i16], chain: &mut ChunkChain) {
        for &sample in samples {
            let magnitude = sample.unsigned_abs();
            if magnitude > self.running_max {
                self.running_max = magnitude;
            }
            self.running_count += 1;
            if self.running_count == self.agg_size {
                chain.append(scale_level(self.running_max));
                self.running_max = 0;
                self.running_count = 0;
            }
        }
    }

    /// Samples accumulated toward the next level.
    pub fn pending(&self) -> usize {
        self.running_count
    }
}

/// Maps a peak magnitude onto the 0-100 display scale.
///
/// Truncating integer division, so the mapping is reproducible across the
/// full 16-bit range. Clamped because |i16::MIN| lands one past i16::MAX.
fn scale_level(peak: u16) -> u8 {
    ((peak as u32 * 100) / i16::MAX as u32).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collected(chain: &ChunkChain) -> Vec<u8> {
        let head = chain.head();
        (0..head.filled()).map(|i| head.level(i)).collect()
    }

    #[test]
    fn test_level_uses_truncating_division() {
        let mut chain = ChunkChain::new(16);
        let mut agg = Aggregator::new(4);
        agg.ingest(&[100, -200, 300, 16383], &mut chain);
        // floor(16383 * 100 / 32767) = 49
        assert_eq!(collected(&chain), vec![49]);

        agg.ingest(&[32767, 0, 0, 0], &mut chain);
        assert_eq!(collected(&chain), vec![49, 100]);
    }

    #[test]
    fn test_state_carries_across_bursts() {
        let mut chain = ChunkChain::new(16);
        let mut agg = Aggregator::new(4);
        agg.ingest(&[1000], &mut chain);
        agg.ingest(&[], &mut chain);
        agg.ingest(&[2000, -3000], &mut chain);
        assert_eq!(collected(&chain), vec![]);
        assert_eq!(agg.pending(), 3);

        agg.ingest(&[500], &mut chain);
        // floor(3000 * 100 / 32767) = 9
        assert_eq!(collected(&chain), vec![9]);
        assert_eq!(agg.pending(), 0);
    }

    #[test]
    fn test_level_count_is_total_samples_over_agg_size() {
        let mut chain = ChunkChain::new(64);
        let mut agg = Aggregator::new(5);
        // 23 samples split over irregular bursts: floor(23 / 5) = 4 levels.
        for burst in [7usize, 1, 9, 6] {
            let samples = vec![1i16; burst];
            agg.ingest(&samples, &mut chain);
        }
        assert_eq!(collected(&chain).len(), 4);
        assert_eq!(agg.pending(), 3);
    }

    #[test]
    fn test_empty_burst_is_a_no_op() {
        let mut chain = ChunkChain::new(8);
        let mut agg = Aggregator::new(4);
        agg.ingest(&[], &mut chain);
        assert_eq!(agg.pending(), 0);
        assert_eq!(collected(&chain), vec![]);
    }

    #[test]
    fn test_i16_min_clamps_to_100() {
        let mut chain = ChunkChain::new(8);
        let mut agg = Aggregator::new(1);
        agg.ingest(&[i16::MIN], &mut chain);
        assert_eq!(collected(&chain), vec![100]);
    }

    #[test]
    fn test_levels_stay_within_display_range() {
        let mut chain = ChunkChain::new(256);
        let mut agg = Aggregator::new(3);
        let samples: Vec<i16> = (0..750).map(|i| (i * 387 % 65536 - 32768) as i16).collect();
        agg.ingest(&samples, &mut chain);
        assert!(collected(&chain).iter().all(|&level| level <= 100));
    }
}
