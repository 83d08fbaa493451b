//! Windowed read of the level history for rendering.
//!
//! Reconstructs the most recent N levels by walking the chunk chain backwards
//! from the head, newest first. Where the recorded history is shorter than
//! the requested window, every missing slot is padded with a zero level so
//! the chart always receives a full window.

use crate::series::chunk::{ChunkChain, PruneCursor};

/// One chart point: seconds before now (zero or negative) and a level in
/// [0,100].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPoint {
    pub time_offset: f64,
    pub level: u8,
}

/// Projects the most recent `window` levels out of the chain.
///
/// Returns exactly `window` points ordered newest first, the i-th at
/// `time_offset = -(i * time_step)`, plus a cursor naming the oldest chunk
/// the walk touched (handed to [`ChunkChain::prune`] afterwards).
pub fn project(chain: &ChunkChain, window: usize, time_step: f64) -> (Vec<WindowPoint>, PruneCursor) {
    let mut points = Vec::with_capacity(window);
    let mut chunk = chain.head();
    let mut cursor = chunk.filled();
    let mut depth = 0;

    for i in 0..window {
        if cursor == 0 {
            match chunk.previous() {
                Some(older) => {
                    chunk = older;
                    cursor = older.filled();
                    depth += 1;
                }
                None => {
                    // History exhausted: zero-fill the rest of the window.
                    for j in i..window {
                        points.push(WindowPoint {
                            time_offset: -(j as f64 * time_step),
                            level: 0,
                        });
                    }
                    break;
                }
            }
        }
        cursor -= 1;
        points.push(WindowPoint {
            time_offset: -(i as f64 * time_step),
            level: chunk.level(cursor),
        });
    }

    (points, PruneCursor::new(depth, chain.rollovers()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: f64 = 0.25;

    fn chain_with(capacity: usize, levels: impl IntoIterator<Item = u8>) -> ChunkChain {
        let mut chain = ChunkChain::new(capacity);
        for level in levels {
            chain.append(level);
        }
        chain
    }

    fn levels(points: &[WindowPoint]) -> Vec<u8> {
        points.iter().map(|p| p.level).collect()
    }

    #[test]
    fn test_returns_exactly_window_points_newest_first() {
        let chain = chain_with(8, [10, 20, 30, 40]);
        let (points, _) = project(&chain, 3, STEP);
        assert_eq!(levels(&points), vec![40, 30, 20]);
        for (i, point) in points.iter().enumerate() {
            assert!((point.time_offset - -(i as f64 * STEP)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_walks_across_chunk_boundary() {
        // capacity 3: chunks [1,2,3] [4,5_]
        let chain = chain_with(3, [1, 2, 3, 4, 5]);
        let (points, _) = project(&chain, 5, STEP);
        assert_eq!(levels(&points), vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_short_history_pads_every_missing_slot() {
        let chain = chain_with(8, [7, 9]);
        let (points, _) = project(&chain, 5, STEP);
        assert_eq!(levels(&points), vec![9, 7, 0, 0, 0]);
        // Padded points keep the offset progression going.
        assert!((points[4].time_offset - -(4.0 * STEP)).abs() < 1e-12);
    }

    #[test]
    fn test_empty_history_is_all_zeros() {
        let chain = ChunkChain::new(4);
        let (points, _) = project(&chain, 4, STEP);
        assert_eq!(levels(&points), vec![0, 0, 0, 0]);
        assert!((points[0].time_offset - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_projection_is_idempotent() {
        let chain = chain_with(3, 1..=7);
        let (first, _) = project(&chain, 6, STEP);
        let (second, _) = project(&chain, 6, STEP);
        assert_eq!(first, second);
    }

    #[test]
    fn test_projection_unchanged_after_prune() {
        let mut chain = chain_with(3, 1..=8);
        let (before, cursor) = project(&chain, 5, STEP);
        chain.prune(cursor);
        let (after, _) = project(&chain, 5, STEP);
        assert_eq!(before, after);

        // Smaller windows over the pruned chain are intact too.
        let (small, _) = project(&chain, 2, STEP);
        assert_eq!(&small[..], &before[..2]);
    }

    #[test]
    fn test_padding_does_not_extend_prune_depth() {
        let chain = chain_with(4, [5]);
        let (_, cursor) = project(&chain, 4, STEP);
        let mut chain = chain;
        chain.prune(cursor);
        let (points, _) = project(&chain, 4, STEP);
        assert_eq!(levels(&points), vec![5, 0, 0, 0]);
    }
}
