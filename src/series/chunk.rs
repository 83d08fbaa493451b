//! Backward-linked chunk storage for the aggregated level history.
//!
//! Levels are appended to a fixed-capacity head chunk; when the head fills, a
//! fresh chunk is allocated and takes ownership of the old head through its
//! `previous` link. Readers only ever start from the head, so the chain needs
//! no forward links and no shared ownership.

/// Fixed-capacity block of consecutive levels plus an owning link to the
/// older chunk.
///
/// Every chunk except the head is completely full; the head's fill cursor is
/// strictly below capacity between appends.
pub struct Chunk {
    levels: Box<[u8]>,
    filled: usize,
    previous: Option<Box<Chunk>>,
}

impl Chunk {
    fn new(capacity: usize) -> Self {
        Chunk {
            levels: vec![0u8; capacity].into_boxed_slice(),
            filled: 0,
            previous: None,
        }
    }

    /// Number of levels written into this chunk.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Level at `index`, which must be below `filled()`.
    pub fn level(&self, index: usize) -> u8 {
        self.levels[index]
    }

    /// The next-older chunk, if any.
    pub fn previous(&self) -> Option<&Chunk> {
        self.previous.as_deref()
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // Unlink the tail iteratively so an unpruned chain cannot recurse
        // through thousands of destructors.
        let mut older = self.previous.take();
        while let Some(mut chunk) = older {
            older = chunk.previous.take();
        }
    }
}

/// Position of the oldest chunk visited by a projection, used to prune the
/// chain afterwards.
///
/// The cursor records how many `previous` links the projection followed from
/// the head, together with the chain's rollover count at that moment. If the
/// producer rolls over to a new head between the projection and the prune,
/// the depth is re-based so the cut lands on the same chunk.
#[derive(Debug, Clone, Copy)]
pub struct PruneCursor {
    depth: usize,
    rollovers: u64,
}

impl PruneCursor {
    pub(crate) fn new(depth: usize, rollovers: u64) -> Self {
        PruneCursor { depth, rollovers }
    }
}

/// The full retained level history: an owned backward list of chunks.
///
/// Appends go to the head; window reads walk backwards from the head; pruning
/// cuts the list just past the oldest chunk a read touched. With pruning
/// after every read, at most two chunks stay reachable in steady state.
pub struct ChunkChain {
    head: Box<Chunk>,
    capacity: usize,
    rollovers: u64,
}

impl ChunkChain {
    /// Creates a chain holding a single empty chunk of `capacity` levels.
    pub fn new(capacity: usize) -> Self {
        ChunkChain {
            head: Box::new(Chunk::new(capacity)),
            capacity,
            rollovers: 0,
        }
    }

    /// Appends one level, rolling over to a freshly allocated head chunk when
    /// the current head is full.
    pub fn append(&mut self, level: u8) {
        if self.head.filled == self.capacity {
            let old_head = std::mem::replace(&mut self.head, Box::new(Chunk::new(self.capacity)));
            self.head.previous = Some(old_head);
            self.rollovers += 1;
        }
        self.head.levels[self.head.filled] = level;
        self.head.filled += 1;
    }

    /// The newest chunk.
    pub fn head(&self) -> &Chunk {
        &self.head
    }

    /// Chunk capacity in levels.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of head rollovers since the chain was created.
    pub(crate) fn rollovers(&self) -> u64 {
        self.rollovers
    }

    /// Discards every chunk older than the one the cursor points at.
    ///
    /// The cursor must come from the most recent projection of this chain;
    /// appends that happened since are accounted for through the rollover
    /// count. The head itself is never detached.
    pub fn prune(&mut self, cursor: PruneCursor) {
        let grown = (self.rollovers - cursor.rollovers) as usize;
        let depth = cursor.depth + grown;

        let mut chunk = &mut *self.head;
        for _ in 0..depth {
            chunk = match chunk.previous {
                Some(ref mut older) => older,
                None => return,
            };
        }
        chunk.previous = None;
    }

    /// Number of chunks currently reachable from the head.
    #[cfg(test)]
    pub(crate) fn chunk_count(&self) -> usize {
        let mut count = 1;
        let mut chunk = &*self.head;
        while let Some(older) = chunk.previous() {
            count += 1;
            chunk = older;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(chain: &mut ChunkChain, levels: impl IntoIterator<Item = u8>) {
        for level in levels {
            chain.append(level);
        }
    }

    #[test]
    fn test_append_fills_head_in_order() {
        let mut chain = ChunkChain::new(4);
        fill(&mut chain, [10, 20, 30]);
        assert_eq!(chain.head().filled(), 3);
        assert_eq!(chain.head().level(0), 10);
        assert_eq!(chain.head().level(2), 30);
        assert_eq!(chain.chunk_count(), 1);
    }

    #[test]
    fn test_rollover_allocates_new_head() {
        let mut chain = ChunkChain::new(2);
        fill(&mut chain, [1, 2, 3]);
        assert_eq!(chain.chunk_count(), 2);
        assert_eq!(chain.head().filled(), 1);
        assert_eq!(chain.head().level(0), 3);
        let older = chain.head().previous().unwrap();
        assert_eq!(older.filled(), 2);
        assert_eq!(older.level(0), 1);
        assert_eq!(older.level(1), 2);
    }

    #[test]
    fn test_non_head_chunks_stay_full() {
        let mut chain = ChunkChain::new(3);
        fill(&mut chain, 0..10);
        let mut chunk = chain.head();
        while let Some(older) = chunk.previous() {
            assert_eq!(older.filled(), 3);
            chunk = older;
        }
    }

    #[test]
    fn test_prune_at_head_drops_all_older_chunks() {
        let mut chain = ChunkChain::new(2);
        fill(&mut chain, 0..9);
        assert!(chain.chunk_count() > 2);

        let cursor = PruneCursor::new(0, chain.rollovers());
        chain.prune(cursor);
        assert_eq!(chain.chunk_count(), 1);
        assert_eq!(chain.head().filled(), 1);
    }

    #[test]
    fn test_prune_keeps_cursor_chunk() {
        let mut chain = ChunkChain::new(2);
        fill(&mut chain, 0..7); // four chunks: [0,1] [2,3] [4,5] [6_]
        let cursor = PruneCursor::new(1, chain.rollovers());
        chain.prune(cursor);
        assert_eq!(chain.chunk_count(), 2);
        let older = chain.head().previous().unwrap();
        assert_eq!((older.level(0), older.level(1)), (4, 5));
    }

    #[test]
    fn test_prune_rebases_after_rollover() {
        let mut chain = ChunkChain::new(2);
        fill(&mut chain, 0..5); // [4_] <- [2,3] <- [0,1]
        let cursor = PruneCursor::new(1, chain.rollovers());

        // Producer appends past another rollover before prune runs.
        fill(&mut chain, [9, 9, 9]);
        chain.prune(cursor);

        // The chunk the cursor named ([2,3]) survives; only the chunks
        // older than it ([0,1]) are discarded.
        let mut oldest = chain.head();
        while let Some(older) = oldest.previous() {
            oldest = older;
        }
        assert_eq!((oldest.level(0), oldest.level(1)), (2, 3));
        assert_eq!(chain.chunk_count(), 3);
    }

    #[test]
    fn test_prune_past_end_is_harmless() {
        let mut chain = ChunkChain::new(4);
        fill(&mut chain, [1, 2]);
        chain.prune(PruneCursor::new(5, chain.rollovers()));
        assert_eq!(chain.chunk_count(), 1);
        assert_eq!(chain.head().level(1), 2);
    }

    #[test]
    fn test_deep_unpruned_chain_drops_without_recursion() {
        let mut chain = ChunkChain::new(2);
        fill(&mut chain, (0..200_000).map(|i| (i % 100) as u8));
        assert!(chain.chunk_count() >= 100_000);
        drop(chain);
    }
}
