/*!
 * Heap Management
 *
 * First-fit allocator over a fixed arena with a conservative mark-and-sweep
 * collector.
 *
 * ## Layout
 *
 * - **Arena**: one fixed, zero-initialized block of words per heap
 * - **Free list**: address-ordered chunks available for allocation
 * - **Allocated list**: address-ordered chunks owned by callers
 *
 * Together the two lists always partition the arena.
 *
 * ## Policies
 *
 * - **First-fit**: the lowest-addressed free chunk large enough wins
 * - **Splitting**: the unused tail of a chosen chunk goes back to the free list
 * - **Coalescing**: adjacent free chunks are merged on every allocation, not on free
 * - **Collection**: unreachable allocations are swept through the ordinary free path
 */

mod allocator;
mod gc;

use super::arena::Arena;
use super::chunk_list::ChunkList;
use super::gc::{Collector, GcStats};
use super::traits::{Allocator, GarbageCollector, RootProvider};
use super::types::{Chunk, HeapError, HeapResult, HeapStats, ListKind};
use crate::core::config::HeapConfig;
use crate::core::types::{Address, Size, WORD_SIZE};
use std::fmt;
use tracing::info;

/// Fixed-arena heap
pub struct Heap {
    pub(super) arena: Arena,
    pub(super) free: ChunkList,
    pub(super) allocated: ChunkList,
    pub(super) config: HeapConfig,
    // Reachability flags and pending-free buffer, reused across cycles
    collector: Collector,
}

impl Heap {
    pub fn new() -> Self {
        Self::build(HeapConfig::default())
    }

    /// Create a heap with a custom configuration (useful for testing)
    pub fn with_config(config: HeapConfig) -> HeapResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: HeapConfig) -> Self {
        let arena = Arena::new(config.heap_words());
        let capacity = config.max_chunk_count;

        info!(
            heap_bytes = arena.len() * WORD_SIZE,
            heap_words = arena.len(),
            max_chunks = capacity,
            free_policy = ?config.free_policy,
            "Heap initialized with a single free chunk spanning the arena"
        );

        Self {
            free: ChunkList::seeded(ListKind::Free, capacity, Chunk::new(0, arena.len())),
            allocated: ChunkList::new(ListKind::Allocated, capacity),
            arena,
            config,
            collector: Collector::default(),
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }

    pub fn free_list(&self) -> &ChunkList {
        &self.free
    }

    pub fn allocated_list(&self) -> &ChunkList {
        &self.allocated
    }

    pub(crate) fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Machine address of a chunk's first word
    pub fn address_of(&self, chunk: &Chunk) -> Address {
        self.arena.address_of(chunk.start)
    }

    /// Arena length in words
    pub fn capacity_words(&self) -> Size {
        self.arena.len()
    }

    /// True if `value` points anywhere inside this heap's arena
    pub fn contains(&self, value: usize) -> bool {
        self.arena.word_containing(value).is_some()
    }

    pub fn stats(&self) -> HeapStats {
        let total_words = self.arena.len();
        let allocated_words = self.allocated.total_words();

        HeapStats {
            word_size: WORD_SIZE,
            total_words,
            free_words: self.free.total_words(),
            allocated_words,
            free_chunks: self.free.len(),
            allocated_chunks: self.allocated.len(),
            largest_free_words: self.free.largest(),
            usage_percentage: (allocated_words as f64 / total_words as f64) * 100.0,
        }
    }

    /// Check that the free and allocated lists partition the arena
    pub fn verify(&self) -> HeapResult<()> {
        for list in [&self.free, &self.allocated] {
            if let Some(empty) = list.iter().find(|c| c.size == 0) {
                return Err(HeapError::Corruption(format!(
                    "{} list holds an empty chunk at word {}",
                    list.kind(),
                    empty.start
                )));
            }
            if let Some(pair) = list.as_slice().windows(2).find(|p| p[0].end() > p[1].start) {
                return Err(HeapError::Corruption(format!(
                    "{} list is unordered or overlapping at words {} and {}",
                    list.kind(),
                    pair[0].start,
                    pair[1].start
                )));
            }
        }

        let mut all: Vec<Chunk> = self.free.iter().chain(self.allocated.iter()).copied().collect();
        all.sort_unstable_by_key(|c| c.start);

        let mut cursor = 0;
        for chunk in &all {
            if chunk.start != cursor {
                let what = if chunk.start > cursor { "gap" } else { "overlap" };
                return Err(HeapError::Corruption(format!(
                    "{} at word {} (next chunk starts at {})",
                    what, cursor, chunk.start
                )));
            }
            cursor = chunk.end();
        }

        if cursor != self.arena.len() {
            return Err(HeapError::Corruption(format!(
                "chunks cover {} of {} words",
                cursor,
                self.arena.len()
            )));
        }

        Ok(())
    }

    /// Run one collection cycle (see `gc::Collector`)
    pub fn collect(&mut self, roots: &dyn RootProvider) -> HeapResult<GcStats> {
        let mut collector = std::mem::take(&mut self.collector);
        let result = collector.run(self, roots);
        self.collector = collector;
        result
    }
}

// Implement trait interfaces
impl Allocator for Heap {
    fn allocate(&mut self, size_bytes: Size) -> HeapResult<Option<Address>> {
        Heap::allocate(self, size_bytes)
    }

    fn free(&mut self, address: Address) -> HeapResult<()> {
        Heap::free(self, address)
    }

    fn is_valid(&self, address: Address) -> bool {
        Heap::is_valid(self, address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        Heap::block_size(self, address)
    }
}

impl GarbageCollector for Heap {
    fn collect(&mut self, roots: &dyn RootProvider) -> HeapResult<GcStats> {
        Heap::collect(self, roots)
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("base", &format_args!("0x{:x}", self.arena.base()))
            .field("words", &self.arena.len())
            .field("free", &self.free.as_slice())
            .field("allocated", &self.allocated.as_slice())
            .finish()
    }
}
