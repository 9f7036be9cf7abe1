/*!
 * Chunk GC Library
 * Fixed-arena first-fit allocator with a conservative mark-sweep collector
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports for convenience
pub use crate::core::config::{FreePolicy, HeapConfig};
pub use crate::core::types::{Address, Size, WORD_SIZE};
pub use memory::{
    Allocator, Chunk, ChunkList, GarbageCollector, GcStats, Heap, HeapError, HeapResult,
    HeapStats, MemoryPressure, NoRoots, RootProvider, StackRoots,
};
pub use monitoring::init_tracing;
