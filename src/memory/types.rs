/*!
 * Memory Types
 * Common types for chunk lists, the allocator and the collector
 */

use crate::core::limits::{
    PRESSURE_CRITICAL_PERCENT, PRESSURE_HIGH_PERCENT, PRESSURE_MEDIUM_PERCENT,
};
use crate::core::types::{Address, Size, WordOffset};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Heap operation result
pub type HeapResult<T> = Result<T, HeapError>;

/// Which of the heap's two chunk lists an error or report refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Free,
    Allocated,
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ListKind::Free => write!(f, "free"),
            ListKind::Allocated => write!(f, "allocated"),
        }
    }
}

/// Heap errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum HeapError {
    #[error("Chunk list '{list}' is full ({capacity} chunks)")]
    #[diagnostic(
        code(heap::capacity_exceeded),
        help("Fragmentation exceeded the list bound. Free memory, coalesce, or raise max_chunk_count.")
    )]
    CapacityExceeded { list: ListKind, capacity: usize },

    #[error("Chunk index {index} out of bounds for list of length {len}")]
    #[diagnostic(
        code(heap::index_out_of_bounds),
        help("This indicates an internal consistency bug in the chunk lists.")
    )]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid free of address {0}: not the start of an allocated chunk")]
    #[diagnostic(
        code(heap::invalid_free),
        help("The address was already freed, never allocated, or points inside a chunk.")
    )]
    InvalidFree(Address),

    #[error("Invalid heap address: {0}")]
    #[diagnostic(code(heap::invalid_address))]
    InvalidAddress(Address),

    #[error("Word index {index} out of bounds for chunk at {address} ({words} words)")]
    #[diagnostic(code(heap::word_out_of_bounds))]
    WordOutOfBounds {
        address: Address,
        index: usize,
        words: Size,
    },

    #[error("Heap corruption detected: {0}")]
    #[diagnostic(
        code(heap::corruption),
        help("Free and allocated chunks no longer partition the arena.")
    )]
    Corruption(String),

    #[error("Invalid heap configuration: {0}")]
    #[diagnostic(code(heap::invalid_config))]
    InvalidConfig(String),
}

/// Contiguous run of arena words tracked by a chunk list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Word offset of the first word
    pub start: WordOffset,
    /// Length in words
    pub size: Size,
}

impl Chunk {
    pub const fn new(start: WordOffset, size: Size) -> Self {
        Self { start, size }
    }

    /// One past the last word
    #[inline]
    pub const fn end(&self) -> WordOffset {
        self.start + self.size
    }

    #[inline]
    pub const fn contains(&self, word: WordOffset) -> bool {
        word >= self.start && word < self.end()
    }

    /// True when `next` begins exactly where this chunk ends
    #[inline]
    pub const fn precedes(&self, next: &Chunk) -> bool {
        self.end() == next.start
    }
}

/// Heap statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeapStats {
    pub word_size: Size,
    pub total_words: Size,
    pub free_words: Size,
    pub allocated_words: Size,
    pub free_chunks: usize,
    pub allocated_chunks: usize,
    pub largest_free_words: Size,
    pub usage_percentage: f64,
}

impl HeapStats {
    pub fn memory_pressure(&self) -> MemoryPressure {
        if self.usage_percentage >= PRESSURE_CRITICAL_PERCENT {
            MemoryPressure::Critical
        } else if self.usage_percentage >= PRESSURE_HIGH_PERCENT {
            MemoryPressure::High
        } else if self.usage_percentage >= PRESSURE_MEDIUM_PERCENT {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }

    /// Free words outside the largest free chunk
    pub fn fragmented_words(&self) -> Size {
        self.free_words - self.largest_free_words
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
