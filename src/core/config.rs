/*!
 * Heap Configuration
 *
 * Arena size, chunk-list capacity and free policy for a heap instance.
 */

use super::limits::{
    DEFAULT_HEAP_SIZE_BYTES, DEFAULT_MAX_CHUNK_COUNT, ENV_HEAP_BYTES, ENV_MAX_CHUNKS,
    ENV_STRICT_FREE, MAX_CHUNK_COUNT, MAX_HEAP_SIZE_BYTES,
};
use super::types::{Size, WORD_SIZE};
use crate::memory::{HeapError, HeapResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What `free` does with a non-null address it does not recognize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreePolicy {
    /// Unknown and already-freed addresses are a logged no-op
    #[default]
    Ignore,
    /// Unknown and already-freed addresses return `HeapError::InvalidFree`
    Strict,
}

/// Heap configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Arena size in bytes, truncated to whole words
    pub heap_size_bytes: Size,

    /// Maximum chunks per list (free and allocated each)
    pub max_chunk_count: usize,

    /// Handling of unknown addresses passed to `free`
    pub free_policy: FreePolicy,
}

impl HeapConfig {
    pub fn new() -> Self {
        Self {
            heap_size_bytes: DEFAULT_HEAP_SIZE_BYTES,
            max_chunk_count: DEFAULT_MAX_CHUNK_COUNT,
            free_policy: FreePolicy::Ignore,
        }
    }

    /// Defaults overridden by `CHUNK_GC_*` environment variables
    ///
    /// Unparsable values are logged and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(bytes) = env_usize(ENV_HEAP_BYTES) {
            config.heap_size_bytes = bytes;
        }
        if let Some(chunks) = env_usize(ENV_MAX_CHUNKS) {
            config.max_chunk_count = chunks;
        }
        if let Ok(strict) = std::env::var(ENV_STRICT_FREE) {
            if strict == "1" || strict.eq_ignore_ascii_case("true") {
                config.free_policy = FreePolicy::Strict;
            }
        }

        config
    }

    pub fn with_heap_size(mut self, bytes: Size) -> Self {
        self.heap_size_bytes = bytes;
        self
    }

    /// Convenience for sizing the arena in words
    pub fn with_heap_words(self, words: Size) -> Self {
        self.with_heap_size(words.saturating_mul(WORD_SIZE))
    }

    pub fn with_max_chunks(mut self, count: usize) -> Self {
        self.max_chunk_count = count;
        self
    }

    pub fn with_free_policy(mut self, policy: FreePolicy) -> Self {
        self.free_policy = policy;
        self
    }

    /// Arena length in words
    pub fn heap_words(&self) -> Size {
        self.heap_size_bytes / WORD_SIZE
    }

    pub fn validate(&self) -> HeapResult<()> {
        if self.heap_words() == 0 {
            return Err(HeapError::InvalidConfig(format!(
                "heap size {} bytes is smaller than one {}-byte word",
                self.heap_size_bytes, WORD_SIZE
            )));
        }
        if self.heap_size_bytes > MAX_HEAP_SIZE_BYTES {
            return Err(HeapError::InvalidConfig(format!(
                "heap size {} bytes exceeds the {} byte limit",
                self.heap_size_bytes, MAX_HEAP_SIZE_BYTES
            )));
        }
        if self.max_chunk_count == 0 {
            return Err(HeapError::InvalidConfig(
                "max_chunk_count must be at least 1".to_string(),
            ));
        }
        if self.max_chunk_count > MAX_CHUNK_COUNT {
            return Err(HeapError::InvalidConfig(format!(
                "max_chunk_count {} exceeds the limit of {}",
                self.max_chunk_count, MAX_CHUNK_COUNT
            )));
        }
        Ok(())
    }
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring unparsable environment override");
            None
        }
    }
}
