/*!
 * Heap Limits and Constants
 *
 * Centralized location for the heap's default sizes and thresholds.
 */

// =============================================================================
// ARENA LIMITS
// =============================================================================

/// Default arena size in bytes (64000 bytes, 8000 words on 64-bit targets)
pub const DEFAULT_HEAP_SIZE_BYTES: usize = 64_000;

/// Maximum number of chunks a single chunk list may hold
/// Fragmentation beyond this is reported as `HeapError::CapacityExceeded`
pub const DEFAULT_MAX_CHUNK_COUNT: usize = 1024;

/// Largest accepted arena, 1 GiB
pub const MAX_HEAP_SIZE_BYTES: usize = 1 << 30;

/// Largest accepted per-list chunk bound
/// Each list reserves this many entries up front
pub const MAX_CHUNK_COUNT: usize = 1 << 20;

// =============================================================================
// PRESSURE THRESHOLDS
// =============================================================================

/// Usage percentage at which pressure is reported as medium
pub const PRESSURE_MEDIUM_PERCENT: f64 = 60.0;

/// Usage percentage at which pressure is reported as high
pub const PRESSURE_HIGH_PERCENT: f64 = 80.0;

/// Usage percentage at which pressure is reported as critical
pub const PRESSURE_CRITICAL_PERCENT: f64 = 95.0;

// =============================================================================
// ENVIRONMENT OVERRIDES
// =============================================================================

/// Overrides `HeapConfig::heap_size_bytes`
pub const ENV_HEAP_BYTES: &str = "CHUNK_GC_HEAP_BYTES";

/// Overrides `HeapConfig::max_chunk_count`
pub const ENV_MAX_CHUNKS: &str = "CHUNK_GC_MAX_CHUNKS";

/// Set to `1`/`true` to select `FreePolicy::Strict`
pub const ENV_STRICT_FREE: &str = "CHUNK_GC_STRICT_FREE";

/// Set to `1`/`true` for JSON trace output
pub const ENV_TRACE_JSON: &str = "CHUNK_GC_TRACE_JSON";
