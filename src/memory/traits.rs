/*!
 * Memory Traits
 * Allocation, collection and root-scanning abstractions
 */

use super::gc::GcStats;
use super::types::*;
use crate::core::types::{Address, Size};

/// Memory allocator interface
pub trait Allocator {
    /// Allocate at least `size_bytes` bytes; `Ok(None)` when nothing fits
    fn allocate(&mut self, size_bytes: Size) -> HeapResult<Option<Address>>;

    /// Return an allocation to the allocator
    fn free(&mut self, address: Address) -> HeapResult<()>;

    /// Check if an address is the start of a live allocation
    fn is_valid(&self, address: Address) -> bool;

    /// Get the size in bytes of a live allocation
    fn block_size(&self, address: Address) -> Option<Size>;
}

/// Garbage collection interface
pub trait GarbageCollector {
    /// Run one full mark-and-sweep cycle from the given roots
    fn collect(&mut self, roots: &dyn RootProvider) -> HeapResult<GcStats>;
}

/// Source of candidate root words for a collection cycle
///
/// Every word visited is treated as a possible pointer.
pub trait RootProvider {
    fn scan(&self, visit: &mut dyn FnMut(usize));
}
