/*!
 * Heap Allocator Implementation
 * Allocation, deallocation and word access
 */

use super::super::types::{Chunk, HeapError, HeapResult};
use super::Heap;
use crate::core::config::FreePolicy;
use crate::core::types::{words_for, Address, Size, WORD_SIZE};
use tracing::{debug, warn};

impl Heap {
    /// Allocate at least `size_bytes` bytes, first-fit
    ///
    /// Returns `Ok(None)` when no free chunk is large enough. A zero-byte
    /// request reserves one word so every allocation has its own address.
    /// The returned words are zeroed.
    pub fn allocate(&mut self, size_bytes: Size) -> HeapResult<Option<Address>> {
        let words = words_for(size_bytes).max(1);

        // Coalesce first so previously freed neighbors can satisfy the request
        self.free.merge_adjacent();

        let Some(index) = self.free.iter().position(|c| c.size >= words) else {
            warn!(
                requested_bytes = size_bytes,
                requested_words = words,
                free_words = self.free.total_words(),
                largest_free_words = self.free.largest(),
                "Heap exhausted: no free chunk large enough"
            );
            return Ok(None);
        };

        let found = self.free.as_slice()[index];

        // Allocated list first: if it is full nothing has been mutated yet
        self.allocated.insert(Chunk::new(found.start, words))?;
        self.free.remove_at(index)?;

        let remainder = found.size - words;
        if remainder > 0 {
            self.free.insert(Chunk::new(found.start + words, remainder))?;
        }

        self.arena.words_mut(found.start, words).fill(0);
        let address = self.arena.address_of(found.start);

        debug!(
            %address,
            requested_bytes = size_bytes,
            words,
            split_remainder = remainder,
            "Allocated chunk"
        );

        Ok(Some(address))
    }

    /// Return an allocation to the free list
    ///
    /// Null is a no-op. Addresses that do not start an allocated chunk are
    /// ignored or rejected according to `FreePolicy`. No coalescing happens
    /// here; it is deferred to the next allocation or `coalesce`.
    pub fn free(&mut self, address: Address) -> HeapResult<()> {
        if address.is_null() {
            return Ok(());
        }

        let Some(index) = self.allocated_index(address) else {
            return self.reject_free(address);
        };

        let chunk = self.allocated.as_slice()[index];
        self.free.insert(chunk)?;
        self.allocated.remove_at(index)?;

        debug!(%address, words = chunk.size, "Freed chunk");
        Ok(())
    }

    /// Free a live allocation by absorbing it into adjacent free chunks
    ///
    /// Used by the sweep once the free list is full: a chunk that touches a
    /// free neighbor is released without taking another free-list slot.
    pub(crate) fn free_merging(&mut self, address: Address) -> HeapResult<()> {
        let Some(index) = self.allocated_index(address) else {
            return self.reject_free(address);
        };

        let chunk = self.allocated.as_slice()[index];
        self.free.insert_merging(chunk)?;
        self.allocated.remove_at(index)?;

        debug!(%address, words = chunk.size, "Freed chunk into free neighbors");
        Ok(())
    }

    /// Coalesce the free list, returning the number of merges
    pub fn coalesce(&mut self) -> usize {
        self.free.merge_adjacent()
    }

    /// Check if an address starts a live allocation
    pub fn is_valid(&self, address: Address) -> bool {
        self.allocated_index(address).is_some()
    }

    /// Size in bytes of a live allocation
    pub fn block_size(&self, address: Address) -> Option<Size> {
        self.allocated_index(address)
            .map(|index| self.allocated.as_slice()[index].size * WORD_SIZE)
    }

    /// Read word `index` of the allocation at `address`
    pub fn load(&self, address: Address, index: usize) -> HeapResult<usize> {
        Ok(self.words(address)?[self.check_word(address, index)?])
    }

    /// Write word `index` of the allocation at `address`
    ///
    /// Storing another allocation's address here keeps it reachable for as
    /// long as this allocation is.
    pub fn store(&mut self, address: Address, index: usize, value: impl Into<usize>) -> HeapResult<()> {
        let index = self.check_word(address, index)?;
        self.words_mut(address)?[index] = value.into();
        Ok(())
    }

    /// Words of the allocation at `address`
    pub fn words(&self, address: Address) -> HeapResult<&[usize]> {
        let chunk = self.allocated_chunk(address)?;
        Ok(self.arena.words(chunk.start, chunk.size))
    }

    pub fn words_mut(&mut self, address: Address) -> HeapResult<&mut [usize]> {
        let chunk = self.allocated_chunk(address)?;
        Ok(self.arena.words_mut(chunk.start, chunk.size))
    }

    fn allocated_index(&self, address: Address) -> Option<usize> {
        let offset = self.arena.offset_of(address)?;
        self.allocated.find_by_start(offset)
    }

    fn allocated_chunk(&self, address: Address) -> HeapResult<Chunk> {
        self.allocated_index(address)
            .map(|index| self.allocated.as_slice()[index])
            .ok_or(HeapError::InvalidAddress(address))
    }

    fn check_word(&self, address: Address, index: usize) -> HeapResult<usize> {
        let words = self.allocated_chunk(address)?.size;
        if index >= words {
            return Err(HeapError::WordOutOfBounds {
                address,
                index,
                words,
            });
        }
        Ok(index)
    }

    fn reject_free(&self, address: Address) -> HeapResult<()> {
        warn!(
            %address,
            policy = ?self.config.free_policy,
            "Attempted to free an unknown or already freed address"
        );
        match self.config.free_policy {
            FreePolicy::Ignore => Ok(()),
            FreePolicy::Strict => Err(HeapError::InvalidFree(address)),
        }
    }
}
