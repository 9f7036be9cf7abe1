/*!
 * Chunk List
 * Address-ordered, capacity-bounded list of chunks
 */

use super::types::{Chunk, HeapError, HeapResult, ListKind};
use crate::core::types::{Size, WordOffset};
use std::fmt;
use tracing::{debug, error};

/// Ordered chunk list
///
/// Chunks are unique by `start`, sorted ascending by `start`, and never
/// overlap. The list holds at most `capacity` chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkList {
    kind: ListKind,
    chunks: Vec<Chunk>,
    capacity: usize,
}

impl ChunkList {
    pub fn new(kind: ListKind, capacity: usize) -> Self {
        Self {
            kind,
            chunks: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// List holding a single chunk, used to bootstrap a heap's free list
    pub(crate) fn seeded(kind: ListKind, capacity: usize, chunk: Chunk) -> Self {
        let mut list = Self::new(kind, capacity);
        list.chunks.push(chunk);
        list
    }

    /// Insert keeping address order
    ///
    /// The new chunk is appended and shifted toward the head until ordered,
    /// so the cost is proportional to how far it moves.
    pub fn insert(&mut self, chunk: Chunk) -> HeapResult<()> {
        if self.is_full() {
            error!(
                list = %self.kind,
                capacity = self.capacity,
                start = chunk.start,
                size = chunk.size,
                "Chunk list capacity exceeded"
            );
            return Err(HeapError::CapacityExceeded {
                list: self.kind,
                capacity: self.capacity,
            });
        }

        self.chunks.push(chunk);
        let mut i = self.chunks.len() - 1;
        while i > 0 && self.chunks[i].start < self.chunks[i - 1].start {
            self.chunks.swap(i, i - 1);
            i -= 1;
        }
        debug_assert!(i == 0 || self.chunks[i - 1].start != chunk.start);

        Ok(())
    }

    /// Remove by index, preserving the order of the rest
    pub fn remove_at(&mut self, index: usize) -> HeapResult<Chunk> {
        if index >= self.chunks.len() {
            return Err(HeapError::IndexOutOfBounds {
                index,
                len: self.chunks.len(),
            });
        }
        Ok(self.chunks.remove(index))
    }

    /// Index of the chunk starting exactly at `start`
    pub fn find_by_start(&self, start: WordOffset) -> Option<usize> {
        self.chunks.iter().position(|c| c.start == start)
    }

    /// Remove the chunk starting exactly at `start`
    pub fn remove(&mut self, start: WordOffset) -> Option<Chunk> {
        let index = self.find_by_start(start)?;
        Some(self.chunks.remove(index))
    }

    /// Index of the chunk whose range holds `word`
    pub fn find_containing(&self, word: WordOffset) -> Option<usize> {
        let upper = self.chunks.partition_point(|c| c.start <= word);
        let index = upper.checked_sub(1)?;
        self.chunks[index].contains(word).then_some(index)
    }

    /// Insert, absorbing `chunk` into any free neighbor it touches
    ///
    /// Only needs a free slot when neither neighbor is address-adjacent.
    pub fn insert_merging(&mut self, chunk: Chunk) -> HeapResult<()> {
        let index = self.chunks.partition_point(|c| c.start < chunk.start);
        let joins_prev = index > 0 && self.chunks[index - 1].precedes(&chunk);
        let joins_next = index < self.chunks.len() && chunk.precedes(&self.chunks[index]);

        match (joins_prev, joins_next) {
            (true, true) => {
                let next = self.chunks.remove(index);
                self.chunks[index - 1].size += chunk.size + next.size;
            }
            (true, false) => self.chunks[index - 1].size += chunk.size,
            (false, true) => {
                let next = &mut self.chunks[index];
                next.start = chunk.start;
                next.size += chunk.size;
            }
            (false, false) => return self.insert(chunk),
        }

        Ok(())
    }

    /// Coalesced copy: address-adjacent neighbors become one chunk
    pub fn merged(&self) -> ChunkList {
        let mut copy = self.clone();
        copy.merge_adjacent();
        copy
    }

    /// Coalesce in place in a single pass, returning the number of merges
    pub fn merge_adjacent(&mut self) -> usize {
        let before = self.chunks.len();
        if before < 2 {
            return 0;
        }

        let mut tail = 0;
        for i in 1..before {
            let chunk = self.chunks[i];
            if self.chunks[tail].precedes(&chunk) {
                self.chunks[tail].size += chunk.size;
            } else {
                tail += 1;
                self.chunks[tail] = chunk;
            }
        }
        self.chunks.truncate(tail + 1);

        let merges = before - self.chunks.len();
        if merges > 0 {
            debug!(
                list = %self.kind,
                merges,
                before,
                after = self.chunks.len(),
                "Coalesced adjacent chunks"
            );
        }

        merges
    }

    #[inline]
    pub fn as_slice(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Chunk> {
        self.chunks.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.chunks.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn kind(&self) -> ListKind {
        self.kind
    }

    /// Sum of chunk sizes in words
    pub fn total_words(&self) -> Size {
        self.chunks.iter().map(|c| c.size).sum()
    }

    /// Size of the largest chunk in words
    pub fn largest(&self) -> Size {
        self.chunks.iter().map(|c| c.size).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a ChunkList {
    type Item = &'a Chunk;
    type IntoIter = std::slice::Iter<'a, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.iter()
    }
}

impl fmt::Display for ChunkList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chunks ({}):", self.chunks.len())?;
        for chunk in &self.chunks {
            writeln!(f, "start: {}, size: {}", chunk.start, chunk.size)?;
        }
        Ok(())
    }
}
