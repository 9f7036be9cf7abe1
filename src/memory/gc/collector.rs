/*!
 * Conservative Mark-Sweep Collector
 *
 * Every root word and every word of a reachable allocation is treated as a
 * possible pointer. A value anywhere inside an allocated chunk's byte range
 * keeps that chunk alive. Dead chunks may be retained by coincidental values;
 * live chunks are never released.
 */

use super::super::manager::Heap;
use super::super::traits::RootProvider;
use super::super::types::HeapResult;
use crate::core::types::{Address, Size, WORD_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

/// Collection cycle statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GcStats {
    /// Sequence number of the cycle on its heap, starting at 1
    pub cycle: u64,
    pub roots_scanned: usize,
    /// Words read from reachable allocations
    pub words_scanned: usize,
    pub marked_chunks: usize,
    pub freed_chunks: usize,
    pub freed_bytes: Size,
    pub duration_us: u64,
}

impl GcStats {
    /// Check if any memory was freed
    pub fn freed_any(&self) -> bool {
        self.freed_chunks > 0
    }
}

/// Mark-sweep state kept between cycles to reuse its buffers
///
/// `marks` is index-aligned with the heap's allocated list and rebuilt at the
/// start of every cycle. `pending` holds the sweep's victims so the allocated
/// list is not mutated while the flags are walked.
#[derive(Debug, Default)]
pub struct Collector {
    marks: Vec<bool>,
    worklist: Vec<usize>,
    pending: Vec<Address>,
    cycles: u64,
}

impl Collector {
    /// Run one complete cycle: mark from `roots`, then sweep through `Heap::free`
    #[instrument(level = "debug", skip_all, fields(cycle = self.cycles + 1))]
    pub fn run(&mut self, heap: &mut Heap, roots: &dyn RootProvider) -> HeapResult<GcStats> {
        let start = Instant::now();
        self.cycles += 1;

        let mut stats = GcStats {
            cycle: self.cycles,
            ..GcStats::default()
        };

        self.mark(heap, roots, &mut stats);
        self.sweep(heap, &mut stats)?;

        stats.duration_us = start.elapsed().as_micros() as u64;
        info!(
            cycle = stats.cycle,
            roots = stats.roots_scanned,
            words_scanned = stats.words_scanned,
            marked = stats.marked_chunks,
            freed_chunks = stats.freed_chunks,
            freed_bytes = stats.freed_bytes,
            duration_us = stats.duration_us,
            "Collection cycle complete"
        );

        Ok(stats)
    }

    fn mark(&mut self, heap: &Heap, roots: &dyn RootProvider, stats: &mut GcStats) {
        self.marks.clear();
        self.marks.resize(heap.allocated_list().len(), false);
        self.worklist.clear();

        roots.scan(&mut |value| {
            stats.roots_scanned += 1;
            self.mark_value(heap, value);
        });

        // Each chunk is marked before it is queued, so none is scanned twice
        while let Some(index) = self.worklist.pop() {
            let chunk = heap.allocated_list().as_slice()[index];
            for &value in heap.arena().words(chunk.start, chunk.size) {
                stats.words_scanned += 1;
                self.mark_value(heap, value);
            }
        }

        stats.marked_chunks = self.marks.iter().filter(|&&marked| marked).count();
    }

    fn mark_value(&mut self, heap: &Heap, value: usize) {
        let Some(word) = heap.arena().word_containing(value) else {
            return;
        };
        let Some(index) = heap.allocated_list().find_containing(word) else {
            return;
        };
        if !self.marks[index] {
            trace!(value = format_args!("0x{:x}", value), index, "Marked chunk");
            self.marks[index] = true;
            self.worklist.push(index);
        }
    }

    fn sweep(&mut self, heap: &mut Heap, stats: &mut GcStats) -> HeapResult<()> {
        self.pending.clear();
        for (chunk, &marked) in heap.allocated_list().iter().zip(&self.marks) {
            if !marked {
                self.pending.push(heap.address_of(chunk));
            }
        }

        for &address in &self.pending {
            let bytes = heap.block_size(address).unwrap_or(0);
            if heap.free_list().is_full() {
                // Releasing into free neighbors needs no new slot
                let merges = heap.coalesce();
                debug!(merges, "Free list full during sweep, releasing into neighbors");
                heap.free_merging(address)?;
            } else {
                heap.free(address)?;
            }
            stats.freed_chunks += 1;
            stats.freed_bytes += bytes;
        }

        debug_assert_eq!(stats.freed_bytes % WORD_SIZE, 0);
        Ok(())
    }
}
