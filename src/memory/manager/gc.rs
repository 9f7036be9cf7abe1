/*!
 * Heap Collection Integration
 * Allocation with a collection cycle on exhaustion
 */

use super::super::traits::RootProvider;
use super::super::types::{HeapError, HeapResult, ListKind};
use super::Heap;
use crate::core::types::{Address, Size};
use tracing::{debug, info};

impl Heap {
    /// Allocate, running one collection cycle and retrying if the heap is full
    ///
    /// A full allocated list is treated like a full arena. Returns `Ok(None)`
    /// when the retry still finds no free chunk large enough.
    pub fn allocate_or_collect(
        &mut self,
        size_bytes: Size,
        roots: &dyn RootProvider,
    ) -> HeapResult<Option<Address>> {
        match self.allocate(size_bytes) {
            Ok(Some(address)) => return Ok(Some(address)),
            // Out of words or out of allocated-list slots: both are curable by a sweep
            Ok(None)
            | Err(HeapError::CapacityExceeded {
                list: ListKind::Allocated,
                ..
            }) => {}
            Err(e) => return Err(e),
        }

        info!(requested_bytes = size_bytes, "Heap exhausted, collecting before retry");
        let stats = self.collect(roots)?;
        debug!(freed_chunks = stats.freed_chunks, "Retrying allocation after collection");

        // Nothing freed reproduces the first outcome, including a capacity error
        self.allocate(size_bytes)
    }
}
