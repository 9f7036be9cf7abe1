/*!
 * Allocator Tests
 * First-fit placement, splitting, coalescing and free semantics
 */

use chunk_gc::{Address, Allocator, Chunk, Heap, HeapConfig, MemoryPressure, WORD_SIZE};
use pretty_assertions::assert_eq;

fn heap_of(words: usize) -> Heap {
    Heap::with_config(HeapConfig::new().with_heap_words(words)).expect("valid config")
}

/// Allocate `sizes` (in words) back to back, each followed by a one-word spacer,
/// then free everything but the spacers so the free chunks never touch.
fn free_layout(sizes: &[usize]) -> (Heap, Vec<Address>) {
    let total: usize = sizes.iter().map(|s| s + 1).sum();
    let mut heap = heap_of(total);

    let mut holes = Vec::new();
    for &words in sizes {
        holes.push(heap.allocate(words * WORD_SIZE).unwrap().expect("hole"));
        heap.allocate(WORD_SIZE).unwrap().expect("spacer");
    }
    assert!(heap.free_list().is_empty());

    for &hole in &holes {
        heap.free(hole).unwrap();
    }
    (heap, holes)
}

fn layout(heap: &Heap) -> Vec<(usize, usize)> {
    heap.free_list().iter().map(|c| (c.start, c.size)).collect()
}

#[test]
fn test_first_fit_skips_chunks_too_small() {
    let (mut heap, holes) = free_layout(&[3, 7, 10]);
    assert_eq!(layout(&heap), vec![(0, 3), (4, 7), (12, 10)]);

    let address = heap.allocate(5 * WORD_SIZE).unwrap().unwrap();

    assert_eq!(address, holes[1]);
    assert_eq!(layout(&heap), vec![(0, 3), (9, 2), (12, 10)]);
    assert!(heap.verify().is_ok());
}

#[test]
fn test_first_fit_takes_lowest_address_not_best_fit() {
    let (mut heap, holes) = free_layout(&[10, 3, 7]);

    let address = heap.allocate(5 * WORD_SIZE).unwrap().unwrap();

    assert_eq!(address, holes[0]);
    assert_eq!(layout(&heap), vec![(5, 5), (11, 3), (15, 7)]);
}

#[test]
fn test_coalescing_adjacent_frees() {
    let mut heap = heap_of(4);
    let a = heap.allocate(2 * WORD_SIZE).unwrap().unwrap();
    let b = heap.allocate(2 * WORD_SIZE).unwrap().unwrap();

    heap.free(a).unwrap();
    heap.free(b).unwrap();
    assert_eq!(heap.free_list().len(), 2);

    assert_eq!(heap.coalesce(), 1);
    assert_eq!(heap.free_list().as_slice(), &[Chunk::new(0, 4)]);
}

#[test]
fn test_allocation_coalesces_before_searching() {
    let mut heap = heap_of(4);
    let a = heap.allocate(2 * WORD_SIZE).unwrap().unwrap();
    let b = heap.allocate(2 * WORD_SIZE).unwrap().unwrap();
    heap.free(a).unwrap();
    heap.free(b).unwrap();

    // Neither freed chunk alone fits four words
    let whole = heap.allocate(4 * WORD_SIZE).unwrap();
    assert_eq!(whole, Some(a));
}

#[test]
fn test_free_is_idempotent() {
    let mut heap = heap_of(8);
    let a = heap.allocate(WORD_SIZE).unwrap().unwrap();

    heap.free(a).unwrap();
    let free_before = heap.free_list().clone();
    let allocated_before = heap.allocated_list().clone();

    heap.free(a).unwrap();
    assert_eq!(heap.free_list(), &free_before);
    assert_eq!(heap.allocated_list(), &allocated_before);
}

#[test]
fn test_null_free_is_a_no_op() {
    let mut heap = heap_of(8);
    heap.allocate(WORD_SIZE).unwrap().unwrap();
    let free_before = heap.free_list().clone();

    heap.free(Address::NULL).unwrap();
    assert_eq!(heap.free_list(), &free_before);
    assert_eq!(heap.allocated_list().len(), 1);
}

#[test]
fn test_full_arena_returns_none() {
    let mut heap = heap_of(6);
    for _ in 0..3 {
        heap.allocate(2 * WORD_SIZE).unwrap().unwrap();
    }

    assert_eq!(heap.allocate(1).unwrap(), None);
    assert_eq!(heap.stats().memory_pressure(), MemoryPressure::Critical);
    assert!(heap.verify().is_ok());
}

#[test]
fn test_oversized_request_returns_none() {
    let mut heap = heap_of(6);
    assert_eq!(heap.allocate(7 * WORD_SIZE).unwrap(), None);
    assert_eq!(heap.free_list().as_slice(), &[Chunk::new(0, 6)]);
}

#[test]
fn test_default_heap_holds_twenty_i32_chunks() {
    let mut heap = Heap::new();
    let addresses: Vec<Address> = (0..20)
        .map(|_| heap.allocate(std::mem::size_of::<i32>()).unwrap().unwrap())
        .collect();

    assert_eq!(heap.allocated_list().len(), 20);
    assert_eq!(heap.free_list().len(), 1);

    for address in addresses {
        heap.free(address).unwrap();
    }
    assert_eq!(heap.free_list().len(), 21);
    heap.coalesce();
    assert_eq!(heap.free_list().as_slice(), &[Chunk::new(0, heap.capacity_words())]);
}

fn fill<A: Allocator>(allocator: &mut A, bytes: usize) -> Vec<Address> {
    let mut out = Vec::new();
    while let Ok(Some(address)) = allocator.allocate(bytes) {
        out.push(address);
    }
    out
}

#[test]
fn test_generic_allocator_callers() {
    let mut heap = heap_of(8);
    let addresses = fill(&mut heap, 2 * WORD_SIZE);

    assert_eq!(addresses.len(), 4);
    for &address in &addresses {
        assert!(Allocator::is_valid(&heap, address));
        assert_eq!(Allocator::block_size(&heap, address), Some(2 * WORD_SIZE));
    }
    Allocator::free(&mut heap, addresses[0]).unwrap();
    assert!(!Allocator::is_valid(&heap, addresses[0]));
}

#[test]
fn test_stats_serialize() {
    let mut heap = heap_of(10);
    heap.allocate(3 * WORD_SIZE).unwrap().unwrap();

    let json = serde_json::to_value(heap.stats()).unwrap();
    assert_eq!(json["allocated_words"], 3);
    assert_eq!(json["free_words"], 7);
    assert_eq!(json["allocated_chunks"], 1);
}
