/*!
 * Collector Tests
 * Reachability, reclamation and stack root scanning
 */

use chunk_gc::{
    Address, GarbageCollector, Heap, HeapConfig, NoRoots, RootProvider, StackRoots, WORD_SIZE,
};
use pretty_assertions::assert_eq;
use std::hint::black_box;

fn heap_of(words: usize) -> Heap {
    Heap::with_config(HeapConfig::new().with_heap_words(words)).expect("valid config")
}

/// Allocate `len` two-word nodes where word 0 of node i holds node i + 1
fn build_chain(heap: &mut Heap, len: usize) -> Vec<Address> {
    let nodes: Vec<Address> = (0..len)
        .map(|_| heap.allocate(2 * WORD_SIZE).unwrap().expect("node"))
        .collect();
    for pair in nodes.windows(2) {
        heap.store(pair[0], 0, pair[1]).unwrap();
    }
    nodes
}

#[test]
fn test_chain_reachable_from_head_survives() {
    let mut heap = heap_of(64);
    let nodes = build_chain(&mut heap, 10);

    let stats = heap.collect(&[nodes[0].as_usize()]).unwrap();

    assert_eq!(stats.marked_chunks, 10);
    assert_eq!(stats.freed_chunks, 0);
    for &node in &nodes {
        assert!(heap.is_valid(node));
    }
    assert!(heap.verify().is_ok());
}

#[test]
fn test_chain_tail_is_freed_when_link_is_cut() {
    let mut heap = heap_of(64);
    let nodes = build_chain(&mut heap, 6);
    heap.store(nodes[2], 0, Address::NULL).unwrap();

    let stats = heap.collect(&[nodes[0].as_usize()]).unwrap();

    assert_eq!(stats.freed_chunks, 3);
    assert_eq!(stats.freed_bytes, 3 * 2 * WORD_SIZE);
    assert!(nodes[..3].iter().all(|&n| heap.is_valid(n)));
    assert!(nodes[3..].iter().all(|&n| !heap.is_valid(n)));
}

#[test]
fn test_unreachable_chunk_is_reclaimed_and_reused() {
    let mut heap = heap_of(4);
    let a = heap.allocate(4 * WORD_SIZE).unwrap().unwrap();
    assert_eq!(heap.allocate(WORD_SIZE).unwrap(), None);

    let stats = heap.collect(&NoRoots).unwrap();
    assert_eq!(stats.freed_chunks, 1);
    assert!(!heap.is_valid(a));

    let b = heap.allocate(4 * WORD_SIZE).unwrap();
    assert_eq!(b, Some(a));
}

#[test]
fn test_collect_matches_explicit_frees() {
    let mut collected = heap_of(32);
    let mut freed = heap_of(32);

    let mut live = Vec::new();
    for i in 0..8 {
        let a = collected.allocate((i % 3 + 1) * WORD_SIZE).unwrap().unwrap();
        let b = freed.allocate((i % 3 + 1) * WORD_SIZE).unwrap().unwrap();
        live.push((i, a, b));
    }

    let roots: Vec<usize> = live
        .iter()
        .filter(|(i, _, _)| i % 2 == 0)
        .map(|(_, a, _)| a.as_usize())
        .collect();
    collected.collect(&roots).unwrap();

    for &(i, _, b) in &live {
        if i % 2 == 1 {
            freed.free(b).unwrap();
        }
    }

    assert_eq!(collected.free_list().as_slice(), freed.free_list().as_slice());
    assert_eq!(
        collected.allocated_list().as_slice(),
        freed.allocated_list().as_slice()
    );
}

#[test]
fn test_custom_root_provider() {
    struct Registers([usize; 2]);

    impl RootProvider for Registers {
        fn scan(&self, visit: &mut dyn FnMut(usize)) {
            self.0.iter().copied().for_each(visit);
        }
    }

    let mut heap = heap_of(8);
    let a = heap.allocate(WORD_SIZE).unwrap().unwrap();
    let b = heap.allocate(WORD_SIZE).unwrap().unwrap();

    let stats = GarbageCollector::collect(&mut heap, &Registers([0, b.as_usize()])).unwrap();
    assert_eq!(stats.roots_scanned, 2);
    assert!(!heap.is_valid(a));
    assert!(heap.is_valid(b));
}

#[test]
fn test_allocate_or_collect_recovers_space() {
    let mut heap = heap_of(8);
    let kept = heap.allocate(4 * WORD_SIZE).unwrap().unwrap();
    heap.allocate(4 * WORD_SIZE).unwrap().unwrap();

    let roots = [kept.as_usize()];
    let fresh = heap.allocate_or_collect(3 * WORD_SIZE, &roots).unwrap();

    assert!(fresh.is_some());
    assert!(heap.is_valid(kept));
}

#[test]
fn test_stack_roots_retain_live_frame_values() {
    let anchor = 0usize;
    let roots = StackRoots::from_anchor(&anchor);
    let mut heap = heap_of(16);

    assert!(allocate_and_collect_with_local(&mut heap, &roots));
    black_box(&anchor);
}

#[inline(never)]
fn allocate_and_collect_with_local(heap: &mut Heap, roots: &StackRoots) -> bool {
    let held = heap.allocate(2 * WORD_SIZE).unwrap().unwrap();
    let held = black_box(held);
    black_box(&held);

    heap.collect(roots).unwrap();

    let alive = heap.is_valid(held);
    black_box(&held);
    alive
}

#[test]
fn test_sweep_finishes_when_free_list_fills() {
    let mut heap = Heap::new();
    let capacity = heap.config().max_chunk_count;
    for _ in 0..capacity {
        heap.allocate(WORD_SIZE).unwrap().unwrap();
    }
    assert!(heap.allocated_list().is_full());

    let stats = heap.collect(&NoRoots).unwrap();

    assert_eq!(stats.freed_chunks, capacity);
    assert!(heap.allocated_list().is_empty());
    assert_eq!(heap.free_list().len(), 1);
    assert!(heap.verify().is_ok());
}

#[test]
fn test_sweep_finishes_when_earlier_frees_filled_free_list() {
    let config = HeapConfig::new().with_heap_words(16).with_max_chunks(3);
    let mut heap = Heap::with_config(config).unwrap();
    let a = heap.allocate(WORD_SIZE).unwrap().unwrap();
    let b = heap.allocate(WORD_SIZE).unwrap().unwrap();
    let c = heap.allocate(WORD_SIZE).unwrap().unwrap();

    // Frees never coalesce, so the free list is full before the cycle starts
    heap.free(b).unwrap();
    heap.free(c).unwrap();
    assert!(heap.free_list().is_full());

    let stats = heap.collect(&NoRoots).unwrap();

    assert_eq!(stats.freed_chunks, 1);
    assert!(!heap.is_valid(a));
    assert_eq!(heap.free_list().len(), 1);
    assert!(heap.verify().is_ok());
}

#[test]
fn test_allocate_or_collect_recovers_allocated_slots() {
    let config = HeapConfig::new().with_heap_words(16).with_max_chunks(2);
    let mut heap = Heap::with_config(config).unwrap();
    heap.allocate(WORD_SIZE).unwrap().unwrap();
    heap.allocate(WORD_SIZE).unwrap().unwrap();

    let fresh = heap.allocate_or_collect(WORD_SIZE, &NoRoots).unwrap();

    assert!(fresh.is_some());
    assert_eq!(heap.allocated_list().len(), 1);
    assert!(heap.verify().is_ok());
}
