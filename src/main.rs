/*!
 * Chunk GC - Demonstration Driver
 *
 * Walks a heap through allocation, freeing, coalescing and one collection
 * cycle rooted in this thread's stack, printing the chunk lists as it goes.
 */

use std::hint::black_box;
use std::mem::size_of;

use chunk_gc::{init_tracing, Address, Heap, HeapConfig, StackRoots};
use miette::IntoDiagnostic;
use tracing::info;

const DEMO_ALLOCATIONS: usize = 20;
const CHAIN_LENGTH: usize = 3;

fn main() -> miette::Result<()> {
    init_tracing();

    let anchor = 0usize;
    let roots = StackRoots::from_anchor(&anchor);

    let config = HeapConfig::from_env();
    let mut heap = Heap::with_config(config)?;
    info!(config = ?heap.config(), "chunk-gc demo starting");

    print_lists(&heap, "Initial heap");
    allocation_demo(&mut heap)?;
    collection_demo(&mut heap, &roots)?;

    black_box(&anchor);
    Ok(())
}

fn print_lists(heap: &Heap, title: &str) {
    println!("== {} ==", title);
    println!("free {}", heap.free_list());
    println!("allocated {}", heap.allocated_list());
}

#[inline(never)]
fn allocation_demo(heap: &mut Heap) -> miette::Result<()> {
    let mut addresses: Vec<Address> = Vec::with_capacity(DEMO_ALLOCATIONS);
    for _ in 0..DEMO_ALLOCATIONS {
        if let Some(address) = heap.allocate(size_of::<i32>())? {
            addresses.push(address);
        }
    }
    print_lists(heap, "After allocating");

    for address in addresses {
        heap.free(address)?;
    }
    print_lists(heap, "After freeing");

    let fragmented = heap.stats().fragmented_words();
    let merges = heap.coalesce();
    info!(
        merges,
        fragmented_before = fragmented,
        fragmented_after = heap.stats().fragmented_words(),
        "Coalesced free list"
    );
    print_lists(heap, "After coalescing");

    Ok(())
}

#[inline(never)]
fn collection_demo(heap: &mut Heap, roots: &StackRoots) -> miette::Result<()> {
    let head = build_chain(heap)?;
    // Unreferenced from anywhere once this call returns
    discard_garbage(heap)?;

    let head = black_box(head);
    let stats = heap.collect(roots)?;
    black_box(&head);

    if !stats.freed_any() {
        info!("Collection found no garbage: every chunk looked reachable");
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&stats).into_diagnostic()?
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&heap.stats()).into_diagnostic()?
    );
    print_lists(heap, "After collection");

    Ok(())
}

/// Allocate a linked chain where each node stores the next node's address
#[inline(never)]
fn build_chain(heap: &mut Heap) -> miette::Result<Address> {
    let mut next = Address::NULL;
    for _ in 0..CHAIN_LENGTH {
        let Some(node) = heap.allocate(2 * size_of::<usize>())? else {
            break;
        };
        heap.store(node, 0, next)?;
        next = node;
    }
    Ok(next)
}

#[inline(never)]
fn discard_garbage(heap: &mut Heap) -> miette::Result<()> {
    for _ in 0..CHAIN_LENGTH {
        heap.allocate(size_of::<usize>())?;
    }
    Ok(())
}
