/*!
 * Memory Module
 * Fixed-arena heap, chunk lists and garbage collection
 */

pub mod arena;
pub mod chunk_list;
pub mod gc;
pub mod manager;
pub mod traits;
pub mod types;

pub use arena::Arena;
pub use chunk_list::ChunkList;
pub use gc::{Collector, GcStats, NoRoots, StackRoots};
pub use manager::Heap;
pub use traits::*;
pub use types::*;
