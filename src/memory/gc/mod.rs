/*!
 * Garbage Collection
 * Conservative mark-sweep over a heap's allocated chunks
 */

pub mod collector;
pub mod roots;

pub use collector::{Collector, GcStats};
pub use roots::{NoRoots, StackRoots};
