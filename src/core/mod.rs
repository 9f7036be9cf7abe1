/*!
 * Core Module
 * Fundamental heap types, limits and configuration
 */

pub mod config;
pub mod limits;
pub mod types;

// Re-export for convenience
pub use config::{FreePolicy, HeapConfig};
pub use types::*;
