/*!
 * Core Types
 * Common types used across the heap
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size type for memory operations (bytes or words, as named at the use site)
pub type Size = usize;

/// Word offset into an arena
pub type WordOffset = usize;

/// Addressing and accounting granularity: the platform pointer width
pub const WORD_SIZE: Size = std::mem::size_of::<usize>();

/// Number of words needed to hold `bytes` bytes
#[inline]
pub fn words_for(bytes: Size) -> Size {
    bytes.div_ceil(WORD_SIZE)
}

/// Machine address of an arena word handed out to callers
///
/// Addresses are real addresses so that a caller keeping one in a local
/// variable or inside another allocation makes it visible to the
/// conservative scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(usize);

impl Address {
    pub const NULL: Address = Address(0);

    #[inline]
    pub const fn new(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<usize> for Address {
    fn from(raw: usize) -> Self {
        Self(raw)
    }
}

impl From<Address> for usize {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}
