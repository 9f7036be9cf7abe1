/*!
 * Root Providers
 * Candidate pointer sources for the conservative collector
 */

use super::super::traits::RootProvider;
use crate::core::types::WORD_SIZE;
use std::hint::black_box;
use std::ptr;

/// Empty root set: the next cycle frees every allocation
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRoots;

impl RootProvider for NoRoots {
    fn scan(&self, _visit: &mut dyn FnMut(usize)) {}
}

impl RootProvider for [usize] {
    fn scan(&self, visit: &mut dyn FnMut(usize)) {
        for &word in self {
            visit(word);
        }
    }
}

impl<const N: usize> RootProvider for [usize; N] {
    fn scan(&self, visit: &mut dyn FnMut(usize)) {
        self.as_slice().scan(visit)
    }
}

impl RootProvider for Vec<usize> {
    fn scan(&self, visit: &mut dyn FnMut(usize)) {
        self.as_slice().scan(visit)
    }
}

/// Conservative scan of the current thread's call stack
///
/// Covers every word between a base recorded once (normally in `main`) and
/// the frame running the collection. Values held in frames called from the
/// anchoring frame are seen; the anchoring frame's own other locals may not
/// be. Must only be used on the thread that recorded the base, while the
/// anchoring frame is still live.
#[derive(Debug, Clone, Copy)]
pub struct StackRoots {
    base: usize,
}

impl StackRoots {
    /// Use the address just past `anchor` as the stack bound
    pub fn from_anchor<T>(anchor: &T) -> Self {
        let base = ptr::from_ref(black_box(anchor)) as usize + std::mem::size_of::<T>();
        Self { base }
    }

    /// Use an explicit stack bound
    pub fn from_base(base: usize) -> Self {
        Self { base }
    }

    pub fn base(&self) -> usize {
        self.base
    }
}

impl RootProvider for StackRoots {
    #[inline(never)]
    fn scan(&self, visit: &mut dyn FnMut(usize)) {
        let marker = 0usize;
        let here = ptr::from_ref(black_box(&marker)) as usize;

        // Either growth direction: scan whatever lies between the two bounds
        let (low, high) = if here < self.base {
            (here, self.base)
        } else {
            (self.base, here)
        };

        let mut cursor = low & !(WORD_SIZE - 1);
        while cursor + WORD_SIZE <= high {
            // SAFETY: [low, high) spans live frames of the current thread's
            // stack, between this frame and the still-active anchoring frame.
            // Volatile reads keep the compiler from assuming anything about
            // words it did not write.
            let word = unsafe { ptr::read_volatile(cursor as *const usize) };
            visit(word);
            cursor += WORD_SIZE;
        }
    }
}
