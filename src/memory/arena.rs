/*!
 * Arena
 * Fixed-length, word-aligned backing memory for a heap
 */

use crate::core::types::{Address, Size, WordOffset, WORD_SIZE};

/// Fixed block of zero-initialized words
///
/// The boxed slice never reallocates, so the machine address of every word
/// is stable for the arena's lifetime even when the owning heap moves.
#[derive(Debug)]
pub struct Arena {
    words: Box<[usize]>,
}

impl Arena {
    pub fn new(len_words: Size) -> Self {
        Self {
            words: vec![0usize; len_words].into_boxed_slice(),
        }
    }

    /// Length in words
    #[inline]
    pub fn len(&self) -> Size {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Machine address of word 0
    #[inline]
    pub fn base(&self) -> usize {
        self.words.as_ptr() as usize
    }

    /// Machine address of a word offset
    #[inline]
    pub fn address_of(&self, offset: WordOffset) -> Address {
        Address::new(self.base() + offset * WORD_SIZE)
    }

    /// Word offset of an exact, word-aligned address inside the arena
    pub fn offset_of(&self, address: Address) -> Option<WordOffset> {
        let raw = address.as_usize();
        let delta = raw.checked_sub(self.base())?;
        if delta % WORD_SIZE != 0 {
            return None;
        }
        let offset = delta / WORD_SIZE;
        (offset < self.len()).then_some(offset)
    }

    /// Word containing an arbitrary value, if the value points into the arena
    ///
    /// Interior and unaligned values resolve to the word they fall in.
    #[inline]
    pub fn word_containing(&self, value: usize) -> Option<WordOffset> {
        let offset = value.checked_sub(self.base())? / WORD_SIZE;
        (offset < self.len()).then_some(offset)
    }

    #[inline]
    pub fn words(&self, start: WordOffset, len: Size) -> &[usize] {
        &self.words[start..start + len]
    }

    #[inline]
    pub fn words_mut(&mut self, start: WordOffset, len: Size) -> &mut [usize] {
        &mut self.words[start..start + len]
    }
}
