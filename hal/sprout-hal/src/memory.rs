//! Word-granular memory access
//!
//! Used by the bring-up sequencer to copy relocated segments into RAM and
//! to zero the bss region. Addresses are byte addresses and are expected
//! to be word-aligned.

/// Word-addressable RAM
pub trait WordMemory {
    /// Read the word at `addr`
    fn read_word(&self, addr: u32) -> u32;

    /// Write `value` to the word at `addr`
    fn write_word(&mut self, addr: u32, value: u32);
}

impl<T: WordMemory + ?Sized> WordMemory for &mut T {
    fn read_word(&self, addr: u32) -> u32 {
        (**self).read_word(addr)
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        (**self).write_word(addr, value)
    }
}
