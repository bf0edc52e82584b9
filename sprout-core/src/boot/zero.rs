//! Uninitialized-globals (bss) zeroing

use core::ops::Range;

use sprout_hal::WordMemory;

/// Zero every word in `region`, returning the number of words written
///
/// `region` is a byte range whose bounds are word-aligned, as the linker
/// script guarantees for `_bss_start.._bss_end`.
pub fn zero_region<M: WordMemory>(memory: &mut M, region: Range<u32>) -> u32 {
    debug_assert!(region.start % 4 == 0 && region.end % 4 == 0);
    let mut words = 0;
    let mut addr = region.start;
    while addr < region.end {
        memory.write_word(addr, 0);
        addr += 4;
        words += 1;
    }
    words
}
