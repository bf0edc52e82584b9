//! Volatile register and RAM access

use sprout_hal::{RegisterBank, WordMemory};

/// The peripheral register space (`0x6000_0000..`)
///
/// Zero-sized: every access goes straight to the absolute address.
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Take the register space
    ///
    /// # Safety
    ///
    /// The caller must make sure no other owner performs conflicting
    /// register updates outside a critical section.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl RegisterBank for Mmio {
    fn read(&self, addr: u32) -> u32 {
        // SAFETY: peripheral registers are always mapped and word aligned
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    fn write(&mut self, addr: u32, value: u32) {
        // SAFETY: as above
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }
}

/// Physical RAM, written word by word during bring-up
///
/// IRAM only accepts 32-bit accesses, so every access is a full word.
pub struct RawMemory {
    _private: (),
}

impl RawMemory {
    /// Take raw RAM access
    ///
    /// # Safety
    ///
    /// Only valid before anything lives in the regions being written:
    /// relocation and bss zeroing run before any Rust static is used.
    pub const unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl WordMemory for RawMemory {
    fn read_word(&self, addr: u32) -> u32 {
        // SAFETY: see `steal`
        unsafe { core::ptr::read_volatile(addr as *const u32) }
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        // SAFETY: see `steal`
        unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
    }
}
