//! Memory-mapped SPI flash
//!
//! The flash cache maps the first megabyte of flash at
//! [`FLASH_MAP_BASE`]. Reads through the window must be 32-bit aligned, so
//! byte reads are assembled from aligned words.

use sprout_hal::BootStorage;

/// Address of flash offset 0 in the cache window
pub const FLASH_MAP_BASE: u32 = 0x4020_0000;

/// Size of the mapped window
pub const FLASH_MAP_SIZE: u32 = 0x10_0000;

/// The mapped flash window
pub struct MappedFlash {
    base: u32,
}

impl MappedFlash {
    /// Flash mapped at [`FLASH_MAP_BASE`]
    ///
    /// # Safety
    ///
    /// The flash cache must be enabled and mapping the window.
    pub const unsafe fn new() -> Self {
        Self {
            base: FLASH_MAP_BASE,
        }
    }

    /// Flash mapped at `base`
    ///
    /// # Safety
    ///
    /// `base..base + FLASH_MAP_SIZE` must be readable.
    pub const unsafe fn at(base: u32) -> Self {
        Self { base }
    }

    fn word(&self, offset: u32) -> u32 {
        debug_assert!(offset % 4 == 0 && offset < FLASH_MAP_SIZE);
        // SAFETY: the window is mapped for the lifetime of `self`
        unsafe { core::ptr::read_volatile(self.base.wrapping_add(offset) as *const u32) }
    }
}

impl BootStorage for MappedFlash {
    fn read(&self, offset: u32, buffer: &mut [u8]) {
        for (i, byte) in buffer.iter_mut().enumerate() {
            let at = offset.wrapping_add(i as u32);
            let word = self.word(at & !3);
            *byte = word.to_le_bytes()[(at & 3) as usize];
        }
    }

    fn read_u32(&self, offset: u32) -> u32 {
        if offset % 4 == 0 {
            self.word(offset)
        } else {
            let mut bytes = [0u8; 4];
            self.read(offset, &mut bytes);
            u32::from_le_bytes(bytes)
        }
    }
}
