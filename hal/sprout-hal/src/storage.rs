//! Persistent image storage
//!
//! The application image lives in SPI flash. During bring-up the flash is
//! reachable through a memory-mapped window, so reads cannot fail; the
//! trait reflects that.

/// Byte-addressable read access to the persistent store holding the boot image
pub trait BootStorage {
    /// Fill `buffer` with the bytes starting at `offset`
    fn read(&self, offset: u32, buffer: &mut [u8]);

    /// Read a little-endian 32-bit word at `offset`
    fn read_u32(&self, offset: u32) -> u32 {
        let mut bytes = [0u8; 4];
        self.read(offset, &mut bytes);
        u32::from_le_bytes(bytes)
    }
}

impl<T: BootStorage + ?Sized> BootStorage for &T {
    fn read(&self, offset: u32, buffer: &mut [u8]) {
        (**self).read(offset, buffer)
    }
}

impl BootStorage for [u8] {
    /// Bytes past the end read as erased flash (0xFF)
    fn read(&self, offset: u32, buffer: &mut [u8]) {
        let start = (offset as usize).min(self.len());
        let available = &self[start..];
        let n = available.len().min(buffer.len());
        buffer[..n].copy_from_slice(&available[..n]);
        buffer[n..].fill(0xFF);
    }
}
