//! Memory-mapped register abstractions
//!
//! A register bank is the set of 32-bit peripheral registers a driver can
//! reach by address. Implementations decide how an access reaches the
//! hardware; callers decide when an access must be atomic.

/// 32-bit register bank
///
/// Reads and writes always succeed. [`RegisterBank::modify`] is a plain
/// read followed by a write and is NOT atomic on its own; callers that
/// share a register with interrupt context wrap it in a critical section.
pub trait RegisterBank {
    /// Read the register at `addr`
    fn read(&self, addr: u32) -> u32;

    /// Write `value` to the register at `addr`
    fn write(&mut self, addr: u32, value: u32);

    /// Read-modify-write: clear the bits in `clear`, then set the bits in `set`
    fn modify(&mut self, addr: u32, clear: u32, set: u32) {
        let value = self.read(addr);
        self.write(addr, (value & !clear) | set);
    }
}

impl<T: RegisterBank + ?Sized> RegisterBank for &mut T {
    fn read(&self, addr: u32) -> u32 {
        (**self).read(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        (**self).write(addr, value)
    }

    fn modify(&mut self, addr: u32, clear: u32, set: u32) {
        (**self).modify(addr, clear, set)
    }
}

/// A bit field inside a 32-bit register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Bit position of the least significant bit
    pub lsb: u8,
    /// Field width in bits
    pub width: u8,
}

impl Field {
    /// Create a field descriptor
    pub const fn new(lsb: u8, width: u8) -> Self {
        Self { lsb, width }
    }

    /// In-place mask of the field
    pub const fn mask(self) -> u32 {
        (u32::MAX >> (32 - self.width as u32)) << self.lsb
    }

    /// Shift `value` into position, truncated to the field width
    pub const fn encode(self, value: u32) -> u32 {
        (value << self.lsb) & self.mask()
    }

    /// Extract the field from a register value
    pub const fn decode(self, register: u32) -> u32 {
        (register & self.mask()) >> self.lsb
    }
}
