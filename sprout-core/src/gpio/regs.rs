//! ESP8266 GPIO register map
//!
//! Addresses are absolute. The W1TS/W1TC registers act on their base
//! register: writing a 1 bit sets (W1TS) or clears (W1TC) that bit and
//! leaves every other bit alone.

use sprout_hal::register::Field;

/// GPIO block base address
pub const GPIO_BASE: u32 = 0x6000_0300;

/// Output latch
pub const OUT: u32 = GPIO_BASE;
/// Write-1-to-set output latch
pub const OUT_W1TS: u32 = GPIO_BASE + 0x04;
/// Write-1-to-clear output latch
pub const OUT_W1TC: u32 = GPIO_BASE + 0x08;
/// Output enable
pub const ENABLE: u32 = GPIO_BASE + 0x0C;
/// Write-1-to-set output enable
pub const ENABLE_W1TS: u32 = GPIO_BASE + 0x10;
/// Write-1-to-clear output enable
pub const ENABLE_W1TC: u32 = GPIO_BASE + 0x14;
/// Input levels
pub const IN: u32 = GPIO_BASE + 0x18;
/// Pending interrupt status
pub const STATUS: u32 = GPIO_BASE + 0x1C;
/// Write-1-to-set interrupt status
pub const STATUS_W1TS: u32 = GPIO_BASE + 0x20;
/// Write-1-to-clear interrupt status
pub const STATUS_W1TC: u32 = GPIO_BASE + 0x24;
/// Sigma-delta generator control
pub const SIGMA_DELTA: u32 = GPIO_BASE + 0x68;

/// Per-pin control register
pub const fn pin(n: u8) -> u32 {
    GPIO_BASE + 0x28 + 4 * n as u32
}

/// Signal source: 0 = GPIO data, 1 = sigma-delta
pub const PIN_SOURCE: Field = Field::new(0, 1);
/// Pad driver: 0 = push-pull, 1 = open-drain
pub const PIN_DRIVER: Field = Field::new(2, 1);
/// Interrupt trigger type
pub const PIN_INT_TYPE: Field = Field::new(7, 3);
/// Wakeup from light sleep on a level interrupt
pub const PIN_WAKEUP_ENABLE: Field = Field::new(10, 1);

/// Sigma-delta generator enable
pub const SIGMA_DELTA_ENABLE: u32 = 1 << 16;

/// IO MUX block base address
pub const IO_MUX_BASE: u32 = 0x6000_0800;

/// Mux register offsets, indexed by GPIO number
///
/// The pads are not laid out in GPIO order.
const IO_MUX_OFFSETS: [u32; 16] = [
    0x34, 0x18, 0x38, 0x14, 0x3C, 0x40, 0x1C, 0x20, 0x24, 0x28, 0x2C, 0x30, 0x04, 0x08, 0x0C,
    0x10,
];

/// IO MUX register for GPIO `n`
pub const fn io_mux(n: u8) -> u32 {
    IO_MUX_BASE + IO_MUX_OFFSETS[n as usize]
}

/// Function select, low two bits (bits 4..5)
pub const MUX_FUNC_LOW: Field = Field::new(4, 2);
/// Function select, high bit (bit 8)
pub const MUX_FUNC_HIGH: Field = Field::new(8, 1);
/// Pull-up enable
pub const MUX_PULLUP: u32 = 1 << 7;

/// Mask covering the whole function select
pub const MUX_FUNC_MASK: u32 = MUX_FUNC_LOW.mask() | MUX_FUNC_HIGH.mask();

/// Encode a mux function number (0..=7) into register bits
pub const fn mux_func_bits(func: u8) -> u32 {
    MUX_FUNC_LOW.encode(func as u32 & 0x3) | MUX_FUNC_HIGH.encode((func as u32 >> 2) & 0x1)
}

/// Decode the mux function number from a register value
pub const fn mux_func(register: u32) -> u8 {
    (MUX_FUNC_LOW.decode(register) | (MUX_FUNC_HIGH.decode(register) << 2)) as u8
}

/// RTC pad configuration shared with XPD_DCDC
pub const PAD_XPD_DCDC_CONF: u32 = 0x6000_07A0;
/// RTC GPIO output latch
pub const RTC_GPIO_OUT: u32 = 0x6000_0768;
/// RTC GPIO output enable
pub const RTC_GPIO_ENABLE: u32 = 0x6000_0774;
/// RTC GPIO input level
pub const RTC_GPIO_IN_DATA: u32 = 0x6000_078C;
/// RTC GPIO function configuration
pub const RTC_GPIO_CONF: u32 = 0x6000_0790;

/// Bits of PAD_XPD_DCDC_CONF cleared when routing the pad to RTC GPIO0
pub const XPD_DCDC_MUX_CLEAR: u32 = 0x43;
/// Routes the XPD_DCDC pad to RTC GPIO0
pub const XPD_DCDC_MUX_RTC_GPIO: u32 = 0x1;
/// Bit 0 of each RTC GPIO register belongs to the RTC pin
pub const RTC_PIN_BIT: u32 = 0x1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_register_addresses() {
        assert_eq!(pin(0), 0x6000_0328);
        assert_eq!(pin(15), 0x6000_0364);
        assert!(pin(15) < SIGMA_DELTA);
    }

    #[test]
    fn test_io_mux_addresses() {
        assert_eq!(io_mux(0), 0x6000_0834);
        assert_eq!(io_mux(2), 0x6000_0838);
        assert_eq!(io_mux(12), 0x6000_0804);
        assert_eq!(io_mux(15), 0x6000_0810);
    }

    #[test]
    fn test_mux_function_encoding() {
        assert_eq!(mux_func_bits(0), 0);
        assert_eq!(mux_func_bits(3), 0x30);
        assert_eq!(mux_func_bits(4), 0x100);
        assert_eq!(MUX_FUNC_MASK, 0x130);
        for func in 0..8 {
            assert_eq!(mux_func(mux_func_bits(func) | MUX_PULLUP), func);
        }
    }
}
