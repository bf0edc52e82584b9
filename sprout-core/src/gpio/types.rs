//! Pin configuration types

use core::ops::{BitAnd, BitOr, Not};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of pins in the main GPIO bank
pub const PIN_COUNT: u8 = 16;

/// Mux function routing a pad to its GPIO, for pins in [`MUX_A_PINS`]
pub const MUX_FUNC_A: u8 = 0;

/// Mux function routing a pad to its GPIO, for every other pin
pub const MUX_FUNC_B: u8 = 3;

/// Pins whose GPIO function is mux function A
pub const MUX_A_PINS: PinMask = PinMask(1 << 0 | 1 << 2 | 1 << 4 | 1 << 5);

/// Mux function that selects GPIO for `pin`
///
/// A fixed hardware property of the pad, not configurable.
pub const fn gpio_mux_function(pin: u8) -> u8 {
    if MUX_A_PINS.contains(pin) {
        MUX_FUNC_A
    } else {
        MUX_FUNC_B
    }
}

/// Bitmask of main-bank pins, bit `n` = GPIO `n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinMask(pub u16);

impl PinMask {
    /// No pins
    pub const NONE: Self = Self(0);
    /// All 16 pins
    pub const ALL: Self = Self(0xFFFF);

    /// Mask with only `pin` set
    pub const fn pin(pin: u8) -> Self {
        Self(1 << pin)
    }

    /// Raw bits
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether `pin` is in the mask
    pub const fn contains(self, pin: u8) -> bool {
        pin < PIN_COUNT && self.0 & (1 << pin) != 0
    }

    /// Whether no pin is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the set pin indices in ascending order
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (0..PIN_COUNT).filter(move |&pin| self.contains(pin))
    }
}

impl From<u16> for PinMask {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl BitOr for PinMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for PinMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for PinMask {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

/// Pin mode applied by [`configure`](super::PinController::configure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PinMode {
    /// Input, output driver disabled
    Input,
    /// Push-pull output
    Output,
    /// Open-drain output (drives low only)
    OpenDrain,
    /// Pulse-density modulated output from the sigma-delta generator
    SigmaDelta,
}

impl PinMode {
    /// Direction `configure` applies for this mode
    ///
    /// Open-drain and sigma-delta only change the drive source; the
    /// output enable is left as it was.
    pub fn direction(self) -> Option<Direction> {
        match self {
            PinMode::Input => Some(Direction::Input),
            PinMode::Output => Some(Direction::Output),
            PinMode::OpenDrain | PinMode::SigmaDelta => None,
        }
    }
}

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

/// Output drive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveMode {
    PushPull,
    OpenDrain,
    SigmaDelta,
}

/// Interrupt trigger type, encoded as in the pin control register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum InterruptType {
    #[default]
    Disabled = 0,
    RisingEdge = 1,
    FallingEdge = 2,
    AnyEdge = 3,
    LowLevel = 4,
    HighLevel = 5,
}

impl InterruptType {
    /// All trigger types in encoding order
    pub const ALL: [InterruptType; 6] = [
        InterruptType::Disabled,
        InterruptType::RisingEdge,
        InterruptType::FallingEdge,
        InterruptType::AnyEdge,
        InterruptType::LowLevel,
        InterruptType::HighLevel,
    ];

    /// Register encoding
    pub const fn bits(self) -> u32 {
        self as u32
    }

    /// Decode a register field value
    pub fn from_bits(bits: u32) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }

    /// Only level triggers can wake the chip from light sleep
    pub fn can_wake(self) -> bool {
        matches!(self, InterruptType::LowLevel | InterruptType::HighLevel)
    }
}

/// Decoded register state of one main-bank pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinConfig {
    pub direction: Direction,
    /// Mux function number
    pub mux: u8,
    pub pull_up: bool,
    pub drive: DriveMode,
    /// `None` if the field holds an encoding with no trigger type
    pub interrupt: Option<InterruptType>,
    pub wakeup: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mux_function_by_pin() {
        for pin in [0, 2, 4, 5] {
            assert_eq!(gpio_mux_function(pin), MUX_FUNC_A);
        }
        for pin in [1, 3, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15] {
            assert_eq!(gpio_mux_function(pin), MUX_FUNC_B);
        }
    }

    #[test]
    fn test_mask_iter() {
        let mask = PinMask::pin(2) | PinMask::pin(7) | PinMask::pin(15);
        let pins: heapless::Vec<u8, 16> = mask.iter().collect();
        assert_eq!(&pins[..], &[2, 7, 15]);
        assert_eq!(PinMask::NONE.iter().count(), 0);
        assert_eq!(PinMask::ALL.iter().count(), 16);
    }

    #[test]
    fn test_mask_contains_out_of_range() {
        assert!(!PinMask::ALL.contains(16));
    }

    #[test]
    fn test_interrupt_type_encoding() {
        for (bits, ty) in InterruptType::ALL.iter().enumerate() {
            assert_eq!(ty.bits(), bits as u32);
            assert_eq!(InterruptType::from_bits(bits as u32), Some(*ty));
        }
        assert_eq!(InterruptType::from_bits(6), None);
    }

    #[test]
    fn test_only_levels_wake() {
        let waking: heapless::Vec<InterruptType, 6> = InterruptType::ALL
            .iter()
            .copied()
            .filter(|t| t.can_wake())
            .collect();
        assert_eq!(&waking[..], &[InterruptType::LowLevel, InterruptType::HighLevel]);
    }

    #[test]
    fn test_mode_direction() {
        assert_eq!(PinMode::Input.direction(), Some(Direction::Input));
        assert_eq!(PinMode::Output.direction(), Some(Direction::Output));
        assert_eq!(PinMode::OpenDrain.direction(), None);
        assert_eq!(PinMode::SigmaDelta.direction(), None);
    }
}
