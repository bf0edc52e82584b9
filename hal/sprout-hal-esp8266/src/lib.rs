//! ESP8266-specific HAL for Sprout firmware
//!
//! Implements the `sprout-hal` traits on the real chip:
//!
//! - [`mmio::Mmio`]: volatile access to the peripheral register space
//! - [`mmio::RawMemory`]: word writes to IRAM/DRAM during relocation
//! - [`flash::MappedFlash`]: the memory-mapped SPI flash window
//! - [`vecbase::Vecbase`]: the Xtensa `VECBASE` special register, which
//!   also masks level-1 interrupts until the runtime starts
//!
//! With the `critical-section-impl` feature it also provides the
//! single-core critical-section implementation (raise the interrupt level
//! to 15, restore `PS` on release).

#![no_std]
#![cfg_attr(target_arch = "xtensa", feature(asm_experimental_arch))]

#[cfg(all(feature = "critical-section-impl", target_arch = "xtensa"))]
mod cs;
pub mod flash;
pub mod mmio;
pub mod vecbase;

// Re-export shared traits from sprout-hal for convenience
pub use sprout_hal::{BootStorage, RegisterBank, VectorTable, WordMemory};

pub use flash::MappedFlash;
pub use mmio::{Mmio, RawMemory};
pub use vecbase::{enable_interrupts, Vecbase};
