//! GPIO pin controller
//!
//! - [`PinController`]: GPIO 0..15 (direction, mux, pulls, drive mode,
//!   interrupt and wakeup configuration)
//! - [`RtcPin`]: GPIO16 in the RTC domain, direction and level only
//! - [`InterruptSlot`]: the single GPIO interrupt handler registration

pub mod controller;
pub mod irq;
pub mod regs;
pub mod rtc_pin;
pub mod types;

pub use controller::PinController;
pub use irq::{GpioHandler, InterruptSlot, GPIO_INTERRUPT};
pub use rtc_pin::RtcPin;
pub use types::{
    gpio_mux_function, Direction, DriveMode, InterruptType, PinConfig, PinMask, PinMode,
    PIN_COUNT,
};
