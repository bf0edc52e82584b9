//! Board-agnostic core of the Sprout ESP8266 firmware
//!
//! This crate contains the two pieces of the firmware that run closest to
//! the hardware, written against the `sprout-hal` traits so they can be
//! exercised on the host:
//!
//! - [`gpio`]: the pin controller (direction, mux, pulls, drive mode,
//!   interrupt and wakeup configuration), the RTC-domain pin and the
//!   single GPIO interrupt handler slot
//! - [`boot`]: the bring-up sequencer (image relocation, bss zeroing,
//!   vector setup, ordered subsystem init, runtime handoff)
//! - [`config`]: build-time boot configuration

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod boot;
pub mod config;
pub mod gpio;
