//! Sprout Hardware Abstraction Layer
//!
//! This crate defines the capabilities the bring-up core needs from the
//! chip. Everything above it (the pin controller, the bring-up sequencer)
//! only talks to hardware through these traits, so the same logic runs
//! against real MMIO on the target and against an in-memory register file
//! on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  sprout-firmware (reset entry, tasks)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sprout-core (gpio, boot sequencer)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sprout-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!         │                       │
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ sprout-hal-   │       │ sprout_hal::  │
//! │   esp8266     │       │   sim (tests) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`register::RegisterBank`] - 32-bit memory-mapped registers
//! - [`memory::WordMemory`] - word-granular RAM used by relocation and bss zeroing
//! - [`storage::BootStorage`] - byte reads from the persistent image store
//! - [`vector::VectorTable`] - interrupt vector base setup

#![no_std]
#![deny(unsafe_code)]

pub mod memory;
pub mod register;
pub mod storage;
pub mod vector;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

// Re-export key traits at crate root for convenience
pub use memory::WordMemory;
pub use register::RegisterBank;
pub use storage::BootStorage;
pub use vector::VectorTable;
