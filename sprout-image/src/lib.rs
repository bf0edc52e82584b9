//! Application image format
//!
//! This crate defines the on-flash layout of a Sprout application image
//! as produced by the ESP8266 image tool and consumed by the bring-up
//! sequencer.
//!
//! # Image Layout
//!
//! ```text
//! ┌──────────────┬─────────────────┬─────────┬─────────────────┬─────────┬───
//! │ IMAGE HEADER │ SEGMENT HEADER  │ PAYLOAD │ SEGMENT HEADER  │ PAYLOAD │ ...
//! │ 8B           │ load_addr, len  │ len B   │ load_addr, len  │ len B   │
//! └──────────────┴─────────────────┴─────────┴─────────────────┴─────────┴───
//! ```
//!
//! The first segment describes the flash-mapped code region and stays in
//! place; the following [`RELOCATED_SEGMENTS`] segments are copied to RAM
//! at reset.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod header;
pub mod segment;

pub use header::{ImageHeader, IMAGE_HEADER_LEN, IMAGE_MAGIC};
pub use segment::{Segment, SegmentHeader, Segments, SEGMENT_HEADER_LEN};

/// Number of segments after the flash-mapped one that are copied to RAM
pub const RELOCATED_SEGMENTS: usize = 3;

/// Errors from parsing or encoding an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Input ends before a header or payload is complete
    Truncated,
    /// First byte is not [`IMAGE_MAGIC`]
    BadMagic,
    /// More segments than the encoder can hold
    TooManySegments,
    /// Output buffer too small for encoding
    BufferTooSmall,
}
