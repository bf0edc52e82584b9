//! Image header
//!
//! Header format (8 bytes, little-endian):
//! - MAGIC (1 byte): 0xE9
//! - SEGMENT_COUNT (1 byte): number of segments that follow
//! - SPI_MODE (1 byte): flash access mode (QIO, DIO, ...)
//! - SPI_SPEED_SIZE (1 byte): low nibble speed, high nibble flash size
//! - ENTRY_ADDR (4 bytes): entry point recorded by the image tool

use crate::ImageError;

/// Image header magic byte
pub const IMAGE_MAGIC: u8 = 0xE9;

/// Size of the image header in bytes
pub const IMAGE_HEADER_LEN: usize = 8;

/// Parsed image header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImageHeader {
    /// Number of segments in the image
    pub segment_count: u8,
    /// Flash access mode
    pub spi_mode: u8,
    /// Flash speed (low nibble) and size (high nibble)
    pub spi_speed_size: u8,
    /// Entry address recorded by the image tool
    pub entry_addr: u32,
}

impl ImageHeader {
    /// Create a header with default flash settings
    pub const fn new(segment_count: u8, entry_addr: u32) -> Self {
        Self {
            segment_count,
            spi_mode: 0,
            spi_speed_size: 0,
            entry_addr,
        }
    }

    /// Parse and validate a header from the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() < IMAGE_HEADER_LEN {
            return Err(ImageError::Truncated);
        }
        if bytes[0] != IMAGE_MAGIC {
            return Err(ImageError::BadMagic);
        }

        Ok(Self {
            segment_count: bytes[1],
            spi_mode: bytes[2],
            spi_speed_size: bytes[3],
            entry_addr: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Encode this header into `buffer`
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ImageError> {
        if buffer.len() < IMAGE_HEADER_LEN {
            return Err(ImageError::BufferTooSmall);
        }

        buffer[0] = IMAGE_MAGIC;
        buffer[1] = self.segment_count;
        buffer[2] = self.spi_mode;
        buffer[3] = self.spi_speed_size;
        buffer[4..8].copy_from_slice(&self.entry_addr.to_le_bytes());

        Ok(IMAGE_HEADER_LEN)
    }
}
