//! Segment headers and segment iteration
//!
//! Segment header format (8 bytes, little-endian):
//! - LOAD_ADDR (4 bytes): destination address of the payload
//! - DATA_LEN (4 bytes): payload length in bytes
//!
//! The payload follows its header immediately.

use crate::header::{ImageHeader, IMAGE_HEADER_LEN};
use crate::{ImageError, RELOCATED_SEGMENTS};

/// Size of a segment header in bytes
pub const SEGMENT_HEADER_LEN: usize = 8;

/// Parsed segment header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentHeader {
    /// Destination address of the payload
    pub load_addr: u32,
    /// Payload length in bytes
    pub data_len: u32,
}

impl SegmentHeader {
    /// Parse a segment header from the start of `bytes`
    pub fn parse(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() < SEGMENT_HEADER_LEN {
            return Err(ImageError::Truncated);
        }

        Ok(Self {
            load_addr: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data_len: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Encode this header into `buffer`
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, ImageError> {
        if buffer.len() < SEGMENT_HEADER_LEN {
            return Err(ImageError::BufferTooSmall);
        }

        buffer[0..4].copy_from_slice(&self.load_addr.to_le_bytes());
        buffer[4..8].copy_from_slice(&self.data_len.to_le_bytes());

        Ok(SEGMENT_HEADER_LEN)
    }

    /// Offset of the next segment header, given this header's offset
    ///
    /// Wraps at 32 bits like the ROM loader, so an erased header
    /// (`data_len == 0xFFFF_FFFF`) cannot overflow.
    pub fn next_offset(&self, offset: u32) -> u32 {
        offset
            .wrapping_add(SEGMENT_HEADER_LEN as u32)
            .wrapping_add(self.data_len)
    }

    /// Number of whole words in the payload; trailing bytes are not copied
    pub fn word_count(&self) -> u32 {
        self.data_len / 4
    }
}

/// A segment header together with its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Offset of the segment header from the start of the image
    pub offset: u32,
    /// The segment header
    pub header: SegmentHeader,
    /// The payload bytes
    pub data: &'a [u8],
}

/// Iterator over the segments of an image held in memory
///
/// Yields an error once and then stops if a header or payload is truncated.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    image: &'a [u8],
    offset: usize,
    remaining: usize,
}

impl<'a> Segments<'a> {
    /// Iterate all segments named by the image header
    pub fn new(image: &'a [u8]) -> Result<Self, ImageError> {
        let header = ImageHeader::parse(image)?;
        Ok(Self {
            image,
            offset: IMAGE_HEADER_LEN,
            remaining: header.segment_count as usize,
        })
    }

    /// The segments copied to RAM at reset: skip the flash-mapped one,
    /// take the next [`RELOCATED_SEGMENTS`]
    pub fn relocated(
        image: &'a [u8],
    ) -> Result<impl Iterator<Item = Result<Segment<'a>, ImageError>>, ImageError> {
        Ok(Self::new(image)?.skip(1).take(RELOCATED_SEGMENTS))
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Result<Segment<'a>, ImageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let result = self.parse_at(self.offset);
        match result {
            Ok(segment) => {
                self.offset = segment.header.next_offset(segment.offset) as usize;
            }
            Err(_) => self.remaining = 0,
        }
        Some(result)
    }
}

impl<'a> Segments<'a> {
    fn parse_at(&self, offset: usize) -> Result<Segment<'a>, ImageError> {
        let rest = self.image.get(offset..).ok_or(ImageError::Truncated)?;
        let header = SegmentHeader::parse(rest)?;
        let end = SEGMENT_HEADER_LEN
            .checked_add(header.data_len as usize)
            .ok_or(ImageError::Truncated)?;
        let data = rest
            .get(SEGMENT_HEADER_LEN..end)
            .ok_or(ImageError::Truncated)?;

        Ok(Segment {
            offset: offset as u32,
            header,
            data,
        })
    }
}

/// Write a complete image (header followed by every segment) into `buffer`
///
/// The header's `segment_count` is taken from `segments`. Returns the
/// number of bytes written.
pub fn write_image(
    header: ImageHeader,
    segments: &[(u32, &[u8])],
    buffer: &mut [u8],
) -> Result<usize, ImageError> {
    let count = u8::try_from(segments.len()).map_err(|_| ImageError::TooManySegments)?;
    let header = ImageHeader {
        segment_count: count,
        ..header
    };

    let mut pos = header.encode(buffer)?;
    for &(load_addr, data) in segments {
        let seg = SegmentHeader {
            load_addr,
            data_len: data.len() as u32,
        };
        pos += seg.encode(buffer.get_mut(pos..).ok_or(ImageError::BufferTooSmall)?)?;
        buffer
            .get_mut(pos..pos + data.len())
            .ok_or(ImageError::BufferTooSmall)?
            .copy_from_slice(data);
        pos += data.len();
    }

    Ok(pos)
}
