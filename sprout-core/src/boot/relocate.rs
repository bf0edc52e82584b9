//! Image relocation
//!
//! Copies the RAM-resident segments of the application image from
//! persistent storage to their load addresses. The first segment after
//! the image header describes the flash-mapped code and is skipped; the
//! next [`RELOCATED_SEGMENTS`] are copied in file order, one word at a
//! time. Headers are not validated: this runs before anything could
//! report an error.

use heapless::Vec;
use sprout_hal::{BootStorage, WordMemory};
use sprout_image::{SegmentHeader, IMAGE_HEADER_LEN, RELOCATED_SEGMENTS, SEGMENT_HEADER_LEN};

/// What relocation copied
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelocationReport {
    /// Segment headers in copy order
    pub segments: Vec<SegmentHeader, RELOCATED_SEGMENTS>,
    /// Total words written to memory
    pub words: u32,
}

fn read_segment_header<S: BootStorage + ?Sized>(storage: &S, offset: u32) -> SegmentHeader {
    SegmentHeader {
        load_addr: storage.read_u32(offset),
        data_len: storage.read_u32(offset.wrapping_add(4)),
    }
}

/// Copy the relocated segments of the image at `image_offset` into `memory`
///
/// Payload lengths are assumed word-aligned; trailing bytes of an
/// unaligned payload are not copied.
pub fn relocate<S, M>(storage: &S, image_offset: u32, memory: &mut M) -> RelocationReport
where
    S: BootStorage + ?Sized,
    M: WordMemory,
{
    let mut report = RelocationReport::default();

    // The header's own descriptor: the flash-mapped segment
    let mut offset = image_offset.wrapping_add(IMAGE_HEADER_LEN as u32);
    let mut header = read_segment_header(storage, offset);

    for _ in 0..RELOCATED_SEGMENTS {
        offset = header.next_offset(offset);
        header = read_segment_header(storage, offset);

        // Address arithmetic wraps at 32 bits, as on the chip
        let src = offset.wrapping_add(SEGMENT_HEADER_LEN as u32);
        for i in 0..header.word_count() {
            let word = storage.read_u32(src.wrapping_add(4 * i));
            memory.write_word(header.load_addr.wrapping_add(4 * i), word);
        }

        report.words = report.words.wrapping_add(header.word_count());
        // Capacity matches the loop bound
        let _ = report.segments.push(header);
    }

    report
}
