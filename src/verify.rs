#![deny(missing_docs)]

//! Structural verification of serialised fonts.
//!
//! [`verify`] walks a BFFNT buffer alongside its decoded [`Font`] and collects every
//! invariant violation it can find instead of stopping at the first, so tools can report
//! all problems at once. It never mutates anything and is deliberately independent of the
//! codecs: all positions are recomputed from scratch.

use std::fmt;

use crate::binary::long_align;
use crate::font::Font;
use crate::sheet::SheetFormat;
use crate::tables::cmap::Mapping;
use crate::tables::{cmap, cwdh, ffnt, finf, krng, tglp};
use crate::tag::{self, DisplayTag};

/// A single violated invariant, carrying the byte offset it was detected at.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Violation {
    /// A section magic was not at its expected position.
    BadMagic {
        /// Position the magic was expected at.
        offset: usize,
        /// The expected tag.
        expected: u32,
    },
    /// The header's total file size does not match the buffer length.
    FileSize {
        /// Size stored in the file header.
        stored: u32,
        /// Actual buffer length.
        actual: usize,
    },
    /// A stored section size disagrees with the section's computed extent.
    SectionSize {
        /// Position of the size field.
        offset: usize,
        /// The stored value.
        stored: u32,
        /// The computed value.
        expected: u32,
    },
    /// A stored field disagrees with the value implied by the layout.
    FieldMismatch {
        /// Position of the field.
        offset: usize,
        /// The stored value.
        stored: u32,
        /// The computed value.
        expected: u32,
    },
    /// A padding byte is not zero.
    PaddingNotZero {
        /// Position of the first offending byte.
        offset: usize,
    },
    /// A width section's index range disagrees with its glyph count.
    GlyphCount {
        /// Position of the section.
        offset: usize,
        /// Count implied by the start and end indices.
        stored: usize,
        /// Number of decoded glyph entries.
        decoded: usize,
    },
    /// The sheet data region does not hold exactly `num_sheets x sheet_size` bytes.
    SheetRegion {
        /// Position of the `TGLP` section.
        offset: usize,
        /// Expected region size.
        expected: usize,
        /// Actual region size.
        actual: usize,
    },
    /// A scan-method character map does not cover the full codepoint range.
    ScanRange {
        /// Position of the section.
        offset: usize,
        /// Stored first codepoint.
        code_begin: u16,
        /// Stored last codepoint.
        code_end: u16,
    },
    /// A section does not end on a 4-byte boundary.
    Misaligned {
        /// The misaligned end position.
        offset: usize,
    },
    /// Bytes remain after the last section.
    TrailingBytes {
        /// Position of the first unaccounted byte.
        offset: usize,
    },
    /// A check could not be performed because the buffer ended early.
    OutOfBounds {
        /// Position of the attempted read.
        offset: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::BadMagic { offset, expected } => {
                write!(f, "{}: expected '{}' magic", offset, DisplayTag(*expected))
            }
            Violation::FileSize { stored, actual } => {
                write!(f, "12: stored file size {} but buffer is {} bytes", stored, actual)
            }
            Violation::SectionSize { offset, stored, expected } => {
                write!(f, "{}: stored section size {} but computed {}", offset, stored, expected)
            }
            Violation::FieldMismatch { offset, stored, expected } => {
                write!(f, "{}: stored {} but layout implies {}", offset, stored, expected)
            }
            Violation::PaddingNotZero { offset } => {
                write!(f, "{}: padding byte is not zero", offset)
            }
            Violation::GlyphCount { offset, stored, decoded } => write!(
                f,
                "{}: index range covers {} glyphs but section has {}",
                offset, stored, decoded
            ),
            Violation::SheetRegion { offset, expected, actual } => write!(
                f,
                "{}: sheet region should be {} bytes but spans {}",
                offset, expected, actual
            ),
            Violation::ScanRange { offset, code_begin, code_end } => write!(
                f,
                "{}: scan map covers {}..={} instead of the full range",
                offset, code_begin, code_end
            ),
            Violation::Misaligned { offset } => {
                write!(f, "{}: section does not end on a 4-byte boundary", offset)
            }
            Violation::TrailingBytes { offset } => {
                write!(f, "{}: unaccounted bytes at end of file", offset)
            }
            Violation::OutOfBounds { offset } => {
                write!(f, "{}: buffer too short to check", offset)
            }
        }
    }
}

struct Checker<'a> {
    data: &'a [u8],
    violations: Vec<Violation>,
}

impl<'a> Checker<'a> {
    fn u8(&mut self, offset: usize) -> Option<u8> {
        match self.data.get(offset) {
            Some(&byte) => Some(byte),
            None => {
                self.violations.push(Violation::OutOfBounds { offset });
                None
            }
        }
    }

    fn u16(&mut self, offset: usize) -> Option<u16> {
        match self.data.get(offset..offset + 2) {
            Some(bytes) => Some(u16::from_be_bytes([bytes[0], bytes[1]])),
            None => {
                self.violations.push(Violation::OutOfBounds { offset });
                None
            }
        }
    }

    fn u32(&mut self, offset: usize) -> Option<u32> {
        match self.data.get(offset..offset + 4) {
            Some(bytes) => Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
            None => {
                self.violations.push(Violation::OutOfBounds { offset });
                None
            }
        }
    }

    fn magic(&mut self, offset: usize, expected: u32) {
        match self.u32(offset) {
            Some(tag) if tag == expected => {}
            Some(_) => self.violations.push(Violation::BadMagic { offset, expected }),
            None => {}
        }
    }

    fn field(&mut self, offset: usize, stored: u32, expected: u32) {
        if stored != expected {
            self.violations.push(Violation::FieldMismatch { offset, stored, expected });
        }
    }

    fn zeros(&mut self, start: usize, end: usize) {
        let end = end.min(self.data.len());
        if start >= end {
            return;
        }
        if let Some(i) = self.data[start..end].iter().position(|&b| b != 0) {
            self.violations.push(Violation::PaddingNotZero { offset: start + i });
        }
    }

    fn aligned(&mut self, offset: usize) {
        if offset % 4 != 0 {
            self.violations.push(Violation::Misaligned { offset });
        }
    }
}

/// Check `data` against the decoded `font`, returning every violated invariant.
///
/// An empty result means the buffer is structurally sound.
pub fn verify(data: &[u8], font: &Font) -> Vec<Violation> {
    let mut c = Checker {
        data,
        violations: Vec::new(),
    };

    // File header.
    c.magic(0, tag::FFNT);
    if let Some(header_size) = c.u16(6) {
        if usize::from(header_size) != ffnt::HEADER_SIZE {
            c.violations.push(Violation::SectionSize {
                offset: 6,
                stored: u32::from(header_size),
                expected: ffnt::HEADER_SIZE as u32,
            });
        }
    }
    if let Some(stored) = c.u32(12) {
        if usize::try_from(stored) != Ok(data.len()) {
            c.violations.push(Violation::FileSize { stored, actual: data.len() });
        }
    }

    // Font info.
    let finf_start = ffnt::HEADER_SIZE;
    c.magic(finf_start, tag::FINF);
    if let Some(stored) = c.u32(finf_start + 4) {
        if usize::try_from(stored) != Ok(finf::HEADER_SIZE) {
            c.violations.push(Violation::SectionSize {
                offset: finf_start + 4,
                stored,
                expected: finf::HEADER_SIZE as u32,
            });
        }
    }

    // Texture glyphs.
    let tglp_start = finf_start + finf::HEADER_SIZE;
    c.magic(tglp_start, tag::TGLP);
    if let Some(stored) = c.u32(finf_start + 20) {
        c.field(finf_start + 20, stored, (tglp_start + 8) as u32);
    }

    let mut pos = tglp_start;
    if let (Some(tglp_size), Some(num_sheets), Some(sheet_size), Some(data_offset)) = (
        c.u32(tglp_start + 4),
        c.u8(tglp_start + 10),
        c.u32(tglp_start + 12),
        c.u32(tglp_start + 28),
    ) {
        let tglp_size = tglp_size as usize;
        let data_offset = data_offset as usize;
        let section_end = tglp_start + tglp_size;

        c.zeros(tglp_start + tglp::HEADER_SIZE, data_offset);

        let expected_region = usize::from(num_sheets) * sheet_size as usize;
        let actual_region = section_end.saturating_sub(data_offset);
        if expected_region != actual_region {
            c.violations.push(Violation::SheetRegion {
                offset: tglp_start,
                expected: expected_region,
                actual: actual_region,
            });
        }

        if let (Some(format), Some(width), Some(height)) = (
            c.u16(tglp_start + 18),
            c.u16(tglp_start + 24),
            c.u16(tglp_start + 26),
        ) {
            if let Some(expected) = SheetFormat::from_code(format)
                .ok()
                .and_then(|format| format.sheet_size(width, height))
            {
                if sheet_size != expected {
                    c.violations.push(Violation::SectionSize {
                        offset: tglp_start + 12,
                        stored: sheet_size,
                        expected,
                    });
                }
            }
        }

        pos = section_end;
    }

    // Width sections.
    if let Some(stored) = c.u32(finf_start + 24) {
        c.field(finf_start + 24, stored, (pos + 8) as u32);
    }
    for (i, table) in font.cwdhs.iter().enumerate() {
        let start = pos;
        c.magic(start, tag::CWDH);

        if let (Some(start_index), Some(end_index)) = (c.u16(start + 8), c.u16(start + 10)) {
            let stored = usize::from(end_index.wrapping_sub(start_index)) + 1;
            if stored != table.glyphs.len() {
                c.violations.push(Violation::GlyphCount {
                    offset: start,
                    stored,
                    decoded: table.glyphs.len(),
                });
            }
        }

        let data_len = cwdh::HEADER_SIZE + 3 * table.glyphs.len();
        let expected = long_align(start + data_len) - start;
        c.zeros(start + data_len, start + expected);
        match c.u32(start + 4) {
            Some(stored) if usize::try_from(stored) == Ok(expected) => pos = start + expected,
            Some(stored) => {
                c.violations.push(Violation::SectionSize {
                    offset: start + 4,
                    stored,
                    expected: expected as u32,
                });
                pos = start + stored as usize;
            }
            None => return c.violations,
        }
        c.aligned(pos);

        let next_expected = if i + 1 == font.cwdhs.len() { 0 } else { (pos + 8) as u32 };
        if let Some(stored) = c.u32(start + 12) {
            c.field(start + 12, stored, next_expected);
        }
    }

    // Character maps.
    if let Some(stored) = c.u32(finf_start + 28) {
        c.field(finf_start + 28, stored, (pos + 8) as u32);
    }
    for (i, table) in font.cmaps.iter().enumerate() {
        let start = pos;
        c.magic(start, tag::CMAP);

        if let Some(method) = c.u16(start + 12) {
            c.field(start + 12, u32::from(method), u32::from(table.mapping.method_code()));
        }
        if let Mapping::Scan { .. } = table.mapping {
            if let (Some(code_begin), Some(code_end)) = (c.u16(start + 8), c.u16(start + 10)) {
                if (code_begin, code_end) != (0, u16::MAX) {
                    c.violations.push(Violation::ScanRange {
                        offset: start,
                        code_begin,
                        code_end,
                    });
                }
            }
        }

        let body_len = match &table.mapping {
            Mapping::Direct { .. } => 2,
            Mapping::Table { indices } => 2 * indices.len(),
            Mapping::Scan { pairs } => 2 + 4 * pairs.len(),
        };
        let data_len = cmap::HEADER_SIZE + body_len;
        let expected = long_align(start + data_len) - start;
        c.zeros(start + data_len, start + expected);
        match c.u32(start + 4) {
            Some(stored) if usize::try_from(stored) == Ok(expected) => pos = start + expected,
            Some(stored) => {
                c.violations.push(Violation::SectionSize {
                    offset: start + 4,
                    stored,
                    expected: expected as u32,
                });
                pos = start + stored as usize;
            }
            None => return c.violations,
        }
        c.aligned(pos);

        let next_expected = if i + 1 == font.cmaps.len() { 0 } else { (pos + 8) as u32 };
        if let Some(stored) = c.u32(start + 16) {
            c.field(start + 16, stored, next_expected);
        }
    }

    // Kerning.
    if let Some(table) = &font.krng {
        let start = pos;
        c.magic(start, tag::KRNG);

        let first_count = table.table.len();
        let pair_count: usize = table.table.values().map(Vec::len).sum();
        let data_len = krng::HEADER_SIZE + 2 + 6 * first_count + 4 * pair_count;
        let expected = long_align(start + data_len) - start;
        c.zeros(start + data_len, start + expected);
        match c.u32(start + 4) {
            Some(stored) if usize::try_from(stored) == Ok(expected) => pos = start + expected,
            Some(stored) => {
                c.violations.push(Violation::SectionSize {
                    offset: start + 4,
                    stored,
                    expected: expected as u32,
                });
                pos = start + stored as usize;
            }
            None => return c.violations,
        }
        c.aligned(pos);
    }

    if pos != data.len() {
        c.violations.push(Violation::TrailingBytes { offset: pos.min(data.len()) });
    }
    c.aligned(data.len());

    c.violations
}
