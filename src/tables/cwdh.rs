#![deny(missing_docs)]

//! `CWDH` character width section parsing and writing.
//!
//! Width sections form a singly-linked chain: each node's `next_offset` points 8 bytes
//! into the following node, and 0 terminates the chain. The link fields exist only on
//! disk; in memory the chain is an ordered `Vec` and the links are recomputed on write.

use crate::binary::read::{ReadBinaryDep, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext};
use crate::binary::{long_align, I8, U16Be, U32Be, U8};
use crate::error::{ParseError, WriteError};
use crate::tables;
use crate::tag;

/// The number of bytes in an encoded `CWDH` header.
pub const HEADER_SIZE: usize = 16;

/// One `CWDH` section: horizontal metrics for a contiguous run of glyph indices.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Cwdh {
    /// Glyph index of the first entry.
    pub start_index: u16,
    /// Glyph index of the last entry.
    pub end_index: u16,
    /// Per-glyph metrics, one entry per index in `[start_index, end_index]`.
    pub glyphs: Vec<GlyphWidths>,
}

/// Horizontal metrics for one glyph.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GlyphWidths {
    /// Left spacing; may be negative.
    pub left: i8,
    /// Width of the inked part of the glyph.
    pub glyph_width: u8,
    /// Advance width.
    pub char_width: u8,
}

struct CwdhNode {
    table: Cwdh,
    next_offset: u32,
}

impl<'a> ReadFrom<'a> for GlyphWidths {
    type ReadType = (I8, U8, U8);

    fn from((left, glyph_width, char_width): (i8, u8, u8)) -> Self {
        GlyphWidths {
            left,
            glyph_width,
            char_width,
        }
    }
}

impl WriteBinary<GlyphWidths> for GlyphWidths {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, glyph: GlyphWidths) -> Result<(), WriteError> {
        I8::write(ctxt, glyph.left)?;
        U8::write(ctxt, glyph.glyph_width)?;
        U8::write(ctxt, glyph.char_width)
    }
}

impl<'b> ReadBinaryDep<'b> for CwdhNode {
    /// Absolute file offset of the start of the section.
    type Args = usize;
    type HostType = CwdhNode;

    fn read_dep(ctxt: &mut ReadCtxt<'b>, section_start: usize) -> Result<CwdhNode, ParseError> {
        let section_size = tables::read_section_header(ctxt, tag::CWDH)?;
        let start_index = ctxt.read_u16be()?;
        let end_index = ctxt.read_u16be()?;
        let next_offset = ctxt.read_u32be()?;
        ctxt.check(end_index >= start_index)?;

        let count = usize::from(end_index - start_index) + 1;
        let glyphs = ctxt.read_array::<GlyphWidths>(count)?.to_vec();

        // Padding runs to the next 4-byte boundary of the file, not of the section, so a
        // section starting off-boundary still ends on one.
        let data_end = section_start + HEADER_SIZE + 3 * count;
        let padding = long_align(data_end) - data_end;
        ctxt.check_size(usize::try_from(section_size)? == HEADER_SIZE + 3 * count + padding)?;
        if !ctxt.read_slice(padding)?.iter().all(|&b| b == 0) {
            return Err(ParseError::PaddingNotZero);
        }

        Ok(CwdhNode {
            table: Cwdh {
                start_index,
                end_index,
                glyphs,
            },
            next_offset,
        })
    }
}

impl Cwdh {
    /// Scale every glyph's metrics by `scale`, rounding up.
    pub fn upscale(&mut self, scale: f64) -> Result<(), WriteError> {
        for glyph in &mut self.glyphs {
            glyph.left = tables::scale_ceil_i8(glyph.left, scale)?;
            glyph.glyph_width = tables::scale_ceil_u8(glyph.glyph_width, scale)?;
            glyph.char_width = tables::scale_ceil_u8(glyph.char_width, scale)?;
        }

        Ok(())
    }
}

/// Read the chain of width sections starting at `first_offset` (in the on-disk "+8" form).
pub(crate) fn read_chain<'a>(
    scope: &ReadScope<'a>,
    first_offset: u32,
) -> Result<(Vec<Cwdh>, usize), ParseError> {
    let mut tables = Vec::new();
    let mut offset = usize::try_from(first_offset)?;
    let mut end = 0;

    while offset != 0 {
        let start = offset.checked_sub(8).ok_or(ParseError::BadOffset)?;
        let node = scope.offset(start).read_dep::<CwdhNode>(start)?;
        end = long_align(start + HEADER_SIZE + 3 * node.table.glyphs.len());
        tables.push(node.table);

        let next = usize::try_from(node.next_offset)?;
        // The chain must move forward through the file or it would never terminate.
        if next != 0 && next <= offset {
            return Err(ParseError::BadOffset);
        }
        offset = next;
    }

    Ok((tables, end))
}

impl<'a> WriteBinaryDep<&'a Cwdh> for Cwdh {
    /// This node's offset in the "+8" form and whether it terminates the chain.
    type Args = (u32, bool);
    /// The offset written into `next_offset`.
    type Output = u32;

    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        cwdh: &Cwdh,
        (start_offset, is_last): (u32, bool),
    ) -> Result<u32, WriteError> {
        if cwdh.glyphs.is_empty() {
            return Err(WriteError::BadValue);
        }

        let section_start = usize::try_from(start_offset)?
            .checked_sub(8)
            .ok_or(WriteError::BadValue)?;
        let data_end = section_start + HEADER_SIZE + 3 * cwdh.glyphs.len();
        let padding = long_align(data_end) - data_end;
        let section_size = u32::try_from(data_end + padding - section_start)?;
        let next_offset = if is_last { 0 } else { start_offset + section_size };

        tables::write_section_header(ctxt, tag::CWDH, section_size)?;
        U16Be::write(ctxt, 0u16)?;
        U16Be::write(ctxt, u16::try_from(cwdh.glyphs.len() - 1)?)?;
        U32Be::write(ctxt, next_offset)?;
        ctxt.write_iter::<GlyphWidths, _>(cwdh.glyphs.iter().copied())?;
        ctxt.write_zeros(padding)?;

        Ok(next_offset)
    }
}
