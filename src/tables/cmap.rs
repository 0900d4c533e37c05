#![deny(missing_docs)]

//! `CMAP` character map section parsing and writing.
//!
//! A font carries a chain of `CMAP` sections, each mapping a range of codepoints to glyph
//! indices using one of three encodings. Like `CWDH`, the chain links exist only on disk.

use itertools::Either;

use crate::binary::read::{ReadBinaryDep, ReadCtxt, ReadScope};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext};
use crate::binary::{long_align, U16Be, U32Be};
use crate::error::{ParseError, WriteError};
use crate::tables;
use crate::tag;

/// The number of bytes in an encoded `CMAP` header.
pub const HEADER_SIZE: usize = 20;

/// Glyph index that marks a codepoint as having no glyph. Preserved on round-trip,
/// skipped by consumers.
pub const NO_GLYPH: u16 = 0xFFFF;

/// One `CMAP` section.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Cmap {
    /// First codepoint covered by this section.
    pub code_begin: u16,
    /// Last codepoint covered by this section.
    pub code_end: u16,
    /// Reserved header field, preserved verbatim.
    pub reserved: u16,
    /// The codepoint to glyph index mapping.
    pub mapping: Mapping,
}

/// The three encodings of a `CMAP` body.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Mapping {
    /// Every codepoint in the range maps to consecutive indices starting at
    /// `character_offset`.
    ///
    /// The offset carries the running glyph count across multiple direct sections, which
    /// is why it is retained rather than re-derived.
    Direct {
        /// Index of `code_begin`'s glyph.
        character_offset: u16,
    },
    /// One index per codepoint in the range; `NO_GLYPH` marks gaps.
    Table {
        /// `indices[i]` is the glyph index of `code_begin + i`.
        indices: Vec<u16>,
    },
    /// An explicit list of `(codepoint, index)` pairs.
    Scan {
        /// The mapped pairs, in file order.
        pairs: Vec<(u16, u16)>,
    },
}

struct CmapNode {
    table: Cmap,
    next_offset: u32,
}

impl Mapping {
    /// The on-disk mapping method code.
    pub fn method_code(&self) -> u16 {
        match self {
            Mapping::Direct { .. } => 0,
            Mapping::Table { .. } => 1,
            Mapping::Scan { .. } => 2,
        }
    }

    fn body_len(&self) -> usize {
        match self {
            Mapping::Direct { .. } => 2,
            Mapping::Table { indices } => 2 * indices.len(),
            Mapping::Scan { pairs } => 2 + 4 * pairs.len(),
        }
    }
}

impl Cmap {
    /// Iterate the `(codepoint, glyph index)` pairs this section encodes.
    ///
    /// Entries with index [`NO_GLYPH`] are included so callers that need byte-exact
    /// knowledge of the section can see them; most callers filter them out.
    pub fn entries(&self) -> impl Iterator<Item = (u16, u16)> + '_ {
        let code_begin = self.code_begin;
        match &self.mapping {
            Mapping::Direct { character_offset } => {
                let offset = *character_offset;
                Either::Left((code_begin..=self.code_end).map(move |code| {
                    (code, (code - code_begin).wrapping_add(offset))
                }))
            }
            Mapping::Table { indices } => {
                Either::Right(Either::Left(indices.iter().enumerate().map(
                    move |(i, &index)| (code_begin.wrapping_add(i as u16), index),
                )))
            }
            Mapping::Scan { pairs } => Either::Right(Either::Right(pairs.iter().copied())),
        }
    }
}

impl<'b> ReadBinaryDep<'b> for CmapNode {
    /// Absolute file offset of the start of the section.
    type Args = usize;
    type HostType = CmapNode;

    fn read_dep(ctxt: &mut ReadCtxt<'b>, section_start: usize) -> Result<CmapNode, ParseError> {
        let section_size = tables::read_section_header(ctxt, tag::CMAP)?;
        let code_begin = ctxt.read_u16be()?;
        let code_end = ctxt.read_u16be()?;
        let method = ctxt.read_u16be()?;
        let reserved = ctxt.read_u16be()?;
        let next_offset = ctxt.read_u32be()?;
        ctxt.check(code_end >= code_begin)?;

        let mapping = match method {
            0 => Mapping::Direct {
                character_offset: ctxt.read_u16be()?,
            },
            1 => {
                let count = usize::from(code_end - code_begin) + 1;
                Mapping::Table {
                    indices: ctxt.read_array::<U16Be>(count)?.to_vec(),
                }
            }
            2 => {
                let count = usize::from(ctxt.read_u16be()?);
                Mapping::Scan {
                    pairs: ctxt.read_array::<(U16Be, U16Be)>(count)?.to_vec(),
                }
            }
            _ => return Err(ParseError::UnknownMappingMethod(method)),
        };

        // Padding runs to the next 4-byte boundary of the file, not of the section.
        let data_end = section_start + HEADER_SIZE + mapping.body_len();
        let padding = long_align(data_end) - data_end;
        ctxt.check_size(
            usize::try_from(section_size)? == HEADER_SIZE + mapping.body_len() + padding,
        )?;
        if !ctxt.read_slice(padding)?.iter().all(|&b| b == 0) {
            return Err(ParseError::PaddingNotZero);
        }

        Ok(CmapNode {
            table: Cmap {
                code_begin,
                code_end,
                reserved,
                mapping,
            },
            next_offset,
        })
    }
}

/// Read the chain of character map sections starting at `first_offset` (in the on-disk
/// "+8" form). Returns the sections and the file offset at which the last one ends.
pub(crate) fn read_chain<'a>(
    scope: &ReadScope<'a>,
    first_offset: u32,
) -> Result<(Vec<Cmap>, usize), ParseError> {
    let mut tables = Vec::new();
    let mut offset = usize::try_from(first_offset)?;
    let mut end = 0;

    while offset != 0 {
        let start = offset.checked_sub(8).ok_or(ParseError::BadOffset)?;
        let node = scope.offset(start).read_dep::<CmapNode>(start)?;
        end = long_align(start + HEADER_SIZE + node.table.mapping.body_len());
        tables.push(node.table);

        let next = usize::try_from(node.next_offset)?;
        if next != 0 && next <= offset {
            return Err(ParseError::BadOffset);
        }
        offset = next;
    }

    Ok((tables, end))
}

impl<'a> WriteBinaryDep<&'a Cmap> for Cmap {
    /// This node's offset in the "+8" form and whether it terminates the chain.
    type Args = (u32, bool);
    /// The offset written into `next_offset`.
    type Output = u32;

    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        cmap: &Cmap,
        (start_offset, is_last): (u32, bool),
    ) -> Result<u32, WriteError> {
        let section_start = usize::try_from(start_offset)?
            .checked_sub(8)
            .ok_or(WriteError::BadValue)?;
        let data_end = section_start + HEADER_SIZE + cmap.mapping.body_len();
        let padding = long_align(data_end) - data_end;
        let section_size = u32::try_from(data_end + padding - section_start)?;
        let next_offset = if is_last { 0 } else { start_offset + section_size };

        // Scan sections nominally cover the whole codepoint space.
        let (code_begin, code_end) = match cmap.mapping {
            Mapping::Scan { .. } => (0, NO_GLYPH),
            _ => (cmap.code_begin, cmap.code_end),
        };

        tables::write_section_header(ctxt, tag::CMAP, section_size)?;
        U16Be::write(ctxt, code_begin)?;
        U16Be::write(ctxt, code_end)?;
        U16Be::write(ctxt, cmap.mapping.method_code())?;
        U16Be::write(ctxt, cmap.reserved)?;
        U32Be::write(ctxt, next_offset)?;
        match &cmap.mapping {
            Mapping::Direct { character_offset } => U16Be::write(ctxt, *character_offset)?,
            Mapping::Table { indices } => {
                ctxt.write_iter::<U16Be, u16>(indices.iter().copied())?
            }
            Mapping::Scan { pairs } => {
                U16Be::write(ctxt, u16::try_from(pairs.len())?)?;
                for &(code, index) in pairs {
                    U16Be::write(ctxt, code)?;
                    U16Be::write(ctxt, index)?;
                }
            }
        }
        ctxt.write_zeros(padding)?;

        Ok(next_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::write::WriteBuffer;

    #[test]
    fn test_direct_mapping() {
        #[rustfmt::skip]
        let section = [
            b'C', b'M', b'A', b'P', 0x00, 0x00, 0x00, 0x18, // section size 24
            0x00, 0x20, 0x00, 0x7E, // codes 32..=126
            0x00, 0x00, 0x00, 0x00, // method 0, reserved
            0x00, 0x00, 0x00, 0x00, // next offset 0
            0x00, 0x00, // character offset 0
            0x00, 0x00, // padding
        ];
        let (cmaps, end) = read_chain(&ReadScope::new(&section), 8).unwrap();
        assert_eq!(end, section.len());
        let cmap = &cmaps[0];
        assert_eq!(cmap.entries().count(), 95);
        assert_eq!(cmap.entries().find(|&(code, _)| code == 97), Some((97, 65)));

        let mut ctxt = WriteBuffer::new();
        Cmap::write_dep(&mut ctxt, cmap, (8, true)).unwrap();
        assert_eq!(ctxt.bytes(), &section);
    }

    #[test]
    fn test_scan_mapping_preserves_no_glyph() {
        #[rustfmt::skip]
        let section = [
            b'C', b'M', b'A', b'P', 0x00, 0x00, 0x00, 0x24, // section size 36
            0x00, 0x00, 0xFF, 0xFF, // codes 0..=65535
            0x00, 0x02, 0x00, 0x00, // method 2, reserved
            0x00, 0x00, 0x00, 0x00, // next offset 0
            0x00, 0x03, // three pairs
            0x00, 0x41, 0x00, 0x00,
            0x00, 0x42, 0x00, 0x01,
            0x00, 0x43, 0xFF, 0xFF,
            0x00, 0x00, // padding
        ];
        let (cmaps, _) = read_chain(&ReadScope::new(&section), 8).unwrap();
        let cmap = &cmaps[0];
        let mapped: Vec<_> = cmap
            .entries()
            .filter(|&(_, index)| index != NO_GLYPH)
            .collect();
        assert_eq!(mapped, vec![(0x41, 0), (0x42, 1)]);

        // The 0xFFFF entry must survive re-encoding.
        let mut ctxt = WriteBuffer::new();
        Cmap::write_dep(&mut ctxt, cmap, (8, true)).unwrap();
        assert_eq!(ctxt.bytes(), &section);
    }

    #[test]
    fn test_table_mapping() {
        let cmap = Cmap {
            code_begin: 0x30,
            code_end: 0x32,
            reserved: 0,
            mapping: Mapping::Table {
                indices: vec![5, NO_GLYPH, 6],
            },
        };
        let entries: Vec<_> = cmap.entries().collect();
        assert_eq!(entries, vec![(0x30, 5), (0x31, NO_GLYPH), (0x32, 6)]);

        let mut ctxt = WriteBuffer::new();
        Cmap::write_dep(&mut ctxt, &cmap, (8, true)).unwrap();
        let (decoded, _) = read_chain(&ReadScope::new(ctxt.bytes()), 8).unwrap();
        assert_eq!(decoded[0], cmap);
    }

    #[test]
    fn test_rejects_unknown_method() {
        #[rustfmt::skip]
        let section = [
            b'C', b'M', b'A', b'P', 0x00, 0x00, 0x00, 0x18,
            0x00, 0x20, 0x00, 0x7E,
            0x00, 0x03, 0x00, 0x00, // method 3 does not exist
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(
            read_chain(&ReadScope::new(&section), 8),
            Err(ParseError::UnknownMappingMethod(3))
        );
    }
}
