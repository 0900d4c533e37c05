#![deny(missing_docs)]

//! `KRNG` kerning section parsing and writing.
//!
//! No header-level offset points at this section; it is found by scanning for its magic
//! tag after the last `CMAP`, and many fonts simply do not have one. The body is a
//! two-level table: an index of first characters, each carrying an offset (in u16 units,
//! measured from the start of the body) to that character's list of `(second character,
//! kerning value)` pairs.

use log::debug;

use std::collections::BTreeMap;

use crate::binary::read::{ReadBinaryDep, ReadCtxt, ReadFrom};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext};
use crate::binary::{long_align, I16Be, U16Be};
use crate::error::{ParseError, WriteError};
use crate::tables::{self, scale_round_i16};
use crate::tag;

/// The number of bytes in an encoded `KRNG` header.
pub const HEADER_SIZE: usize = 8;

/// `KRNG` kerning section.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Krng {
    /// Kerning pairs keyed by the first character of the pair, ascending. The encoder
    /// relies on this ordering to reproduce sorted inputs byte for byte.
    pub table: BTreeMap<u16, Vec<KerningPair>>,
}

/// Kerning adjustment for one pair of characters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KerningPair {
    /// Second character of the pair.
    pub second: u16,
    /// Horizontal adjustment; negative values move the characters together.
    pub value: i16,
}

impl<'a> ReadFrom<'a> for KerningPair {
    type ReadType = (U16Be, I16Be);

    fn from((second, value): (u16, i16)) -> Self {
        KerningPair { second, value }
    }
}

/// Find the start of a `KRNG` section at a 4-byte aligned position at or after
/// `search_from`.
///
/// Scanning the whole buffer could false-positive on sheet bytes that happen to spell the
/// magic, so the caller passes the end of the last `CMAP` section.
pub(crate) fn locate(data: &[u8], search_from: usize) -> Option<usize> {
    let mut pos = long_align(search_from);
    while pos + 4 <= data.len() {
        if &data[pos..pos + 4] == b"KRNG" {
            debug!("KRNG found at {}", pos);
            return Some(pos);
        }
        pos += 4;
    }
    None
}

impl<'b> ReadBinaryDep<'b> for Krng {
    /// Absolute file offset of the start of the section.
    type Args = usize;
    type HostType = Krng;

    fn read_dep(ctxt: &mut ReadCtxt<'b>, section_start: usize) -> Result<Krng, ParseError> {
        let section_size = tables::read_section_header(ctxt, tag::KRNG)?;
        let body_len = usize::try_from(section_size)?
            .checked_sub(HEADER_SIZE)
            .ok_or(ParseError::SizeMismatch)?;
        let body = ctxt.read_scope(body_len)?;

        let mut bctxt = body.ctxt();
        let first_count = usize::from(bctxt.read_u16be()?);
        let firsts = bctxt.read_array::<(U16Be, U16Be)>(first_count)?.to_vec();

        let mut table = BTreeMap::new();
        let mut data_end = 2 + 4 * first_count;
        for (first_char, packed_offset) in firsts {
            let block_start = usize::from(packed_offset) * 2;
            let mut block = body.offset(block_start).ctxt();
            let pair_count = usize::from(block.read_u16be()?);
            let pairs = block.read_array::<KerningPair>(pair_count)?.to_vec();
            data_end = data_end.max(block_start + 2 + 4 * pair_count);
            table.insert(first_char, pairs);
        }

        // Padding runs to the next 4-byte boundary of the file.
        let file_data_end = section_start + HEADER_SIZE + data_end;
        let padding = long_align(file_data_end) - file_data_end;
        if body_len != data_end + padding {
            return Err(ParseError::SizeMismatch);
        }
        if !body.data()[data_end..].iter().all(|&b| b == 0) {
            return Err(ParseError::PaddingNotZero);
        }

        Ok(Krng { table })
    }
}

impl<'a> WriteBinaryDep<&'a Krng> for Krng {
    /// Absolute file offset of the start of the section.
    type Args = usize;
    type Output = ();

    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        krng: &Krng,
        section_start: usize,
    ) -> Result<(), WriteError> {
        let first_count = krng.table.len();
        let pair_count: usize = krng.table.values().map(Vec::len).sum();
        let data_len = 2 + 6 * first_count + 4 * pair_count;
        let file_data_end = section_start + HEADER_SIZE + data_len;
        let padding = long_align(file_data_end) - file_data_end;
        let section_size = u32::try_from(HEADER_SIZE + data_len + padding)?;

        tables::write_section_header(ctxt, tag::KRNG, section_size)?;
        U16Be::write(ctxt, u16::try_from(first_count)?)?;

        // Offsets are written halved; pair lists are nothing but u16s so their offsets are
        // always even, and halving doubles the table size a u16 offset can span.
        let mut block_offset = 2 + 4 * first_count;
        for (&first_char, pairs) in &krng.table {
            U16Be::write(ctxt, first_char)?;
            U16Be::write(ctxt, u16::try_from(block_offset / 2)?)?;
            block_offset += 2 + 4 * pairs.len();
        }

        for pairs in krng.table.values() {
            U16Be::write(ctxt, u16::try_from(pairs.len())?)?;
            for pair in pairs {
                U16Be::write(ctxt, pair.second)?;
                I16Be::write(ctxt, pair.value)?;
            }
        }
        ctxt.write_zeros(padding)?;

        Ok(())
    }
}

impl Krng {
    /// Look up the kerning between `first` and `second`.
    pub fn kern(&self, first: u16, second: u16) -> Option<i16> {
        self.table
            .get(&first)?
            .iter()
            .find(|pair| pair.second == second)
            .map(|pair| pair.value)
    }

    /// Scale every kerning value by `scale`, rounding to nearest with ties away from
    /// zero.
    pub fn upscale(&mut self, scale: f64) -> Result<(), WriteError> {
        for pairs in self.table.values_mut() {
            for pair in pairs {
                pair.value = scale_round_i16(pair.value, scale)?;
            }
        }

        Ok(())
    }
}
