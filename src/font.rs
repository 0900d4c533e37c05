#![deny(missing_docs)]

//! The decoded font aggregate and whole-file assembly.
//!
//! Absolute offsets and section sizes exist only on disk: decoding discards them (after
//! validation) and encoding recomputes every one from the sections actually written, so a
//! font whose sections changed size still serialises consistently.

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::binary::read::ReadScope;
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteBuffer, WriteContext};
use crate::error::{ParseError, WriteError};
use crate::tables::cmap::{self, Cmap, NO_GLYPH};
use crate::tables::cwdh::{self, Cwdh};
use crate::tables::ffnt::{self, Ffnt};
use crate::tables::finf::{self, Finf};
use crate::tables::krng::{self, Krng};
use crate::tables::tglp::Tglp;

/// Absolute file offset of the `TGLP` section.
const TGLP_START: usize = ffnt::HEADER_SIZE + finf::HEADER_SIZE;

/// A decoded BFFNT font.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    /// File header.
    pub ffnt: Ffnt,
    /// Font info section.
    pub finf: Finf,
    /// Texture glyph section.
    pub tglp: Tglp,
    /// Width sections, in chain order. Never empty.
    pub cwdhs: Vec<Cwdh>,
    /// Character map sections, in chain order. Never empty.
    pub cmaps: Vec<Cmap>,
    /// Kerning section, if the font has one.
    pub krng: Option<Krng>,
    index_lookup: FxHashMap<u16, usize>,
}

impl Font {
    /// Assemble a font from its sections, deriving the codepoint lookup.
    pub fn new(
        ffnt: Ffnt,
        finf: Finf,
        tglp: Tglp,
        cwdhs: Vec<Cwdh>,
        cmaps: Vec<Cmap>,
        krng: Option<Krng>,
    ) -> Font {
        let index_lookup = build_index_lookup(&cmaps);
        Font {
            ffnt,
            finf,
            tglp,
            cwdhs,
            cmaps,
            krng,
            index_lookup,
        }
    }

    /// Decode a font from the bytes of a BFFNT file.
    pub fn decode(data: &[u8]) -> Result<Font, ParseError> {
        let scope = ReadScope::new(data);
        let ffnt = scope.read::<Ffnt>()?;
        if usize::try_from(ffnt.total_file_size)? != data.len() {
            return Err(ParseError::SizeMismatch);
        }

        let finf = scope.offset(ffnt::HEADER_SIZE).read::<Finf>()?;
        if usize::try_from(finf.tglp_offset)? != TGLP_START + 8 {
            return Err(ParseError::BadOffset);
        }
        let tglp = scope.offset(TGLP_START).read_dep::<Tglp>(TGLP_START)?;

        let (cwdhs, _) = cwdh::read_chain(&scope, finf.cwdh_offset)?;
        let (cmaps, cmap_end) = cmap::read_chain(&scope, finf.cmap_offset)?;
        if cwdhs.is_empty() || cmaps.is_empty() {
            return Err(ParseError::BadOffset);
        }

        let krng = match krng::locate(data, cmap_end) {
            Some(position) => Some(scope.offset(position).read_dep::<Krng>(position)?),
            None => None,
        };

        Ok(Font::new(ffnt, finf, tglp, cwdhs, cmaps, krng))
    }

    /// Serialise the font, recomputing every offset, section size, and the total file
    /// size. On error nothing is returned; there is no partial output.
    pub fn encode(&self) -> Result<Vec<u8>, WriteError> {
        if self.cwdhs.is_empty() || self.cmaps.is_empty() {
            return Err(WriteError::BadValue);
        }

        let mut ctxt = WriteBuffer::new();
        let total_file_size = Ffnt::write(&mut ctxt, &self.ffnt)?;
        let finf_offsets = Finf::write(&mut ctxt, &self.finf)?;

        let tglp_start = ctxt.bytes_written();
        Tglp::write_dep(&mut ctxt, &self.tglp, tglp_start)?;

        let cwdh_start = ctxt.bytes_written();
        let mut offset = u32::try_from(cwdh_start + 8)?;
        for (i, table) in self.cwdhs.iter().enumerate() {
            let is_last = i + 1 == self.cwdhs.len();
            offset = Cwdh::write_dep(&mut ctxt, table, (offset, is_last))?;
        }

        let cmap_start = ctxt.bytes_written();
        let mut offset = u32::try_from(cmap_start + 8)?;
        for (i, table) in self.cmaps.iter().enumerate() {
            let is_last = i + 1 == self.cmaps.len();
            offset = Cmap::write_dep(&mut ctxt, table, (offset, is_last))?;
        }

        if let Some(krng) = &self.krng {
            let krng_start = ctxt.bytes_written();
            Krng::write_dep(&mut ctxt, krng, krng_start)?;
        }

        let file_size = u32::try_from(ctxt.bytes_written())?;
        ctxt.write_placeholder(total_file_size, file_size)?;
        ctxt.write_placeholder(finf_offsets.tglp, u32::try_from(tglp_start + 8)?)?;
        ctxt.write_placeholder(finf_offsets.cwdh, u32::try_from(cwdh_start + 8)?)?;
        ctxt.write_placeholder(finf_offsets.cmap, u32::try_from(cmap_start + 8)?)?;

        Ok(ctxt.into_inner())
    }

    /// Uniformly scale the font's metrics, cell and sheet dimensions, and kerning values.
    ///
    /// The existing sheets are resampled as stand-ins; callers substituting
    /// higher-resolution sheets should replace [`Tglp::sheets`] before encoding.
    pub fn upscale(&mut self, scale: f64) -> Result<(), WriteError> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(WriteError::BadValue);
        }

        self.finf.upscale(scale)?;
        self.tglp.upscale(scale)?;
        for table in &mut self.cwdhs {
            table.upscale(scale)?;
        }
        if let Some(krng) = &mut self.krng {
            krng.upscale(scale)?;
        }

        Ok(())
    }

    /// All mapped `(codepoint, glyph index)` pairs, ascending by index.
    pub fn glyphs_in_index_order(&self) -> Vec<(u16, u16)> {
        self.cmaps
            .iter()
            .flat_map(|table| table.entries())
            .filter(|&(_, index)| index != NO_GLYPH)
            .sorted_by_key(|&(_, index)| index)
            .collect()
    }

    /// Position of `codepoint`'s glyph within [`Font::glyphs_in_index_order`], which is
    /// also its position within the concatenated width sections.
    pub fn slot_of(&self, codepoint: u16) -> Option<usize> {
        self.index_lookup.get(&codepoint).copied()
    }
}

fn build_index_lookup(cmaps: &[Cmap]) -> FxHashMap<u16, usize> {
    cmaps
        .iter()
        .flat_map(|table| table.entries())
        .filter(|&(_, index)| index != NO_GLYPH)
        .sorted_by_key(|&(_, index)| index)
        .enumerate()
        .map(|(slot, (codepoint, _))| (codepoint, slot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::cmap::Mapping;

    fn cmap(code_begin: u16, code_end: u16, mapping: Mapping) -> Cmap {
        Cmap {
            code_begin,
            code_end,
            reserved: 0,
            mapping,
        }
    }

    #[test]
    fn test_glyph_order_spans_cmaps() {
        let cmaps = vec![
            cmap(0x40, 0x41, Mapping::Direct { character_offset: 2 }),
            cmap(0x30, 0x31, Mapping::Table { indices: vec![0, NO_GLYPH] }),
            cmap(0, NO_GLYPH, Mapping::Scan { pairs: vec![(0x60, 1), (0x61, NO_GLYPH)] }),
        ];
        let lookup = build_index_lookup(&cmaps);

        // Indices 0, 1, 2, 3 come from codepoints 0x30, 0x60, 0x40, 0x41.
        assert_eq!(lookup.get(&0x30), Some(&0));
        assert_eq!(lookup.get(&0x60), Some(&1));
        assert_eq!(lookup.get(&0x40), Some(&2));
        assert_eq!(lookup.get(&0x41), Some(&3));
        assert_eq!(lookup.get(&0x31), None);
        assert_eq!(lookup.get(&0x61), None);
    }
}
