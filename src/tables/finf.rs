#![deny(missing_docs)]

//! `FINF` font info section parsing and writing.

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::write::{Placeholder, WriteBinary, WriteContext};
use crate::binary::{U16Be, U32Be, U8};
use crate::error::{ParseError, WriteError};
use crate::tables::{self, scale_ceil_u8};
use crate::tag;

/// The number of bytes in an encoded `FINF` section.
pub const HEADER_SIZE: usize = 32;

/// `FINF` font info section.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Finf {
    /// Font type discriminator.
    pub font_type: u8,
    /// Line height in pixels.
    pub height: u8,
    /// Nominal glyph width in pixels.
    pub width: u8,
    /// Distance from the top of a line to the baseline.
    pub ascent: u8,
    /// Vertical advance between lines.
    pub line_feed: u16,
    /// Glyph index substituted for unmapped characters.
    pub alter_char_index: u16,
    /// Left bearing applied when a glyph has no width entry.
    pub default_left: u8,
    /// Glyph width applied when a glyph has no width entry.
    pub default_glyph_width: u8,
    /// Character width applied when a glyph has no width entry.
    pub default_char_width: u8,
    /// Character encoding discriminator.
    pub encoding: u8,
    /// Absolute offset 8 bytes into the `TGLP` section.
    pub tglp_offset: u32,
    /// Absolute offset 8 bytes into the first `CWDH` section.
    pub cwdh_offset: u32,
    /// Absolute offset 8 bytes into the first `CMAP` section.
    pub cmap_offset: u32,
}

/// Placeholders for the three section offsets written by `Finf::write`.
///
/// The offsets are known only after the sections preceding each target have been written,
/// so the assembler fills them in at the end.
pub struct FinfOffsets {
    /// Placeholder for `tglp_offset`.
    pub tglp: Placeholder<U32Be, u32>,
    /// Placeholder for `cwdh_offset`.
    pub cwdh: Placeholder<U32Be, u32>,
    /// Placeholder for `cmap_offset`.
    pub cmap: Placeholder<U32Be, u32>,
}

impl<'b> ReadBinary<'b> for Finf {
    type HostType = Finf;

    fn read(ctxt: &mut ReadCtxt<'b>) -> Result<Finf, ParseError> {
        let section_size = tables::read_section_header(ctxt, tag::FINF)?;
        ctxt.check_size(usize::try_from(section_size)? == HEADER_SIZE)?;
        let font_type = ctxt.read_u8()?;
        let height = ctxt.read_u8()?;
        let width = ctxt.read_u8()?;
        let ascent = ctxt.read_u8()?;
        let line_feed = ctxt.read_u16be()?;
        let alter_char_index = ctxt.read_u16be()?;
        let default_left = ctxt.read_u8()?;
        let default_glyph_width = ctxt.read_u8()?;
        let default_char_width = ctxt.read_u8()?;
        let encoding = ctxt.read_u8()?;
        let tglp_offset = ctxt.read_u32be()?;
        let cwdh_offset = ctxt.read_u32be()?;
        let cmap_offset = ctxt.read_u32be()?;

        Ok(Finf {
            font_type,
            height,
            width,
            ascent,
            line_feed,
            alter_char_index,
            default_left,
            default_glyph_width,
            default_char_width,
            encoding,
            tglp_offset,
            cwdh_offset,
            cmap_offset,
        })
    }
}

impl<'a> WriteBinary<&'a Finf> for Finf {
    type Output = FinfOffsets;

    fn write<C: WriteContext>(ctxt: &mut C, finf: &Finf) -> Result<FinfOffsets, WriteError> {
        tables::write_section_header(ctxt, tag::FINF, HEADER_SIZE as u32)?;
        U8::write(ctxt, finf.font_type)?;
        U8::write(ctxt, finf.height)?;
        U8::write(ctxt, finf.width)?;
        U8::write(ctxt, finf.ascent)?;
        U16Be::write(ctxt, finf.line_feed)?;
        U16Be::write(ctxt, finf.alter_char_index)?;
        U8::write(ctxt, finf.default_left)?;
        U8::write(ctxt, finf.default_glyph_width)?;
        U8::write(ctxt, finf.default_char_width)?;
        U8::write(ctxt, finf.encoding)?;
        let tglp = ctxt.placeholder::<U32Be, u32>()?;
        let cwdh = ctxt.placeholder::<U32Be, u32>()?;
        let cmap = ctxt.placeholder::<U32Be, u32>()?;

        Ok(FinfOffsets { tglp, cwdh, cmap })
    }
}

impl Finf {
    /// Scale the font metrics by `scale`, rounding up.
    ///
    /// `line_feed` and `alter_char_index` are left untouched.
    pub fn upscale(&mut self, scale: f64) -> Result<(), WriteError> {
        self.height = scale_ceil_u8(self.height, scale)?;
        self.width = scale_ceil_u8(self.width, scale)?;
        self.ascent = scale_ceil_u8(self.ascent, scale)?;
        self.default_left = scale_ceil_u8(self.default_left, scale)?;
        self.default_glyph_width = scale_ceil_u8(self.default_glyph_width, scale)?;
        self.default_char_width = scale_ceil_u8(self.default_char_width, scale)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::binary::write::WriteBuffer;

    // The font info section of BotW's NormalS_00.bffnt.
    const NORMAL_S: [u8; HEADER_SIZE] = [
        0x46, 0x49, 0x4E, 0x46, 0x00, 0x00, 0x00, 0x20, 0x02, 0x1E, 0x18, 0x17, 0x00, 0x1E,
        0x00, 0x00, 0x00, 0x18, 0x18, 0x01, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x08, 0x20, 0x08,
        0x00, 0x08, 0x27, 0x40,
    ];

    #[test]
    fn test_read() {
        let finf = ReadScope::new(&NORMAL_S).read::<Finf>().unwrap();
        assert_eq!(finf.font_type, 2);
        assert_eq!(finf.height, 30);
        assert_eq!(finf.width, 24);
        assert_eq!(finf.ascent, 23);
        assert_eq!(finf.line_feed, 30);
        assert_eq!(finf.encoding, 1);
        assert_eq!(finf.tglp_offset, 60);
        assert_eq!(finf.cwdh_offset, 0x0008_2008);
        assert_eq!(finf.cmap_offset, 0x0008_2740);
    }

    #[test]
    fn test_round_trip() {
        let finf = ReadScope::new(&NORMAL_S).read::<Finf>().unwrap();
        let mut ctxt = WriteBuffer::new();
        let offsets = Finf::write(&mut ctxt, &finf).unwrap();
        ctxt.write_placeholder(offsets.tglp, finf.tglp_offset).unwrap();
        ctxt.write_placeholder(offsets.cwdh, finf.cwdh_offset).unwrap();
        ctxt.write_placeholder(offsets.cmap, finf.cmap_offset).unwrap();
        assert_eq!(ctxt.bytes(), &NORMAL_S);
    }

    #[test]
    fn test_upscale_preserves_line_feed() {
        let mut finf = ReadScope::new(&NORMAL_S).read::<Finf>().unwrap();
        finf.upscale(2.0).unwrap();
        assert_eq!(finf.height, 60);
        assert_eq!(finf.width, 48);
        assert_eq!(finf.ascent, 46);
        assert_eq!(finf.line_feed, 30);
        assert_eq!(finf.alter_char_index, 0);
    }
}
