#![deny(missing_docs)]

//! `TGLP` texture glyph section parsing and writing.
//!
//! The section is a fixed header, a run of zero padding whose length is dictated by
//! `sheet_data_offset`, then the raw glyph sheets in the GPU tiled layout. Decoding
//! deswizzles each sheet and flips it upright; encoding reverses both steps.

use log::debug;

use crate::binary::read::{ReadBinaryDep, ReadCtxt};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext};
use crate::binary::{U16Be, U32Be, U8};
use crate::error::{ParseError, WriteError};
use crate::sheet::{SheetFormat, SheetImage};
use crate::swizzle;
use crate::tables::{self, scale_ceil_u16, scale_ceil_u8};
use crate::tag;

/// The number of bytes in an encoded `TGLP` header.
pub const HEADER_SIZE: usize = 32;

/// `TGLP` texture glyph section.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tglp {
    /// Width of one glyph cell in pixels.
    pub cell_width: u8,
    /// Height of one glyph cell in pixels.
    pub cell_height: u8,
    /// Number of glyph sheets. `sheets` must have this many entries to encode.
    pub num_sheets: u8,
    /// Widest glyph on any sheet.
    pub max_char_width: u8,
    /// Byte size of one encoded sheet.
    pub sheet_size: u32,
    /// Baseline y-position within a cell.
    pub baseline_position: u16,
    /// Pixel format of the sheets.
    pub sheet_format: SheetFormat,
    /// Glyph cells per sheet row.
    pub num_columns: u16,
    /// Glyph cell rows per sheet.
    pub num_rows: u16,
    /// Sheet width in pixels.
    pub sheet_width: u16,
    /// Sheet height in pixels.
    pub sheet_height: u16,
    /// Absolute file offset of the first sheet's data. Preserved across round-trip so the
    /// pre-data padding is stable.
    pub sheet_data_offset: u32,
    /// Decoded, upright sheet images.
    pub sheets: Vec<SheetImage>,
}

impl<'b> ReadBinaryDep<'b> for Tglp {
    /// Absolute file offset of the start of the section.
    type Args = usize;
    type HostType = Tglp;

    fn read_dep(ctxt: &mut ReadCtxt<'b>, section_start: usize) -> Result<Tglp, ParseError> {
        let section_size = tables::read_section_header(ctxt, tag::TGLP)?;
        let cell_width = ctxt.read_u8()?;
        let cell_height = ctxt.read_u8()?;
        let num_sheets = ctxt.read_u8()?;
        let max_char_width = ctxt.read_u8()?;
        let sheet_size = ctxt.read_u32be()?;
        let baseline_position = ctxt.read_u16be()?;
        let sheet_format = SheetFormat::from_code(ctxt.read_u16be()?)?;
        let num_columns = ctxt.read_u16be()?;
        let num_rows = ctxt.read_u16be()?;
        let sheet_width = ctxt.read_u16be()?;
        let sheet_height = ctxt.read_u16be()?;
        let sheet_data_offset = ctxt.read_u32be()?;

        let padding = usize::try_from(sheet_data_offset)?
            .checked_sub(section_start + HEADER_SIZE)
            .ok_or(ParseError::BadOffset)?;
        let sheet_bytes = usize::try_from(sheet_size)?;
        let data_size = usize::from(num_sheets) * sheet_bytes;
        ctxt.check_size(
            usize::try_from(section_size)? == HEADER_SIZE + padding + data_size,
        )?;
        if sheet_format == SheetFormat::A8 {
            ctxt.check_size(
                sheet_bytes == usize::from(sheet_width) * usize::from(sheet_height),
            )?;
        }

        if !ctxt.read_slice(padding)?.iter().all(|&b| b == 0) {
            return Err(ParseError::PaddingNotZero);
        }

        let mut sheets = Vec::with_capacity(usize::from(num_sheets));
        for _ in 0..num_sheets {
            let tiled = ctxt.read_slice(sheet_bytes)?;
            let linear = swizzle::deswizzle(
                u32::from(sheet_width),
                u32::from(sheet_height),
                8,
                tiled,
            );
            sheets.push(SheetImage::new(sheet_width, sheet_height, linear).flipped_vertical());
        }

        let data_start = section_start + HEADER_SIZE + padding;
        debug!(
            "TGLP header {}..{}, padding to {}, sheet data to {}",
            section_start,
            section_start + HEADER_SIZE,
            data_start,
            data_start + data_size,
        );

        Ok(Tglp {
            cell_width,
            cell_height,
            num_sheets,
            max_char_width,
            sheet_size,
            baseline_position,
            sheet_format,
            num_columns,
            num_rows,
            sheet_width,
            sheet_height,
            sheet_data_offset,
            sheets,
        })
    }
}

impl<'a> WriteBinaryDep<&'a Tglp> for Tglp {
    /// Absolute file offset of the start of the section.
    type Args = usize;
    type Output = ();

    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        tglp: &Tglp,
        section_start: usize,
    ) -> Result<(), WriteError> {
        if tglp.sheet_format != SheetFormat::A8 {
            return Err(WriteError::UnsupportedSheetFormat(tglp.sheet_format.code()));
        }
        let sheet_bytes = usize::try_from(tglp.sheet_size)?;
        if tglp.sheets.len() != usize::from(tglp.num_sheets)
            || tglp.sheets.iter().any(|sheet| {
                (sheet.width, sheet.height) != (tglp.sheet_width, tglp.sheet_height)
                    || sheet.data.len() != sheet_bytes
            })
        {
            return Err(WriteError::MissingSheetData);
        }

        let padding = usize::try_from(tglp.sheet_data_offset)?
            .checked_sub(section_start + HEADER_SIZE)
            .ok_or(WriteError::BadValue)?;
        let section_size =
            u32::try_from(HEADER_SIZE + padding + tglp.sheets.len() * sheet_bytes)?;

        tables::write_section_header(ctxt, tag::TGLP, section_size)?;
        U8::write(ctxt, tglp.cell_width)?;
        U8::write(ctxt, tglp.cell_height)?;
        U8::write(ctxt, tglp.num_sheets)?;
        U8::write(ctxt, tglp.max_char_width)?;
        U32Be::write(ctxt, tglp.sheet_size)?;
        U16Be::write(ctxt, tglp.baseline_position)?;
        U16Be::write(ctxt, tglp.sheet_format.code())?;
        U16Be::write(ctxt, tglp.num_columns)?;
        U16Be::write(ctxt, tglp.num_rows)?;
        U16Be::write(ctxt, tglp.sheet_width)?;
        U16Be::write(ctxt, tglp.sheet_height)?;
        U32Be::write(ctxt, tglp.sheet_data_offset)?;
        ctxt.write_zeros(padding)?;

        for sheet in &tglp.sheets {
            let flipped = sheet.flipped_vertical();
            let tiled = swizzle::swizzle(
                u32::from(tglp.sheet_width),
                u32::from(tglp.sheet_height),
                8,
                &flipped.data,
            );
            ctxt.write_bytes(&tiled)?;
        }

        Ok(())
    }
}

impl Tglp {
    /// Scale cell and sheet dimensions by `scale`, rounding up.
    ///
    /// The cell grid is preserved; `sheet_size` is recomputed from the new dimensions when
    /// the format has a known size rule. The existing sheets are resampled to the new
    /// dimensions as stand-ins until the caller installs properly rendered replacements.
    pub fn upscale(&mut self, scale: f64) -> Result<(), WriteError> {
        self.cell_width = scale_ceil_u8(self.cell_width, scale)?;
        self.cell_height = scale_ceil_u8(self.cell_height, scale)?;
        self.max_char_width = scale_ceil_u8(self.max_char_width, scale)?;
        self.baseline_position = scale_ceil_u16(self.baseline_position, scale)?;
        self.sheet_width = scale_ceil_u16(self.sheet_width, scale)?;
        self.sheet_height = scale_ceil_u16(self.sheet_height, scale)?;
        if let Some(sheet_size) = self.sheet_format.sheet_size(self.sheet_width, self.sheet_height)
        {
            self.sheet_size = sheet_size;
        }
        for sheet in &mut self.sheets {
            *sheet = sheet.resized(self.sheet_width, self.sheet_height);
        }

        Ok(())
    }
}
