#![deny(missing_docs)]

//! Glyph sheet image handling.

use crate::error::ParseError;

/// Image formats a glyph sheet can be stored in.
///
/// Only `A8` sheets can be encoded; the remaining codes are recognised so their sheets can
/// be carried through decode as raw bytes.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[allow(missing_docs)]
pub enum SheetFormat {
    Rgba8 = 0,
    Rgb8 = 1,
    Rgba5551 = 2,
    Rgb565 = 3,
    Rgba4 = 4,
    La8 = 5,
    Hilo8 = 6,
    L8 = 7,
    /// 8-bit alpha, one byte per pixel.
    A8 = 8,
    La4 = 9,
    L4 = 10,
    A4 = 11,
    Etc1 = 12,
    Etc1A4 = 13,
}

impl SheetFormat {
    /// Map an on-disk format code to a `SheetFormat`.
    pub fn from_code(code: u16) -> Result<SheetFormat, ParseError> {
        match code {
            0 => Ok(SheetFormat::Rgba8),
            1 => Ok(SheetFormat::Rgb8),
            2 => Ok(SheetFormat::Rgba5551),
            3 => Ok(SheetFormat::Rgb565),
            4 => Ok(SheetFormat::Rgba4),
            5 => Ok(SheetFormat::La8),
            6 => Ok(SheetFormat::Hilo8),
            7 => Ok(SheetFormat::L8),
            8 => Ok(SheetFormat::A8),
            9 => Ok(SheetFormat::La4),
            10 => Ok(SheetFormat::L4),
            11 => Ok(SheetFormat::A4),
            12 => Ok(SheetFormat::Etc1),
            13 => Ok(SheetFormat::Etc1A4),
            _ => Err(ParseError::BadValue),
        }
    }

    /// The on-disk format code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// The byte size of one sheet of the given dimensions, for the formats whose rule is
    /// known. ETC1 sheets have a 65536 byte floor.
    pub fn sheet_size(self, width: u16, height: u16) -> Option<u32> {
        let area = u32::from(width) * u32::from(height);
        match self {
            SheetFormat::A8 => Some(area),
            SheetFormat::Etc1 => Some(area.div_ceil(2).max(65536)),
            _ => None,
        }
    }
}

/// One page of glyph images.
///
/// For `A8` sheets `data` holds `width x height` alpha bytes in top-down row order. For
/// other formats it holds the raw deswizzled sheet bytes unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetImage {
    /// The width of the sheet in pixels.
    pub width: u16,
    /// The height of the sheet in pixels.
    pub height: u16,
    /// Pixel data.
    pub data: Box<[u8]>,
}

impl SheetImage {
    /// Wrap pixel data in a `SheetImage`.
    pub fn new(width: u16, height: u16, data: Vec<u8>) -> SheetImage {
        SheetImage {
            width,
            height,
            data: data.into_boxed_slice(),
        }
    }

    /// True when `data` is laid out as one byte per pixel of the full sheet area.
    pub fn is_pixel_addressable(&self) -> bool {
        self.data.len() == usize::from(self.width) * usize::from(self.height)
    }

    /// Return the sheet mirrored about its horizontal midline.
    ///
    /// The Wii U stores sheets bottom-up relative to conventional image coordinates, so
    /// every sheet is flipped once on decode and once on encode. Sheets whose data is not
    /// pixel addressable are returned unchanged.
    pub fn flipped_vertical(&self) -> SheetImage {
        if !self.is_pixel_addressable() {
            return self.clone();
        }

        let stride = usize::from(self.width);
        let mut data = Vec::with_capacity(self.data.len());
        for row in self.data.chunks_exact(stride).rev() {
            data.extend_from_slice(row);
        }

        SheetImage::new(self.width, self.height, data)
    }

    /// Nearest-neighbour resample to new dimensions.
    ///
    /// Used by the upscale pass to keep the container consistent until the caller installs
    /// properly rasterised replacement sheets.
    pub fn resized(&self, width: u16, height: u16) -> SheetImage {
        if !self.is_pixel_addressable() || (width, height) == (self.width, self.height) {
            return SheetImage {
                width,
                height,
                data: self.data.clone(),
            };
        }

        let (old_w, old_h) = (usize::from(self.width), usize::from(self.height));
        let (new_w, new_h) = (usize::from(width), usize::from(height));
        let mut data = Vec::with_capacity(new_w * new_h);
        for y in 0..new_h {
            let src_y = (y * old_h) / new_h;
            for x in 0..new_w {
                let src_x = (x * old_w) / new_w;
                data.push(self.data[src_y * old_w + src_x]);
            }
        }

        SheetImage::new(width, height, data)
    }
}
