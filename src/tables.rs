//! BFFNT section codecs.
//!
//! Each section of the container gets its own module. The shared shape is a 4-byte magic
//! tag followed by a `u32` section size; everything after that is section specific.

use crate::binary::read::ReadCtxt;
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::U32Be;
use crate::error::{ParseError, WriteError};

pub mod cmap;
pub mod cwdh;
pub mod ffnt;
pub mod finf;
pub mod krng;
pub mod tglp;

/// Read a section's magic tag and size, checking the tag.
pub(crate) fn read_section_header(
    ctxt: &mut ReadCtxt<'_>,
    expected: u32,
) -> Result<u32, ParseError> {
    let tag = ctxt.read_u32be()?;
    if tag != expected {
        return Err(ParseError::BadMagic(tag));
    }
    Ok(ctxt.read_u32be()?)
}

/// Write a section's magic tag and size.
pub(crate) fn write_section_header<C: WriteContext>(
    ctxt: &mut C,
    tag: u32,
    section_size: u32,
) -> Result<(), WriteError> {
    U32Be::write(ctxt, tag)?;
    U32Be::write(ctxt, section_size)
}

/// Scale an unsigned metric, rounding up so glyphs are never clipped.
pub(crate) fn scale_ceil_u8(value: u8, scale: f64) -> Result<u8, WriteError> {
    let scaled = (f64::from(value) * scale).ceil();
    if (0.0..=f64::from(u8::MAX)).contains(&scaled) {
        Ok(scaled as u8)
    } else {
        Err(WriteError::WidthOverflow)
    }
}

/// Scale an unsigned 16-bit metric, rounding up.
pub(crate) fn scale_ceil_u16(value: u16, scale: f64) -> Result<u16, WriteError> {
    let scaled = (f64::from(value) * scale).ceil();
    if (0.0..=f64::from(u16::MAX)).contains(&scaled) {
        Ok(scaled as u16)
    } else {
        Err(WriteError::WidthOverflow)
    }
}

/// Scale a signed left-bearing, rounding toward positive infinity.
pub(crate) fn scale_ceil_i8(value: i8, scale: f64) -> Result<i8, WriteError> {
    let scaled = (f64::from(value) * scale).ceil();
    if (f64::from(i8::MIN)..=f64::from(i8::MAX)).contains(&scaled) {
        Ok(scaled as i8)
    } else {
        Err(WriteError::WidthOverflow)
    }
}

/// Scale a kerning value, rounding to nearest with ties away from zero.
pub(crate) fn scale_round_i16(value: i16, scale: f64) -> Result<i16, WriteError> {
    let scaled = (f64::from(value) * scale).round();
    if (f64::from(i16::MIN)..=f64::from(i16::MAX)).contains(&scaled) {
        Ok(scaled as i16)
    } else {
        Err(WriteError::WidthOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_rounding() {
        assert_eq!(scale_ceil_u8(10, 1.1), Ok(11));
        assert_eq!(scale_ceil_u8(10, 1.0), Ok(10));
        assert_eq!(scale_ceil_i8(-1, 2.0), Ok(-2));
        assert_eq!(scale_ceil_i8(-3, 1.1), Ok(-3)); // -3.3 rounds toward +inf
        assert_eq!(scale_round_i16(-1, 1.5), Ok(-2)); // ties away from zero
        assert_eq!(scale_round_i16(1, 1.5), Ok(2));
    }

    #[test]
    fn test_scale_overflow() {
        assert_eq!(scale_ceil_u8(200, 2.0), Err(WriteError::WidthOverflow));
        assert_eq!(scale_ceil_u16(40000, 2.0), Err(WriteError::WidthOverflow));
        assert_eq!(scale_ceil_i8(100, 2.0), Err(WriteError::WidthOverflow));
    }
}
