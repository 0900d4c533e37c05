//! Utilities and constants for BFFNT section tags.
//!
//! See also the [`tag!`](../macro.tag.html) macro for creating tags from a byte string.

use std::{fmt, str};

/// Generate a 4-byte section tag from a byte string
///
/// Example:
///
/// ```
/// use bffnt::tag;
/// assert_eq!(tag!(b"FFNT"), 0x46464E54);
/// ```
#[macro_export]
macro_rules! tag {
    ($w:expr) => {
        $crate::tag::tag_from_bytes(*$w)
    };
}

/// Wrapper type for a tag that implements `Display`
///
/// Example:
///
/// ```
/// use bffnt::tag::{self, DisplayTag};
///
/// // ASCII tag comes out as a string
/// assert_eq!(&DisplayTag(tag::CWDH).to_string(), "CWDH");
/// // Non-ASCII tag comes out as hex
/// assert_eq!(&DisplayTag(0x12345678).to_string(), "0x12345678");
/// ```
#[derive(PartialEq, Eq, Clone, Copy)]
pub struct DisplayTag(pub u32);

#[doc(hidden)]
pub const fn tag_from_bytes(chars: [u8; 4]) -> u32 {
    ((chars[3] as u32) << 0)
        | ((chars[2] as u32) << 8)
        | ((chars[1] as u32) << 16)
        | ((chars[0] as u32) << 24)
}

impl fmt::Display for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.0;
        let bytes = tag.to_be_bytes();
        if bytes.iter().all(|c| c.is_ascii() && !c.is_ascii_control()) {
            let s = str::from_utf8(&bytes).unwrap(); // unwrap safe due to above check
            s.fmt(f)
        } else {
            write!(f, "0x{:08x}", tag)
        }
    }
}

impl fmt::Debug for DisplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_string().fmt(f)
    }
}

/// `FFNT`
pub const FFNT: u32 = tag!(b"FFNT");
/// `FINF`
pub const FINF: u32 = tag!(b"FINF");
/// `TGLP`
pub const TGLP: u32 = tag!(b"TGLP");
/// `CWDH`
pub const CWDH: u32 = tag!(b"CWDH");
/// `CMAP`
pub const CMAP: u32 = tag!(b"CMAP");
/// `KRNG`
pub const KRNG: u32 = tag!(b"KRNG");
