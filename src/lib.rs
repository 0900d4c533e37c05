#![warn(rust_2018_idioms)]

//! # BFFNT bitmap font codec
//!
//! A decoder, encoder, and upscaler for the Nintendo Wii U's BFFNT bitmap font
//! container, written entirely in Rust.
//!
//! A BFFNT file is a chain of sections: an `FFNT` file header, `FINF` font info, a `TGLP`
//! block holding GPU-tiled glyph sheets, linked lists of `CWDH` width tables and `CMAP`
//! character maps, and an optional `KRNG` kerning table. The sections reference each other
//! through absolute byte offsets, so any edit that changes a section's size reshapes the
//! whole file; [`Font::encode`] recomputes every offset from scratch and an untouched font
//! round-trips byte for byte.
//!
//! ## Features
//!
//! * **Parse** BFFNT files into an owned [`Font`] model, deswizzling the glyph sheets out
//!   of the GX2 macro-tiled layout into ordinary top-down bitmaps.
//! * **Serialise** a [`Font`] back to bytes, byte-exact for unmodified fonts.
//! * **Upscale** a font's metrics and sheet dimensions by a uniform factor
//!   ([`Font::upscale`]) so higher-resolution glyph sheets can be substituted.
//! * **Verify** a buffer against its decoded model ([`verify::verify`]), collecting every
//!   structural violation instead of stopping at the first.
//!
//! Rasterising replacement glyph sheets, reading and writing files, and PNG export are
//! left to callers.
//!
//! ## Example
//!
//! ```no_run
//! use bffnt::Font;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("Normal_00.bffnt")?;
//! let mut font = Font::decode(&data)?;
//! font.upscale(2.0)?;
//! std::fs::write("Normal_00_2x.bffnt", font.encode()?)?;
//! # Ok(())
//! # }
//! ```

pub mod binary;
pub mod error;
pub mod font;
pub mod sheet;
pub mod size;
pub mod swizzle;
pub mod tables;
pub mod tag;
pub mod verify;

pub use font::Font;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
