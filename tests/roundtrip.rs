//! Whole-file round-trip and verification tests over a synthetic font.
//!
//! The sheet spans a whole group of four 32x16 macro tiles (the pipe and bank address
//! bits interleave a four-tile group), so the tiled address function is a bijection on the
//! buffer and sheet bytes survive the trip exactly.

use std::collections::BTreeMap;

use bffnt::error::{ParseError, WriteError};
use bffnt::sheet::{SheetFormat, SheetImage};
use bffnt::tables::cmap::{Cmap, Mapping, NO_GLYPH};
use bffnt::tables::cwdh::{Cwdh, GlyphWidths};
use bffnt::tables::ffnt::Ffnt;
use bffnt::tables::finf::Finf;
use bffnt::tables::krng::{KerningPair, Krng};
use bffnt::tables::tglp::Tglp;
use bffnt::verify::verify;
use bffnt::Font;

fn sheet_pattern() -> Vec<u8> {
    (0..64 * 32).map(|i| (i % 251) as u8).collect()
}

fn sample_font() -> Font {
    let ffnt = Ffnt {
        version: 0x0300_0000,
        total_file_size: 0, // recomputed on encode
        block_read_num: 0x0001_0000,
    };
    let finf = Finf {
        font_type: 1,
        height: 15,
        width: 13,
        ascent: 11,
        line_feed: 16,
        alter_char_index: 0,
        default_left: 0,
        default_glyph_width: 12,
        default_char_width: 13,
        encoding: 1,
        tglp_offset: 0, // recomputed on encode
        cwdh_offset: 0,
        cmap_offset: 0,
    };
    let tglp = Tglp {
        cell_width: 15,
        cell_height: 15,
        num_sheets: 1,
        max_char_width: 14,
        sheet_size: 2048,
        baseline_position: 11,
        sheet_format: SheetFormat::A8,
        num_columns: 4,
        num_rows: 2,
        sheet_width: 64,
        sheet_height: 32,
        sheet_data_offset: 96,
        sheets: vec![SheetImage::new(64, 32, sheet_pattern())],
    };
    let cwdhs = vec![Cwdh {
        start_index: 0,
        end_index: 3,
        glyphs: vec![
            GlyphWidths { left: 0, glyph_width: 6, char_width: 7 },
            GlyphWidths { left: -1, glyph_width: 10, char_width: 11 },
            GlyphWidths { left: 1, glyph_width: 9, char_width: 10 },
            GlyphWidths { left: 0, glyph_width: 8, char_width: 9 },
        ],
    }];
    let cmaps = vec![
        Cmap {
            code_begin: 0x20,
            code_end: 0x21,
            reserved: 0,
            mapping: Mapping::Direct { character_offset: 0 },
        },
        Cmap {
            code_begin: 0x41,
            code_end: 0x42,
            reserved: 0,
            mapping: Mapping::Table { indices: vec![2, NO_GLYPH] },
        },
        Cmap {
            code_begin: 0,
            code_end: 0xFFFF,
            reserved: 0,
            mapping: Mapping::Scan { pairs: vec![(0x58, 3), (0x59, NO_GLYPH)] },
        },
    ];
    let mut table = BTreeMap::new();
    table.insert(0x41, vec![KerningPair { second: 0x58, value: -2 }]);
    table.insert(0x4C, vec![KerningPair { second: 0x54, value: -4 }]);
    let krng = Krng { table };

    Font::new(ffnt, finf, tglp, cwdhs, cmaps, Some(krng))
}

#[test]
fn encode_layout() {
    let encoded = sample_font().encode().unwrap();

    // FFNT 20 | FINF 32 | TGLP 32+12+2048 | CWDH 28 | CMAP 24+24+32 | KRNG 32
    assert_eq!(encoded.len(), 2284);
    assert_eq!(&encoded[0..4], b"FFNT");
    assert_eq!(&encoded[20..24], b"FINF");
    assert_eq!(&encoded[52..56], b"TGLP");
    assert_eq!(&encoded[2144..2148], b"CWDH");
    assert_eq!(&encoded[2172..2176], b"CMAP");
    assert_eq!(&encoded[2252..2256], b"KRNG");

    // FFNT total file size and the three FINF offsets (each pointing 8 bytes in).
    assert_eq!(encoded[12..16], 2284u32.to_be_bytes());
    assert_eq!(encoded[40..44], 60u32.to_be_bytes());
    assert_eq!(encoded[44..48], 2152u32.to_be_bytes());
    assert_eq!(encoded[48..52], 2180u32.to_be_bytes());
}

#[test]
fn byte_exact_round_trip() {
    let encoded = sample_font().encode().unwrap();
    let decoded = Font::decode(&encoded).unwrap();
    assert_eq!(decoded.encode().unwrap(), encoded);
}

#[test]
fn decode_recovers_sections() {
    let font = sample_font();
    let encoded = font.encode().unwrap();
    let decoded = Font::decode(&encoded).unwrap();

    assert_eq!(decoded.ffnt.total_file_size, 2284);
    assert_eq!(decoded.ffnt.block_read_num, font.ffnt.block_read_num);
    assert_eq!(decoded.tglp.sheets, font.tglp.sheets);
    assert_eq!(decoded.cwdhs, font.cwdhs);
    assert_eq!(decoded.cmaps, font.cmaps);
    assert_eq!(decoded.krng, font.krng);
}

#[test]
fn verifier_accepts_encoded_font() {
    let encoded = sample_font().encode().unwrap();
    let decoded = Font::decode(&encoded).unwrap();
    assert_eq!(verify(&encoded, &decoded), vec![]);
}

#[test]
fn verifier_reports_corruption() {
    let mut encoded = sample_font().encode().unwrap();
    let decoded = Font::decode(&encoded).unwrap();

    encoded[90] = 1; // TGLP pre-data padding
    let violations = verify(&encoded, &decoded);
    assert!(!violations.is_empty());
}

#[test]
fn decode_rejects_corrupt_padding() {
    let mut encoded = sample_font().encode().unwrap();
    encoded[90] = 1; // TGLP pre-data padding
    assert_eq!(Font::decode(&encoded), Err(ParseError::PaddingNotZero));
}

#[test]
fn glyph_index_order() {
    let font = sample_font();
    assert_eq!(
        font.glyphs_in_index_order(),
        vec![(0x20, 0), (0x21, 1), (0x41, 2), (0x58, 3)]
    );
    assert_eq!(font.slot_of(0x41), Some(2));
    assert_eq!(font.slot_of(0x42), None); // mapped to NO_GLYPH
    assert_eq!(font.slot_of(0x59), None);
}

#[test]
fn upscale_by_one_is_length_stable() {
    let mut font = sample_font();
    let original = font.encode().unwrap();
    font.upscale(1.0).unwrap();
    let rescaled = font.encode().unwrap();
    assert_eq!(rescaled.len(), original.len());
    assert_eq!(rescaled, original);
}

#[test]
fn upscale_by_two_doubles_metrics() {
    let mut font = sample_font();
    font.upscale(2.0).unwrap();

    assert_eq!(font.finf.height, 30);
    assert_eq!(font.finf.line_feed, 16); // preserved
    assert_eq!((font.tglp.sheet_width, font.tglp.sheet_height), (128, 64));
    assert_eq!(font.tglp.sheet_size, 8192);
    assert_eq!((font.tglp.num_columns, font.tglp.num_rows), (4, 2));
    assert_eq!(
        font.cwdhs[0].glyphs[1],
        GlyphWidths { left: -2, glyph_width: 20, char_width: 22 }
    );
    assert_eq!(font.krng.as_ref().unwrap().kern(0x41, 0x58), Some(-4));

    let encoded = font.encode().unwrap();
    let decoded = Font::decode(&encoded).unwrap();
    assert_eq!(verify(&encoded, &decoded), vec![]);
}

#[test]
fn upscale_by_fractional_factors_stays_consistent() {
    for scale in [1.1, 1.2] {
        let mut font = sample_font();
        font.upscale(scale).unwrap();
        let encoded = font.encode().unwrap();
        let decoded = Font::decode(&encoded).unwrap();
        assert_eq!(verify(&encoded, &decoded), vec![], "scale {}", scale);
    }
}

#[test]
fn upscale_overflow_is_fatal() {
    let mut font = sample_font();
    assert_eq!(font.upscale(30.0), Err(WriteError::WidthOverflow));
}

#[test]
fn upscale_rejects_nonpositive_scale() {
    let mut font = sample_font();
    assert_eq!(font.upscale(0.0), Err(WriteError::BadValue));
    assert_eq!(font.upscale(-1.0), Err(WriteError::BadValue));
}

#[test]
fn encode_requires_matching_sheets() {
    let mut font = sample_font();
    font.tglp.sheets[0] = SheetImage::new(16, 16, vec![0; 256]);
    assert_eq!(font.encode(), Err(WriteError::MissingSheetData));
}
