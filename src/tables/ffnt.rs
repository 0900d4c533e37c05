#![deny(missing_docs)]

//! `FFNT` file header parsing and writing.

use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::write::{Placeholder, WriteBinary, WriteContext};
use crate::binary::{U16Be, U32Be};
use crate::error::{ParseError, WriteError};
use crate::tag;

/// The number of bytes in an encoded `FFNT` header.
pub const HEADER_SIZE: usize = 20;

/// The byte-order marker carried by every supported file.
const ENDIAN_MARKER: u16 = 0xFEFF;

/// `FFNT` file header.
///
/// The magic tag, byte-order marker, and header size are validated on read and regenerated
/// on write, so only the remaining fields are carried.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ffnt {
    /// Format version, observed to be 0x0300_0000. Preserved verbatim.
    pub version: u32,
    /// Total size in bytes of the file this header begins.
    pub total_file_size: u32,
    /// Read-ahead hint, observed to be a multiple of 65536. Preserved verbatim, never
    /// recomputed.
    pub block_read_num: u32,
}

impl<'b> ReadBinary<'b> for Ffnt {
    type HostType = Ffnt;

    fn read(ctxt: &mut ReadCtxt<'b>) -> Result<Ffnt, ParseError> {
        let tag = ctxt.read_u32be()?;
        if tag != tag::FFNT {
            return Err(ParseError::BadMagic(tag));
        }
        let endianness = ctxt.read_u16be()?;
        ctxt.check(endianness == ENDIAN_MARKER)?;
        let header_size = ctxt.read_u16be()?;
        ctxt.check_size(usize::from(header_size) == HEADER_SIZE)?;
        let version = ctxt.read_u32be()?;
        let total_file_size = ctxt.read_u32be()?;
        let block_read_num = ctxt.read_u32be()?;

        Ok(Ffnt {
            version,
            total_file_size,
            block_read_num,
        })
    }
}

impl<'a> WriteBinary<&'a Ffnt> for Ffnt {
    /// Placeholder for `total_file_size`, filled in once the whole file is written.
    type Output = Placeholder<U32Be, u32>;

    fn write<C: WriteContext>(ctxt: &mut C, ffnt: &Ffnt) -> Result<Self::Output, WriteError> {
        U32Be::write(ctxt, tag::FFNT)?;
        U16Be::write(ctxt, ENDIAN_MARKER)?;
        U16Be::write(ctxt, HEADER_SIZE as u16)?;
        U32Be::write(ctxt, ffnt.version)?;
        let total_file_size = ctxt.placeholder::<U32Be, u32>()?;
        U32Be::write(ctxt, ffnt.block_read_num)?;

        Ok(total_file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binary::read::ReadScope;
    use crate::binary::write::WriteBuffer;

    // The file header of BotW's NormalS_00.bffnt.
    const NORMAL_S: [u8; HEADER_SIZE] = [
        0x46, 0x46, 0x4E, 0x54, 0xFE, 0xFF, 0x00, 0x14, 0x03, 0x00, 0x00, 0x00, 0x00, 0x08,
        0x3A, 0x1C, 0x00, 0x09, 0x00, 0x00,
    ];

    #[test]
    fn test_read() {
        let ffnt = ReadScope::new(&NORMAL_S).read::<Ffnt>().unwrap();
        assert_eq!(ffnt.version, 0x0300_0000);
        assert_eq!(ffnt.total_file_size, 539164);
        assert_eq!(ffnt.block_read_num, 589824);
    }

    #[test]
    fn test_round_trip() {
        let ffnt = ReadScope::new(&NORMAL_S).read::<Ffnt>().unwrap();
        let mut ctxt = WriteBuffer::new();
        let placeholder = Ffnt::write(&mut ctxt, &ffnt).unwrap();
        ctxt.write_placeholder(placeholder, ffnt.total_file_size).unwrap();
        assert_eq!(ctxt.bytes(), &NORMAL_S);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = NORMAL_S;
        data[0] = b'C';
        match ReadScope::new(&data).read::<Ffnt>() {
            Err(ParseError::BadMagic(_)) => {}
            result => panic!("expected BadMagic, got {:?}", result),
        }
    }

    #[test]
    fn test_rejects_bad_endian_marker() {
        let mut data = NORMAL_S;
        data[4] = 0xFF;
        data[5] = 0xFE;
        assert_eq!(ReadScope::new(&data).read::<Ffnt>(), Err(ParseError::BadValue));
    }
}
