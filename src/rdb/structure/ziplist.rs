//! Ziplist: `zlbytes:u32 LE | zltail:u32 LE | zllen:u16 LE | entries | 0xFF`.
//!
//! Каждая запись: длина предыдущей записи (1 байт, либо `0xFE` + 4 байта),
//! затем байт кодировки и содержимое.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{int_to_bytes, read_bytes, read_string};

const ZIPLIST_HEADER_LEN: usize = 10;
const ZIPLIST_END: u8 = 0xFF;
const ZIPLIST_BIG_PREVLEN: u8 = 0xFE;
/// `zllen`, равный этому значению, означает "считать записи вручную".
const ZIPLIST_UNKNOWN_LEN: u16 = u16::MAX;

const ZIP_INT_16B: u8 = 0xC0;
const ZIP_INT_32B: u8 = 0xD0;
const ZIP_INT_64B: u8 = 0xE0;
const ZIP_INT_24B: u8 = 0xF0;
const ZIP_INT_8B: u8 = 0xFE;

/// Читает ziplist, упакованный в RDB-строку.
pub fn read_ziplist<R: Read>(r: &mut R) -> RdbResult<Vec<Bytes>> {
    parse_ziplist(&read_string(r)?)
}

/// Разбирает ziplist в последовательность строк; целые записи
/// возвращаются в десятичном виде.
pub fn parse_ziplist(blob: &[u8]) -> RdbResult<Vec<Bytes>> {
    if blob.len() < ZIPLIST_HEADER_LEN + 1 {
        return Err(RdbError::malformed_container(
            "ziplist",
            format!("blob of {} bytes is shorter than header", blob.len()),
        ));
    }
    let mut c = Cursor::new(blob);
    let total = c.read_u32::<LittleEndian>()?;
    let _tail = c.read_u32::<LittleEndian>()?;
    let declared = c.read_u16::<LittleEndian>()?;
    if total as usize != blob.len() {
        return Err(RdbError::malformed_container(
            "ziplist",
            format!("header says {total} bytes, blob has {}", blob.len()),
        ));
    }

    let mut entries = Vec::new();
    loop {
        let prev = c.read_u8()?;
        if prev == ZIPLIST_END {
            break;
        }
        if prev == ZIPLIST_BIG_PREVLEN {
            c.read_u32::<LittleEndian>()?;
        }
        entries.push(read_entry(&mut c)?);
    }
    if c.position() as usize != blob.len() {
        return Err(RdbError::malformed_container(
            "ziplist",
            format!("terminator at byte {} of {}", c.position() - 1, blob.len()),
        ));
    }

    if declared != ZIPLIST_UNKNOWN_LEN && usize::from(declared) != entries.len() {
        return Err(RdbError::malformed_container(
            "ziplist",
            format!("header says {declared} entries, found {}", entries.len()),
        ));
    }
    Ok(entries)
}

fn read_entry(c: &mut Cursor<&[u8]>) -> RdbResult<Bytes> {
    let enc = c.read_u8()?;
    let value = match enc >> 6 {
        0 => Bytes::from(read_bytes(c, u64::from(enc & 0x3F))?),
        1 => {
            let len = (u64::from(enc & 0x3F) << 8) | u64::from(c.read_u8()?);
            Bytes::from(read_bytes(c, len)?)
        }
        2 => {
            let len = c.read_u32::<BigEndian>()?;
            Bytes::from(read_bytes(c, u64::from(len))?)
        }
        _ => int_to_bytes(read_int(c, enc)?),
    };
    Ok(value)
}

fn read_int(
    c: &mut Cursor<&[u8]>,
    enc: u8,
) -> RdbResult<i64> {
    let v = match enc {
        ZIP_INT_16B => i64::from(c.read_i16::<LittleEndian>()?),
        ZIP_INT_32B => i64::from(c.read_i32::<LittleEndian>()?),
        ZIP_INT_64B => c.read_i64::<LittleEndian>()?,
        ZIP_INT_24B => i64::from(c.read_i24::<LittleEndian>()?),
        ZIP_INT_8B => i64::from(c.read_i8()?),
        // 4-битное значение прямо в байте кодировки, хранится со смещением 1
        0xF1..=0xFD => i64::from(enc & 0x0F) - 1,
        other => {
            return Err(RdbError::malformed_container(
                "ziplist",
                format!("unknown entry encoding {other:#04x}"),
            ))
        }
    };
    Ok(v)
}
