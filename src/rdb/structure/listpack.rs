//! Listpack: `total:u32 LE | count:u16 LE | entries | 0xFF`.
//!
//! Запись: байт кодировки с содержимым, затем back-length (1..=5 байт) для
//! обхода справа налево. При чтении слева back-length только пропускается.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{int_to_bytes, read_bytes, read_string};

const LISTPACK_HEADER_LEN: usize = 6;
const LISTPACK_EOF: u8 = 0xFF;
const LISTPACK_UNKNOWN_COUNT: u16 = u16::MAX;

const LP_ENCODING_32BIT_STR: u8 = 0xF0;
const LP_ENCODING_16BIT_INT: u8 = 0xF1;
const LP_ENCODING_24BIT_INT: u8 = 0xF2;
const LP_ENCODING_32BIT_INT: u8 = 0xF3;
const LP_ENCODING_64BIT_INT: u8 = 0xF4;

/// Читает listpack, упакованный в RDB-строку.
pub fn read_listpack<R: Read>(r: &mut R) -> RdbResult<Vec<Bytes>> {
    parse_listpack(&read_string(r)?)
}

/// Разбирает listpack в последовательность строк; целые записи
/// возвращаются в десятичном виде.
pub fn parse_listpack(blob: &[u8]) -> RdbResult<Vec<Bytes>> {
    if blob.len() < LISTPACK_HEADER_LEN + 1 {
        return Err(RdbError::malformed_container(
            "listpack",
            format!("blob of {} bytes is shorter than header", blob.len()),
        ));
    }
    let mut c = Cursor::new(blob);
    let total = c.read_u32::<LittleEndian>()?;
    let declared = c.read_u16::<LittleEndian>()?;
    if total as usize != blob.len() {
        return Err(RdbError::malformed_container(
            "listpack",
            format!("header says {total} bytes, blob has {}", blob.len()),
        ));
    }

    let mut entries = Vec::new();
    loop {
        let enc = c.read_u8()?;
        if enc == LISTPACK_EOF {
            break;
        }
        let (value, entry_len) = read_entry(&mut c, enc)?;
        read_bytes(&mut c, backlen_size(entry_len))?;
        entries.push(value);
    }
    if c.position() as usize != blob.len() {
        return Err(RdbError::malformed_container(
            "listpack",
            format!("terminator at byte {} of {}", c.position() - 1, blob.len()),
        ));
    }

    if declared != LISTPACK_UNKNOWN_COUNT && usize::from(declared) != entries.len() {
        return Err(RdbError::malformed_container(
            "listpack",
            format!("header says {declared} entries, found {}", entries.len()),
        ));
    }
    Ok(entries)
}

/// Возвращает значение записи и её длину без back-length.
fn read_entry(
    c: &mut Cursor<&[u8]>,
    enc: u8,
) -> RdbResult<(Bytes, u64)> {
    // 0xxxxxxx: 7-битное беззнаковое
    if enc & 0x80 == 0 {
        return Ok((int_to_bytes(i64::from(enc & 0x7F)), 1));
    }
    // 10xxxxxx: строка до 63 байт
    if enc & 0xC0 == 0x80 {
        let len = u64::from(enc & 0x3F);
        return Ok((Bytes::from(read_bytes(c, len)?), 1 + len));
    }
    // 110xxxxx: 13-битное знаковое
    if enc & 0xE0 == 0xC0 {
        let raw = (i64::from(enc & 0x1F) << 8) | i64::from(c.read_u8()?);
        let v = if raw >= 1 << 12 { raw - (1 << 13) } else { raw };
        return Ok((int_to_bytes(v), 2));
    }
    // 1110xxxx: строка до 4095 байт
    if enc & 0xF0 == 0xE0 {
        let len = (u64::from(enc & 0x0F) << 8) | u64::from(c.read_u8()?);
        return Ok((Bytes::from(read_bytes(c, len)?), 2 + len));
    }
    match enc {
        LP_ENCODING_32BIT_STR => {
            let len = u64::from(c.read_u32::<LittleEndian>()?);
            Ok((Bytes::from(read_bytes(c, len)?), 5 + len))
        }
        LP_ENCODING_16BIT_INT => Ok((int_to_bytes(i64::from(c.read_i16::<LittleEndian>()?)), 3)),
        LP_ENCODING_24BIT_INT => Ok((int_to_bytes(i64::from(c.read_i24::<LittleEndian>()?)), 4)),
        LP_ENCODING_32BIT_INT => Ok((int_to_bytes(i64::from(c.read_i32::<LittleEndian>()?)), 5)),
        LP_ENCODING_64BIT_INT => Ok((int_to_bytes(c.read_i64::<LittleEndian>()?), 9)),
        other => Err(RdbError::malformed_container(
            "listpack",
            format!("unknown entry encoding {other:#04x}"),
        )),
    }
}

/// Размер back-length для записи длиной `entry_len`. Верхние границы
/// полуоткрытые, как в `lpEncodeBacklen`: 16383 байт уже требуют трёх.
pub(crate) fn backlen_size(entry_len: u64) -> u64 {
    match entry_len {
        0..=127 => 1,
        128..=16_382 => 2,
        16_383..=2_097_150 => 3,
        2_097_151..=268_435_454 => 4,
        _ => 5,
    }
}
