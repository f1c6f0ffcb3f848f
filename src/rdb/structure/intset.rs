use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{int_to_bytes, read_string};

const INTSET_HEADER_LEN: usize = 8;

/// Читает intset, упакованный в RDB-строку.
pub fn read_intset<R: Read>(r: &mut R) -> RdbResult<Vec<Bytes>> {
    parse_intset(&read_string(r)?)
}

/// Разбирает intset: `encoding:u32 LE | length:u32 LE | length * encoding
/// байт LE`. Возвращает числа в десятичном виде в порядке хранения.
pub fn parse_intset(blob: &[u8]) -> RdbResult<Vec<Bytes>> {
    if blob.len() < INTSET_HEADER_LEN {
        return Err(RdbError::malformed_container(
            "intset",
            format!("blob of {} bytes is shorter than header", blob.len()),
        ));
    }
    let mut c = Cursor::new(blob);
    let width = c.read_u32::<LittleEndian>()?;
    let count = c.read_u32::<LittleEndian>()?;
    if !matches!(width, 1 | 2 | 4 | 8) {
        return Err(RdbError::malformed_container(
            "intset",
            format!("invalid integer width {width}"),
        ));
    }
    let body = (blob.len() - INTSET_HEADER_LEN) as u64;
    if u64::from(count) * u64::from(width) != body {
        return Err(RdbError::malformed_container(
            "intset",
            format!("{count} integers of {width} bytes do not fit body of {body} bytes"),
        ));
    }

    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let v = match width {
            1 => i64::from(c.read_i8()?),
            2 => i64::from(c.read_i16::<LittleEndian>()?),
            4 => i64::from(c.read_i32::<LittleEndian>()?),
            _ => c.read_i64::<LittleEndian>()?,
        };
        out.push(int_to_bytes(v));
    }
    Ok(out)
}
