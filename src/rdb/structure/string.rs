use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};

use super::{read_bytes, read_encoded_length, Length};
use crate::rdb::tags::{RDB_ENC_INT16, RDB_ENC_INT32, RDB_ENC_INT8, RDB_ENC_LZF};

/// Читает RDB-строку: обычную с префиксом длины или целое в специальной
/// форме (int8/int16/int32), которое возвращается в десятичном виде.
///
/// LZF-сжатые строки не поддерживаются.
pub fn read_string<R: Read>(r: &mut R) -> RdbResult<Bytes> {
    match read_encoded_length(r)? {
        Length::Len(n) => Ok(Bytes::from(read_bytes(r, n)?)),
        Length::Encoded(RDB_ENC_INT8) => Ok(int_to_bytes(i64::from(r.read_i8()?))),
        Length::Encoded(RDB_ENC_INT16) => Ok(int_to_bytes(i64::from(
            r.read_i16::<LittleEndian>()?,
        ))),
        Length::Encoded(RDB_ENC_INT32) => Ok(int_to_bytes(i64::from(
            r.read_i32::<LittleEndian>()?,
        ))),
        Length::Encoded(RDB_ENC_LZF) => Err(RdbError::UnsupportedEncoding {
            encoding: "lzf-string",
        }),
        Length::Encoded(other) => Err(RdbError::UnexpectedSpecialLength(other)),
    }
}

pub(crate) fn int_to_bytes(v: i64) -> Bytes {
    Bytes::from(v.to_string())
}
