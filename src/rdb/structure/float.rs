use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};
use redkit_error::{RdbError, RdbResult};

use super::read_bytes;
use crate::rdb::tags::{FLOAT_NAN, FLOAT_NEG_INF, FLOAT_POS_INF};

/// Читает legacy-float: байт длины (253/254/255 — NaN/+inf/-inf), затем
/// столько ASCII-байт десятичного литерала.
pub fn read_float<R: Read>(r: &mut R) -> RdbResult<f64> {
    let len = r.read_u8()?;
    match len {
        FLOAT_NAN => Ok(f64::NAN),
        FLOAT_POS_INF => Ok(f64::INFINITY),
        FLOAT_NEG_INF => Ok(f64::NEG_INFINITY),
        n => parse_float(&read_bytes(r, u64::from(n))?),
    }
}

/// 8 байт little-endian IEEE-754 binary64.
pub fn read_double<R: Read>(r: &mut R) -> RdbResult<f64> {
    Ok(r.read_f64::<LittleEndian>()?)
}

/// 4 байта little-endian binary32 (используется в потоке module2).
pub fn read_binary_float<R: Read>(r: &mut R) -> RdbResult<f32> {
    Ok(r.read_f32::<LittleEndian>()?)
}

/// Разбирает десятичный литерал (ASCII) в `f64`.
pub fn parse_float(raw: &[u8]) -> RdbResult<f64> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| RdbError::malformed_number("float literal is not ASCII"))?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| RdbError::malformed_number(format!("invalid float literal {text:?}")))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[test]
    fn test_float_sentinels() {
        let mut c = Cursor::new(&[253u8][..]);
        assert!(read_float(&mut c).unwrap().is_nan());
        let mut c = Cursor::new(&[254u8][..]);
        assert_eq!(read_float(&mut c).unwrap(), f64::INFINITY);
        let mut c = Cursor::new(&[255u8][..]);
        assert_eq!(read_float(&mut c).unwrap(), f64::NEG_INFINITY);
    }

    #[rstest]
    #[case(b"1.5", 1.5)]
    #[case(b"-2", -2.0)]
    #[case(b"0", 0.0)]
    #[case(b"3.1415926535897931", std::f64::consts::PI)]
    #[case(b"1e+20", 1e20)]
    fn test_float_literals(
        #[case] literal: &[u8],
        #[case] expected: f64,
    ) {
        let mut input = vec![literal.len() as u8];
        input.extend_from_slice(literal);
        let mut c = Cursor::new(input.as_slice());
        assert_eq!(read_float(&mut c).unwrap(), expected);
    }

    /// Тест проверяет, что мусор вместо литерала — ошибка, а не паника.
    #[test]
    fn test_malformed_literal() {
        let mut c = Cursor::new(&b"\x031x5"[..]);
        assert!(matches!(
            read_float(&mut c),
            Err(RdbError::MalformedNumber { .. })
        ));
        let mut c = Cursor::new(&[2u8, 0xFF, 0xFE][..]);
        assert!(matches!(
            read_float(&mut c),
            Err(RdbError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn test_read_double() {
        let bytes = (-2.5f64).to_le_bytes();
        let mut c = Cursor::new(&bytes[..]);
        assert_eq!(read_double(&mut c).unwrap(), -2.5);

        let mut c = Cursor::new(&bytes[..7]);
        assert_eq!(read_double(&mut c), Err(RdbError::TruncatedInput));
    }

    #[test]
    fn test_read_binary_float() {
        let bytes = 0.25f32.to_le_bytes();
        let mut c = Cursor::new(&bytes[..]);
        assert_eq!(read_binary_float(&mut c).unwrap(), 0.25);
    }
}
