use std::io::Read;

use byteorder::ReadBytesExt;
use redkit_error::{RdbError, RdbResult};

/// Читает один байт.
pub fn read_byte<R: Read>(r: &mut R) -> RdbResult<u8> {
    Ok(r.read_u8()?)
}

/// Читает ровно `n` байт.
///
/// Буфер растёт по мере чтения через `Read::take`, поэтому огромная длина из
/// повреждённого пакета не приводит к выделению памяти заранее.
pub fn read_bytes<R: Read>(
    r: &mut R,
    n: u64,
) -> RdbResult<Vec<u8>> {
    let mut buf = Vec::new();
    let got = r.take(n).read_to_end(&mut buf)?;
    if (got as u64) < n {
        return Err(RdbError::TruncatedInput);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_read_byte() {
        let mut c = Cursor::new(&[7u8][..]);
        assert_eq!(read_byte(&mut c), Ok(7));
        assert_eq!(read_byte(&mut c), Err(RdbError::TruncatedInput));
    }

    /// Тест проверяет, что читается ровно `n` байт и курсор остаётся за ними.
    #[test]
    fn test_read_bytes_exact() {
        let mut c = Cursor::new(&b"abcdef"[..]);
        assert_eq!(read_bytes(&mut c, 4).unwrap(), b"abcd");
        assert_eq!(c.position(), 4);
        assert_eq!(read_bytes(&mut c, 0).unwrap(), b"");
    }

    #[test]
    fn test_read_bytes_truncated() {
        let mut c = Cursor::new(&b"abc"[..]);
        assert_eq!(read_bytes(&mut c, 4), Err(RdbError::TruncatedInput));
    }

    /// Тест проверяет, что гигантская длина не вызывает аллокацию и паники.
    #[test]
    fn test_read_bytes_huge_length() {
        let mut c = Cursor::new(&b"abc"[..]);
        assert_eq!(read_bytes(&mut c, u64::MAX), Err(RdbError::TruncatedInput));
    }
}
