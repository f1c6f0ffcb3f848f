use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use redkit_error::{RdbError, RdbResult};

use crate::rdb::tags::{RDB_14BITLEN, RDB_32BITLEN, RDB_64BITLEN, RDB_6BITLEN, RDB_ENCVAL};

/// Результат чтения префикса длины.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Обычная длина или целое.
    Len(u64),
    /// Специальная форма: младшие 6 бит выбирают кодировку значения.
    Encoded(u8),
}

/// Читает длину в любой из пяти форм, включая специальную.
pub fn read_encoded_length<R: Read>(r: &mut R) -> RdbResult<Length> {
    let first = r.read_u8()?;
    match (first & 0xC0) >> 6 {
        RDB_6BITLEN => Ok(Length::Len(u64::from(first & 0x3F))),
        RDB_14BITLEN => {
            let next = r.read_u8()?;
            Ok(Length::Len((u64::from(first & 0x3F) << 8) | u64::from(next)))
        }
        RDB_ENCVAL => Ok(Length::Encoded(first & 0x3F)),
        _ => match first {
            RDB_32BITLEN => Ok(Length::Len(u64::from(r.read_u32::<BigEndian>()?))),
            RDB_64BITLEN => Ok(Length::Len(r.read_u64::<BigEndian>()?)),
            other => Err(RdbError::malformed_number(format!(
                "unknown length prefix {other:#04x}"
            ))),
        },
    }
}

/// Читает обычную длину; специальная форма здесь недопустима.
pub fn read_length<R: Read>(r: &mut R) -> RdbResult<u64> {
    match read_encoded_length(r)? {
        Length::Len(n) => Ok(n),
        Length::Encoded(enc) => Err(RdbError::UnexpectedSpecialLength(enc)),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[0x00], 0)]
    #[case(&[0x3F], 63)]
    #[case(&[0x40, 0x40], 64)]
    #[case(&[0x7F, 0xFF], 16383)]
    #[case(&[0x80, 0x00, 0x00, 0x40, 0x00], 16384)]
    #[case(&[0x80, 0xFF, 0xFF, 0xFF, 0xFF], u64::from(u32::MAX))]
    #[case(&[0x81, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00], 1 << 32)]
    fn test_read_length_forms(
        #[case] input: &[u8],
        #[case] expected: u64,
    ) {
        let mut c = Cursor::new(input);
        assert_eq!(read_length(&mut c), Ok(expected));
        assert_eq!(c.position() as usize, input.len());
    }

    #[test]
    fn test_special_form() {
        let mut c = Cursor::new(&[0xC2u8][..]);
        assert_eq!(read_encoded_length(&mut c), Ok(Length::Encoded(2)));

        let mut c = Cursor::new(&[0xC0u8][..]);
        assert_eq!(
            read_length(&mut c),
            Err(RdbError::UnexpectedSpecialLength(0))
        );
    }

    #[test]
    fn test_truncated_forms() {
        for input in [&[][..], &[0x40][..], &[0x80, 0, 0][..], &[0x81, 0][..]] {
            let mut c = Cursor::new(input);
            assert_eq!(read_length(&mut c), Err(RdbError::TruncatedInput));
        }
    }

    #[test]
    fn test_unknown_wide_prefix() {
        let mut c = Cursor::new(&[0x85u8, 0, 0, 0, 0][..]);
        assert!(matches!(
            read_length(&mut c),
            Err(RdbError::MalformedNumber { .. })
        ));
    }
}
