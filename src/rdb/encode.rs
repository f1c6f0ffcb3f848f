//! Сериализация значений в DUMP-формат.
//!
//! Кодировщик пишет только канонические несжатые представления (plain
//! string/list/set/zset2/hash), поэтому ни одна операция не может завершиться
//! ошибкой. Пакет завершается футером: версия (u16 LE) и CRC-64 (u64 LE) по
//! всем предыдущим байтам.

use bytes::{BufMut, Bytes, BytesMut};
use crc::{Crc, CRC_64_REDIS};

use super::tags::{
    RdbType, FLOAT_NAN, FLOAT_NEG_INF, FLOAT_POS_INF, RDB_32BITLEN, RDB_64BITLEN, RDB_VERSION,
};

/// CRC-64/Jones в варианте Redis (reflected, init 0).
pub const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_REDIS);

/// Контрольная сумма DUMP-пакета.
pub fn crc64(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}

/// Самый длинный литерал legacy-float в десятичной записи; `{:e}` для
/// f64 всегда короче.
const MAX_FLOAT_LITERAL: usize = 32;

/// Буфер, в который последовательно пишутся части одного пакета.
#[derive(Debug, Default)]
pub struct DumpEncoder {
    buf: BytesMut,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl DumpEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Кодировщик поверх переиспользуемого буфера (например, из
    /// `BufferPool`). Содержимое буфера очищается.
    pub fn with_buffer(mut buf: BytesMut) -> Self {
        buf.clear();
        Self { buf }
    }

    pub fn write_type(
        &mut self,
        tag: RdbType,
    ) {
        self.buf.put_u8(tag.as_byte());
    }

    /// Длина в кратчайшей из форм 6/14/32/64 бит.
    pub fn write_length(
        &mut self,
        len: u64,
    ) {
        if len < 1 << 6 {
            self.buf.put_u8(len as u8);
        } else if len < 1 << 14 {
            self.buf.put_u8(0x40 | (len >> 8) as u8);
            self.buf.put_u8((len & 0xFF) as u8);
        } else if len <= u64::from(u32::MAX) {
            self.buf.put_u8(RDB_32BITLEN);
            self.buf.put_u32(len as u32);
        } else {
            self.buf.put_u8(RDB_64BITLEN);
            self.buf.put_u64(len);
        }
    }

    /// Обычная строка с префиксом длины, без целочисленных кодировок и LZF.
    pub fn write_string(
        &mut self,
        s: &[u8],
    ) {
        self.write_length(s.len() as u64);
        self.buf.put_slice(s);
    }

    /// Legacy-float: сентинелы для NaN/±inf, иначе ASCII-литерал. Длинные
    /// литералы (`1e300` в десятичной записи) пишутся в экспоненциальной
    /// форме, чтобы длина уместилась в байт и не совпала с сентинелом.
    pub fn write_float(
        &mut self,
        v: f64,
    ) {
        if v.is_nan() {
            self.buf.put_u8(FLOAT_NAN);
        } else if v == f64::INFINITY {
            self.buf.put_u8(FLOAT_POS_INF);
        } else if v == f64::NEG_INFINITY {
            self.buf.put_u8(FLOAT_NEG_INF);
        } else {
            let mut literal = v.to_string();
            if literal.len() > MAX_FLOAT_LITERAL {
                literal = format!("{v:e}");
            }
            self.buf.put_u8(literal.len() as u8);
            self.buf.put_slice(literal.as_bytes());
        }
    }

    pub fn write_double(
        &mut self,
        v: f64,
    ) {
        self.buf.put_f64_le(v);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Дописывает футер и возвращает готовый пакет.
    pub fn finish(mut self) -> Bytes {
        self.buf.put_u16_le(RDB_VERSION);
        let checksum = crc64(&self.buf);
        self.buf.put_u64_le(checksum);
        self.buf.freeze()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::rdb::structure::{read_float, read_length};

    /// Тест проверяет контрольное значение CRC-64/Jones из описания Redis.
    #[test]
    fn test_crc64_check_value() {
        assert_eq!(crc64(b"123456789"), 0xe9c6d914c4b8d9ca);
    }

    #[test]
    fn test_length_forms_roundtrip_through_reader() {
        for len in [0u64, 63, 64, 16_383, 16_384, u64::from(u32::MAX), 1 << 40] {
            let mut enc = DumpEncoder::new();
            enc.write_length(len);
            let bytes = enc.buf.clone();
            let mut c = Cursor::new(&bytes[..]);
            assert_eq!(read_length(&mut c).unwrap(), len);
            assert_eq!(c.position() as usize, bytes.len());
        }
    }

    #[test]
    fn test_length_byte_layout() {
        let mut enc = DumpEncoder::new();
        enc.write_length(300);
        assert_eq!(&enc.buf[..], &[0x41, 0x2C]);

        let mut enc = DumpEncoder::new();
        enc.write_length(70_000);
        assert_eq!(&enc.buf[..], &[0x80, 0x00, 0x01, 0x11, 0x70]);
    }

    #[test]
    fn test_float_sentinels_and_literal() {
        for v in [1.5, -2.0, f64::INFINITY, f64::NEG_INFINITY, 0.1] {
            let mut enc = DumpEncoder::new();
            enc.write_float(v);
            let bytes = enc.buf.clone();
            assert_eq!(read_float(&mut Cursor::new(&bytes[..])).unwrap(), v);
        }
        let mut enc = DumpEncoder::new();
        enc.write_float(f64::NAN);
        assert_eq!(&enc.buf[..], &[253]);
    }

    /// Тест проверяет, что очень большие и очень маленькие значения
    /// читаются обратно точно, а байт длины не уходит в сентинелы.
    #[test]
    fn test_float_extreme_magnitudes() {
        for v in [1e300, -1e300, f64::MAX, f64::MIN_POSITIVE, 5e-324, 123456.789e200] {
            let mut enc = DumpEncoder::new();
            enc.write_float(v);
            let bytes = enc.buf.clone();
            assert!(usize::from(bytes[0]) <= MAX_FLOAT_LITERAL, "{v}: {}", bytes[0]);
            assert_eq!(usize::from(bytes[0]), bytes.len() - 1);
            assert_eq!(read_float(&mut Cursor::new(&bytes[..])).unwrap(), v);
        }
    }

    /// Тест проверяет раскладку футера: версия LE и CRC по всем байтам до
    /// него.
    #[test]
    fn test_finish_appends_footer() {
        let mut enc = DumpEncoder::new();
        enc.write_type(RdbType::String);
        enc.write_string(b"hi");
        let payload = enc.finish();

        assert_eq!(payload.len(), 4 + 10);
        assert_eq!(&payload[..4], b"\x00\x02hi");
        assert_eq!(&payload[4..6], &RDB_VERSION.to_le_bytes());
        let crc = u64::from_le_bytes(payload[6..].try_into().unwrap());
        assert_eq!(crc, crc64(&payload[..6]));
    }

    #[test]
    fn test_with_buffer_clears() {
        let mut buf = BytesMut::new();
        buf.put_slice(b"garbage");
        let enc = DumpEncoder::with_buffer(buf);
        assert!(enc.is_empty());
    }
}
