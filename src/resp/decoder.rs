//! Инкрементальный декодер RESP2.
//!
//! [`RespDecoder::decode`] либо разбирает полный фрейм и сдвигает курсор за
//! него, либо возвращает `Ok(None)` и оставляет курсор на месте, если байт
//! пока не хватает. Буфер можно дополнять и повторять вызов.

use std::io::Cursor;

use bytes::Bytes;
use redkit_error::ClientError;
use tracing::trace;

use super::frame::RespFrame;

/// Максимальная длина bulk-строки (512 МБ, как в Redis).
pub const MAX_BULK_LENGTH: usize = 512 * 1024 * 1024;
/// Максимальная вложенность массивов.
pub const MAX_ARRAY_DEPTH: usize = 32;
/// Максимальная длина строки заголовка или simple-строки.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct RespDecoder {
    max_bulk_len: usize,
    max_depth: usize,
}

impl Default for RespDecoder {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RespDecoder {
    pub fn new() -> Self {
        Self {
            max_bulk_len: MAX_BULK_LENGTH,
            max_depth: MAX_ARRAY_DEPTH,
        }
    }

    pub fn with_limits(
        max_bulk_len: usize,
        max_depth: usize,
    ) -> Self {
        Self {
            max_bulk_len,
            max_depth,
        }
    }

    pub fn decode(
        &self,
        buf: &mut Cursor<&[u8]>,
    ) -> Result<Option<RespFrame>, ClientError> {
        let start = buf.position();
        match self.parse_frame(buf, 0)? {
            Some(frame) => {
                trace!(kind = frame.kind(), consumed = buf.position() - start, "resp frame decoded");
                Ok(Some(frame))
            }
            None => {
                buf.set_position(start);
                Ok(None)
            }
        }
    }

    fn parse_frame(
        &self,
        buf: &mut Cursor<&[u8]>,
        depth: usize,
    ) -> Result<Option<RespFrame>, ClientError> {
        let Some(line) = read_line(buf)? else {
            return Ok(None);
        };
        let Some((&prefix, body)) = line.split_first() else {
            return Err(protocol("empty frame header"));
        };
        match prefix {
            b'+' => Ok(Some(RespFrame::Simple(utf8(body)?))),
            b'-' => Ok(Some(RespFrame::Error(utf8(body)?))),
            b':' => Ok(Some(RespFrame::Integer(parse_int(body)?))),
            b'$' => {
                let len = parse_int(body)?;
                if len == -1 {
                    return Ok(Some(RespFrame::Bulk(None)));
                }
                if len < 0 {
                    return Err(protocol(format!("negative bulk length {len}")));
                }
                let len = len as usize;
                if len > self.max_bulk_len {
                    return Err(protocol(format!(
                        "bulk string too long ({len} > {})",
                        self.max_bulk_len
                    )));
                }
                let data = buf.get_ref();
                let pos = buf.position() as usize;
                if data.len() < pos + len + 2 {
                    return Ok(None);
                }
                if &data[pos + len..pos + len + 2] != b"\r\n" {
                    return Err(protocol("bulk string is not terminated by CRLF"));
                }
                let payload = Bytes::copy_from_slice(&data[pos..pos + len]);
                buf.set_position((pos + len + 2) as u64);
                Ok(Some(RespFrame::Bulk(Some(payload))))
            }
            b'*' => {
                if depth >= self.max_depth {
                    return Err(protocol(format!(
                        "array nesting exceeds {}",
                        self.max_depth
                    )));
                }
                let len = parse_int(body)?;
                if len == -1 {
                    return Ok(Some(RespFrame::Array(None)));
                }
                if len < 0 {
                    return Err(protocol(format!("negative array length {len}")));
                }
                let mut items = Vec::new();
                for _ in 0..len {
                    match self.parse_frame(buf, depth + 1)? {
                        Some(item) => items.push(item),
                        None => return Ok(None),
                    }
                }
                Ok(Some(RespFrame::Array(Some(items))))
            }
            other => Err(protocol(format!("unknown frame prefix 0x{other:02x}"))),
        }
    }
}

/// Строка до CRLF без самого CRLF. `None`, если CRLF ещё не пришёл.
fn read_line<'a>(buf: &mut Cursor<&'a [u8]>) -> Result<Option<&'a [u8]>, ClientError> {
    let data: &'a [u8] = *buf.get_ref();
    let start = buf.position() as usize;
    let rest = data.get(start..).unwrap_or_default();
    match rest.windows(2).position(|w| w == b"\r\n") {
        Some(end) => {
            if end > MAX_LINE_LENGTH {
                return Err(protocol("line too long"));
            }
            buf.set_position((start + end + 2) as u64);
            Ok(Some(&rest[..end]))
        }
        None if rest.len() > MAX_LINE_LENGTH => Err(protocol("line too long")),
        None => Ok(None),
    }
}

fn parse_int(body: &[u8]) -> Result<i64, ClientError> {
    std::str::from_utf8(body)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| protocol(format!("invalid integer {:?}", String::from_utf8_lossy(body))))
}

fn utf8(body: &[u8]) -> Result<String, ClientError> {
    String::from_utf8(body.to_vec()).map_err(|_| protocol("simple string is not valid UTF-8"))
}

fn protocol(reason: impl Into<String>) -> ClientError {
    ClientError::Protocol {
        reason: reason.into(),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
