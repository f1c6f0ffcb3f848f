//! Фреймы протокола RESP2.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

/// Один фрейм RESP2.
///
/// `Bulk(None)` и `Array(None)` — nil-ответы (`$-1` и `*-1`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespFrame {
    Simple(String),
    Error(String),
    Integer(i64),
    Bulk(Option<Bytes>),
    Array(Option<Vec<RespFrame>>),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RespFrame {
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Self::Bulk(Some(data.into()))
    }

    /// Массив bulk-строк: так по сети передаётся любая команда.
    pub fn command<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        Self::Array(Some(args.into_iter().map(Self::bulk).collect()))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Bulk(None) | Self::Array(None))
    }

    /// Короткое имя вида фрейма для сообщений об ошибках.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple string",
            Self::Error(_) => "error",
            Self::Integer(_) => "integer",
            Self::Bulk(Some(_)) => "bulk string",
            Self::Bulk(None) => "nil bulk",
            Self::Array(Some(_)) => "array",
            Self::Array(None) => "nil array",
        }
    }

    /// Дописывает сериализованный фрейм в `buf`.
    pub fn encode(
        &self,
        buf: &mut BytesMut,
    ) {
        match self {
            Self::Simple(s) => {
                buf.put_u8(b'+');
                buf.put_slice(s.as_bytes());
                buf.put_slice(b"\r\n");
            }
            Self::Error(s) => {
                buf.put_u8(b'-');
                buf.put_slice(s.as_bytes());
                buf.put_slice(b"\r\n");
            }
            Self::Integer(n) => {
                buf.put_slice(format!(":{n}\r\n").as_bytes());
            }
            Self::Bulk(None) => buf.put_slice(b"$-1\r\n"),
            Self::Bulk(Some(data)) => {
                buf.put_slice(format!("${}\r\n", data.len()).as_bytes());
                buf.put_slice(data);
                buf.put_slice(b"\r\n");
            }
            Self::Array(None) => buf.put_slice(b"*-1\r\n"),
            Self::Array(Some(items)) => {
                buf.put_slice(format!("*{}\r\n", items.len()).as_bytes());
                for item in items {
                    item.encode(buf);
                }
            }
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для RespFrame
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for RespFrame {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Simple(s) => write!(f, "{s}"),
            Self::Error(s) => write!(f, "(error) {s}"),
            Self::Integer(n) => write!(f, "(integer) {n}"),
            Self::Bulk(Some(data)) => write!(f, "\"{}\"", String::from_utf8_lossy(data).escape_debug()),
            Self::Bulk(None) | Self::Array(None) => write!(f, "(nil)"),
            Self::Array(Some(items)) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
