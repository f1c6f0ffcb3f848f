use std::fmt;

use bytes::Bytes;

/// Одна команда записи: имя и аргументы, например `["hset", key, field,
/// value]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RedisCmd(Vec<Bytes>);

impl RedisCmd {
    pub fn new(
        name: &'static str,
        key: &Bytes,
        args: impl IntoIterator<Item = Bytes>,
    ) -> Self {
        let mut parts = vec![Bytes::from_static(name.as_bytes()), key.clone()];
        parts.extend(args);
        Self(parts)
    }

    /// Собирает команду из уже готовых токенов.
    pub fn from_parts(parts: Vec<Bytes>) -> Self {
        Self(parts)
    }

    /// Имя команды в нижнем регистре.
    pub fn name(&self) -> String {
        self.0
            .first()
            .map(|n| String::from_utf8_lossy(n).to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Аргументы после имени (ключ — первый из них).
    pub fn args(&self) -> &[Bytes] {
        self.0.get(1..).unwrap_or(&[])
    }

    pub fn key(&self) -> Option<&Bytes> {
        self.0.get(1)
    }

    pub fn parts(&self) -> &[Bytes] {
        &self.0
    }

    pub fn into_parts(self) -> Vec<Bytes> {
        self.0
    }
}

impl fmt::Display for RedisCmd {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:?}", String::from_utf8_lossy(part))?;
        }
        Ok(())
    }
}
