//! Объектная модель RDB и диспетчеризация по тегу типа.
//!
//! Каждый логический тип умеет загрузить себя из потока по конкретному тегу
//! ([`RdbObject::load_from_buffer`]) и выразить себя последовательностью
//! команд записи ([`RdbObject::rewrite`]).

pub mod cmd;
pub mod hash;
pub mod list;
pub mod module;
pub mod set;
pub mod stream;
pub mod string;
pub mod zset;

use std::{collections::HashSet, io::Read};

use bytes::Bytes;
pub use cmd::*;
pub use hash::*;
pub use list::*;
pub use module::*;
use redkit_error::{RdbError, RdbResult};
pub use set::*;
pub use stream::*;
pub use string::*;
pub use zset::*;

use super::tags::RdbType;

/// Объект, материализуемый из RDB-потока.
pub trait RdbObject: Sized {
    /// Читает тело объекта для тега `tag`. Курсор остаётся сразу за
    /// последним байтом объекта.
    fn load_from_buffer<R: Read>(
        r: &mut R,
        key: Bytes,
        tag: RdbType,
    ) -> RdbResult<Self>;

    /// Детерминированно переписывает значение в команды записи.
    fn rewrite(&self) -> RdbResult<Vec<RedisCmd>>;

    fn key(&self) -> &Bytes;
}

/// Закрытое множество логических объектов.
#[derive(Debug, Clone, PartialEq)]
pub enum RedisObject {
    String(StringObject),
    List(ListObject),
    Set(SetObject),
    ZSet(ZSetObject),
    Hash(HashObject),
    Stream(StreamObject),
    Module(ModuleObject),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RedisObject {
    pub fn rewrite(&self) -> RdbResult<Vec<RedisCmd>> {
        match self {
            Self::String(o) => o.rewrite(),
            Self::List(o) => o.rewrite(),
            Self::Set(o) => o.rewrite(),
            Self::ZSet(o) => o.rewrite(),
            Self::Hash(o) => o.rewrite(),
            Self::Stream(o) => o.rewrite(),
            Self::Module(o) => o.rewrite(),
        }
    }

    pub fn key(&self) -> &Bytes {
        match self {
            Self::String(o) => o.key(),
            Self::List(o) => o.key(),
            Self::Set(o) => o.key(),
            Self::ZSet(o) => o.key(),
            Self::Hash(o) => o.key(),
            Self::Stream(o) => o.key(),
            Self::Module(o) => o.key(),
        }
    }

    /// Имя логического типа (как у команды `TYPE`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::ZSet(_) => "zset",
            Self::Hash(_) => "hash",
            Self::Stream(_) => "stream",
            Self::Module(_) => "module",
        }
    }
}

/// Материализует объект по тегу. Таблица диспетчеризации исчерпывающая:
/// новый вариант `RdbType` без ветки здесь не скомпилируется.
pub fn parse_object<R: Read>(
    r: &mut R,
    key: Bytes,
    tag: RdbType,
) -> RdbResult<RedisObject> {
    let obj = match tag {
        RdbType::String => RedisObject::String(StringObject::load_from_buffer(r, key, tag)?),
        RdbType::List
        | RdbType::ListZiplist
        | RdbType::ListQuicklist
        | RdbType::ListQuicklist2 => RedisObject::List(ListObject::load_from_buffer(r, key, tag)?),
        RdbType::Set | RdbType::SetIntset => {
            RedisObject::Set(SetObject::load_from_buffer(r, key, tag)?)
        }
        RdbType::ZSet | RdbType::ZSet2 | RdbType::ZSetZiplist | RdbType::ZSetListpack => {
            RedisObject::ZSet(ZSetObject::load_from_buffer(r, key, tag)?)
        }
        RdbType::Hash | RdbType::HashZipmap | RdbType::HashZiplist | RdbType::HashListpack => {
            RedisObject::Hash(HashObject::load_from_buffer(r, key, tag)?)
        }
        RdbType::StreamListpacks | RdbType::StreamListpacks2 => {
            RedisObject::Stream(StreamObject::load_from_buffer(r, key, tag)?)
        }
        RdbType::Module | RdbType::Module2 => {
            RedisObject::Module(ModuleObject::load_from_buffer(r, key, tag)?)
        }
    };
    Ok(obj)
}

/// Ошибка для тега, переданного не тому типу.
pub(crate) fn wrong_tag(
    expected: &'static str,
    tag: RdbType,
) -> RdbError {
    RdbError::TypeMismatch {
        expected,
        got: tag.encoding_name(),
    }
}

/// Разбивает упакованную последовательность на пары; нечётная длина —
/// `MalformedContainer`.
pub(crate) fn into_pairs(
    entries: Vec<Bytes>,
    container: &'static str,
) -> RdbResult<Vec<(Bytes, Bytes)>> {
    if entries.len() % 2 != 0 {
        return Err(RdbError::malformed_container(
            container,
            format!("odd number of entries: {}", entries.len()),
        ));
    }
    let mut pairs = Vec::with_capacity(entries.len() / 2);
    let mut it = entries.into_iter();
    while let (Some(a), Some(b)) = (it.next(), it.next()) {
        pairs.push((a, b));
    }
    Ok(pairs)
}

/// Поля хеша, элементы множества и zset уникальны; повтор означает
/// испорченный пакет.
pub(crate) fn ensure_unique<'a, I>(
    keys: I,
    kind: &'static str,
) -> RdbResult<()>
where
    I: IntoIterator<Item = &'a Bytes>,
{
    let mut seen = HashSet::new();
    for k in keys {
        if !seen.insert(k) {
            return Err(RdbError::malformed_container(
                kind,
                format!("duplicate entry {:?}", String::from_utf8_lossy(k)),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_into_pairs() {
        let entries = vec![
            Bytes::from_static(b"a"),
            Bytes::from_static(b"1"),
            Bytes::from_static(b"b"),
            Bytes::from_static(b"2"),
        ];
        let pairs = into_pairs(entries, "ziplist").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "b");
        assert_eq!(pairs[1].1, "2");

        let odd = vec![Bytes::from_static(b"a")];
        assert!(matches!(
            into_pairs(odd, "listpack"),
            Err(RdbError::MalformedContainer {
                container: "listpack",
                ..
            })
        ));
    }

    /// Тест проверяет, что parse_object оставляет курсор сразу за объектом.
    #[test]
    fn test_parse_object_consumes_exactly() {
        let mut c = Cursor::new(&b"\x03abcTAIL"[..]);
        let obj = parse_object(&mut c, Bytes::from_static(b"k"), RdbType::String).unwrap();
        assert_eq!(obj.type_name(), "string");
        assert_eq!(obj.key(), "k");
        assert_eq!(c.position(), 4);
    }

    #[test]
    fn test_hash_zipmap_unsupported() {
        let mut c = Cursor::new(&b"\x00"[..]);
        let err = parse_object(&mut c, Bytes::new(), RdbType::HashZipmap).unwrap_err();
        assert_eq!(
            err,
            RdbError::UnsupportedEncoding {
                encoding: "hash-zipmap"
            }
        );
    }
}
