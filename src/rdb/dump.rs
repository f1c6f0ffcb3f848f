//! Логические значения и функции `dump_*_value`.
//!
//! [`RdbValue`] — нормализованная форма, не зависящая от представления на
//! диске. Сравнение Set/Hash/ZSet не зависит от порядка, List — зависит.

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use ordered_float::OrderedFloat;
use redkit_error::{RdbError, RdbResult};

use super::{
    encode::DumpEncoder,
    tags::RdbType,
    types::{
        format_score, HashObject, ListObject, RedisCmd, RedisObject, SetObject, StringObject,
        ZSetObject,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdbValue {
    String(Bytes),
    List(Vec<Bytes>),
    Set(BTreeSet<Bytes>),
    Hash(BTreeMap<Bytes, Bytes>),
    ZSet(BTreeMap<Bytes, OrderedFloat<f64>>),
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RdbValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Hash(_) => "hash",
            Self::ZSet(_) => "zset",
        }
    }

    /// Сериализует значение в DUMP-пакет.
    pub fn dump(&self) -> Bytes {
        dump_value(self)
    }

    /// Команды записи, восстанавливающие значение под ключом `key`.
    pub fn to_commands(
        &self,
        key: &Bytes,
    ) -> Vec<RedisCmd> {
        match self {
            Self::String(v) => vec![RedisCmd::new("set", key, [v.clone()])],
            Self::List(items) => items
                .iter()
                .map(|e| RedisCmd::new("rpush", key, [e.clone()]))
                .collect(),
            Self::Set(members) => members
                .iter()
                .map(|m| RedisCmd::new("sadd", key, [m.clone()]))
                .collect(),
            Self::Hash(fields) => fields
                .iter()
                .map(|(f, v)| RedisCmd::new("hset", key, [f.clone(), v.clone()]))
                .collect(),
            Self::ZSet(entries) => entries
                .iter()
                .map(|(m, s)| RedisCmd::new("zadd", key, [format_score(s.0), m.clone()]))
                .collect(),
        }
    }
}

/// Stream и Module не имеют логического значения: `NotImplemented`.
impl TryFrom<RedisObject> for RdbValue {
    type Error = RdbError;

    fn try_from(obj: RedisObject) -> RdbResult<Self> {
        let value = match obj {
            RedisObject::String(StringObject { value, .. }) => Self::String(value),
            RedisObject::List(ListObject { entries, .. }) => Self::List(entries),
            RedisObject::Set(SetObject { members, .. }) => Self::Set(members.into_iter().collect()),
            RedisObject::Hash(HashObject { fields, .. }) => Self::Hash(fields.into_iter().collect()),
            RedisObject::ZSet(ZSetObject { entries, .. }) => Self::ZSet(
                entries
                    .into_iter()
                    .map(|(m, s)| (m, OrderedFloat(s)))
                    .collect(),
            ),
            RedisObject::Stream(_) => return Err(RdbError::NotImplemented { what: "stream" }),
            RedisObject::Module(_) => return Err(RdbError::NotImplemented { what: "module" }),
        };
        Ok(value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Функции сериализации
////////////////////////////////////////////////////////////////////////////////

pub fn dump_string_value(value: &[u8]) -> Bytes {
    let mut enc = DumpEncoder::new();
    enc.write_type(RdbType::String);
    enc.write_string(value);
    enc.finish()
}

pub fn dump_list_value<T: AsRef<[u8]>>(items: &[T]) -> Bytes {
    let mut enc = DumpEncoder::new();
    enc.write_type(RdbType::List);
    enc.write_length(items.len() as u64);
    for item in items {
        enc.write_string(item.as_ref());
    }
    enc.finish()
}

pub fn dump_set_value<T: AsRef<[u8]>>(members: &[T]) -> Bytes {
    let mut enc = DumpEncoder::new();
    enc.write_type(RdbType::Set);
    enc.write_length(members.len() as u64);
    for member in members {
        enc.write_string(member.as_ref());
    }
    enc.finish()
}

pub fn dump_hash_value<F, V>(fields: &[(F, V)]) -> Bytes
where
    F: AsRef<[u8]>,
    V: AsRef<[u8]>,
{
    let mut enc = DumpEncoder::new();
    enc.write_type(RdbType::Hash);
    enc.write_length(fields.len() as u64);
    for (field, value) in fields {
        enc.write_string(field.as_ref());
        enc.write_string(value.as_ref());
    }
    enc.finish()
}

/// ZSet всегда пишется в кодировке zset2 (score — бинарный double).
pub fn dump_zset_value<M: AsRef<[u8]>>(entries: &[(M, f64)]) -> Bytes {
    let mut enc = DumpEncoder::new();
    enc.write_type(RdbType::ZSet2);
    enc.write_length(entries.len() as u64);
    for (member, score) in entries {
        enc.write_string(member.as_ref());
        enc.write_double(*score);
    }
    enc.finish()
}

pub fn dump_value(value: &RdbValue) -> Bytes {
    match value {
        RdbValue::String(v) => dump_string_value(v),
        RdbValue::List(items) => dump_list_value(items),
        RdbValue::Set(members) => {
            let members: Vec<&Bytes> = members.iter().collect();
            dump_set_value(&members)
        }
        RdbValue::Hash(fields) => {
            let fields: Vec<(&Bytes, &Bytes)> = fields.iter().collect();
            dump_hash_value(&fields)
        }
        RdbValue::ZSet(entries) => {
            let entries: Vec<(&Bytes, f64)> = entries.iter().map(|(m, s)| (m, s.0)).collect();
            dump_zset_value(&entries)
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_layout() {
        let payload = dump_string_value(b"v");
        assert_eq!(&payload[..3], &[0x00, 0x01, b'v']);
        assert_eq!(payload.len(), 13);
    }

    #[test]
    fn test_zset_uses_zset2() {
        let payload = dump_zset_value(&[("x", 1.5)]);
        assert_eq!(payload[0], RdbType::ZSet2.as_byte());
        assert_eq!(&payload[1..4], &[0x01, 0x01, b'x']);
        assert_eq!(&payload[4..12], &1.5f64.to_le_bytes());
    }

    #[test]
    fn test_hash_layout() {
        let payload = dump_hash_value(&[("a", "1")]);
        assert_eq!(&payload[..6], &[0x04, 0x01, 0x01, b'a', 0x01, b'1']);
    }

    /// Тест проверяет, что команды RdbValue совпадают по форме с rewrite
    /// объектов.
    #[test]
    fn test_to_commands() {
        let key = Bytes::from("k");
        let value = RdbValue::Hash(BTreeMap::from([
            (Bytes::from("a"), Bytes::from("1")),
            (Bytes::from("b"), Bytes::from("2")),
        ]));
        let cmds = value.to_commands(&key);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].parts(), &["hset", "k", "a", "1"]);

        let zset = RdbValue::ZSet(BTreeMap::from([(Bytes::from("m"), OrderedFloat(-2.0))]));
        assert_eq!(zset.to_commands(&key)[0].parts(), &["zadd", "k", "-2", "m"]);
    }

    #[test]
    fn test_try_from_module_is_not_implemented() {
        let obj = RedisObject::Module(crate::rdb::types::ModuleObject {
            key: Bytes::new(),
            module_id: 0,
            skipped_values: 0,
        });
        assert_eq!(
            RdbValue::try_from(obj),
            Err(RdbError::NotImplemented { what: "module" })
        );
    }
}
