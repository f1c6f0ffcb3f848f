//! Эталонный драйвер в памяти поверх `dashmap`.
//!
//! Значения хранятся в логической форме [`RdbValue`], поэтому `dump` и
//! `restore` работают через тот же кодек, что и миграция между серверами.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use ordered_float::OrderedFloat;
use redkit_error::{DriverError, RedkitResult};
use tracing::{debug, info};

use super::{
    replay_commands, CommandSink, CommonCmd, Db, HashCmd, KvStore, ListCmd, SetCmd, Storager,
    StringCmd, WriteBatch, ZSetCmd,
};
use crate::{
    rdb::{decode_verified_dump, dump_value, RdbValue, RedisCmd},
    utils::{BatchOp, BatchOpBuffer},
};

/// Число баз, как у Redis по умолчанию.
pub const DEFAULT_DB_COUNT: usize = 16;

#[derive(Debug, Default)]
pub struct MemoryDb {
    data: DashMap<Bytes, RdbValue>,
}

pub struct MemoryStorager {
    name: String,
    dbs: Vec<Arc<MemoryDb>>,
    opened: AtomicBool,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Копия логического значения ключа.
    pub fn value(
        &self,
        key: &[u8],
    ) -> Option<RdbValue> {
        self.data.get(key).map(|v| v.clone())
    }

    /// Применяет `f` к значению ключа, создавая его через `init`, если
    /// ключа нет. `f` возвращает `None`, если тип значения не подходит.
    fn with_value<R>(
        &self,
        key: &[u8],
        init: fn() -> RdbValue,
        f: impl FnOnce(&mut RdbValue) -> Option<R>,
    ) -> Option<R> {
        let mut entry = self
            .data
            .entry(Bytes::copy_from_slice(key))
            .or_insert_with(init);
        f(entry.value_mut())
    }
}

impl MemoryStorager {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_db_count(name, DEFAULT_DB_COUNT)
    }

    pub fn with_db_count(
        name: impl Into<String>,
        count: usize,
    ) -> Self {
        Self {
            name: name.into(),
            dbs: (0..count).map(|_| Arc::new(MemoryDb::new())).collect(),
            opened: AtomicBool::new(false),
        }
    }

    /// Конкретная база без проверки открытия; для тестов и CLI.
    pub fn db(
        &self,
        index: usize,
    ) -> Option<Arc<MemoryDb>> {
        self.dbs.get(index).cloned()
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.opened.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DriverError::Closed { what: "storager" })
        }
    }
}

fn wrong_type(
    key: &[u8],
    expected: &'static str,
) -> redkit_error::StackError {
    DriverError::WrongType {
        key: String::from_utf8_lossy(key).into_owned(),
        expected,
    }
    .into()
}

/// Индексы `lrange` в стиле Redis: отрицательные считаются от конца,
/// выход за границы обрезается.
fn normalize_range(
    len: usize,
    start: i64,
    stop: i64,
) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return None;
    }
    Some((start as usize, stop as usize))
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для MemoryDb
////////////////////////////////////////////////////////////////////////////////

#[async_trait]
impl StringCmd for MemoryDb {
    async fn set(
        &self,
        key: &[u8],
        value: Bytes,
    ) -> RedkitResult<()> {
        self.data
            .insert(Bytes::copy_from_slice(key), RdbValue::String(value));
        Ok(())
    }

    async fn get(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>> {
        match self.data.get(key).as_deref() {
            None => Ok(None),
            Some(RdbValue::String(v)) => Ok(Some(v.clone())),
            Some(_) => Err(wrong_type(key, "string")),
        }
    }
}

#[async_trait]
impl ListCmd for MemoryDb {
    async fn rpush(
        &self,
        key: &[u8],
        values: Vec<Bytes>,
    ) -> RedkitResult<usize> {
        let len = self.with_value(
            key,
            || RdbValue::List(Vec::new()),
            |v| match v {
                RdbValue::List(items) => {
                    items.extend(values);
                    Some(items.len())
                }
                _ => None,
            },
        );
        len.ok_or_else(|| wrong_type(key, "list"))
    }

    async fn lrange(
        &self,
        key: &[u8],
        start: i64,
        stop: i64,
    ) -> RedkitResult<Vec<Bytes>> {
        match self.data.get(key).as_deref() {
            None => Ok(Vec::new()),
            Some(RdbValue::List(items)) => Ok(normalize_range(items.len(), start, stop)
                .map(|(s, e)| items[s..=e].to_vec())
                .unwrap_or_default()),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }

    async fn llen(
        &self,
        key: &[u8],
    ) -> RedkitResult<usize> {
        match self.data.get(key).as_deref() {
            None => Ok(0),
            Some(RdbValue::List(items)) => Ok(items.len()),
            Some(_) => Err(wrong_type(key, "list")),
        }
    }
}

#[async_trait]
impl HashCmd for MemoryDb {
    async fn hset(
        &self,
        key: &[u8],
        field: Bytes,
        value: Bytes,
    ) -> RedkitResult<bool> {
        let added = self.with_value(
            key,
            || RdbValue::Hash(BTreeMap::new()),
            |v| match v {
                RdbValue::Hash(fields) => Some(fields.insert(field, value).is_none()),
                _ => None,
            },
        );
        added.ok_or_else(|| wrong_type(key, "hash"))
    }

    async fn hget(
        &self,
        key: &[u8],
        field: &[u8],
    ) -> RedkitResult<Option<Bytes>> {
        match self.data.get(key).as_deref() {
            None => Ok(None),
            Some(RdbValue::Hash(fields)) => Ok(fields.get(field).cloned()),
            Some(_) => Err(wrong_type(key, "hash")),
        }
    }

    async fn hgetall(
        &self,
        key: &[u8],
    ) -> RedkitResult<Vec<(Bytes, Bytes)>> {
        match self.data.get(key).as_deref() {
            None => Ok(Vec::new()),
            Some(RdbValue::Hash(fields)) => Ok(fields
                .iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect()),
            Some(_) => Err(wrong_type(key, "hash")),
        }
    }
}

#[async_trait]
impl SetCmd for MemoryDb {
    async fn sadd(
        &self,
        key: &[u8],
        members: Vec<Bytes>,
    ) -> RedkitResult<usize> {
        let added = self.with_value(
            key,
            || RdbValue::Set(BTreeSet::new()),
            |v| match v {
                RdbValue::Set(set) => {
                    Some(members.into_iter().filter(|m| set.insert(m.clone())).count())
                }
                _ => None,
            },
        );
        added.ok_or_else(|| wrong_type(key, "set"))
    }

    async fn smembers(
        &self,
        key: &[u8],
    ) -> RedkitResult<Vec<Bytes>> {
        match self.data.get(key).as_deref() {
            None => Ok(Vec::new()),
            Some(RdbValue::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key, "set")),
        }
    }
}

#[async_trait]
impl ZSetCmd for MemoryDb {
    async fn zadd(
        &self,
        key: &[u8],
        score: f64,
        member: Bytes,
    ) -> RedkitResult<bool> {
        if score.is_nan() {
            return Err(DriverError::InvalidNumber {
                value: "nan".to_string(),
            }
            .into());
        }
        let added = self.with_value(
            key,
            || RdbValue::ZSet(BTreeMap::new()),
            |v| match v {
                RdbValue::ZSet(entries) => {
                    Some(entries.insert(member, OrderedFloat(score)).is_none())
                }
                _ => None,
            },
        );
        added.ok_or_else(|| wrong_type(key, "zset"))
    }

    async fn zscore(
        &self,
        key: &[u8],
        member: &[u8],
    ) -> RedkitResult<Option<f64>> {
        match self.data.get(key).as_deref() {
            None => Ok(None),
            Some(RdbValue::ZSet(entries)) => Ok(entries.get(member).map(|s| s.0)),
            Some(_) => Err(wrong_type(key, "zset")),
        }
    }

    async fn zrange_with_scores(
        &self,
        key: &[u8],
    ) -> RedkitResult<Vec<(Bytes, f64)>> {
        match self.data.get(key).as_deref() {
            None => Ok(Vec::new()),
            Some(RdbValue::ZSet(entries)) => {
                let mut items: Vec<(Bytes, f64)> =
                    entries.iter().map(|(m, s)| (m.clone(), s.0)).collect();
                items.sort_by(|a, b| {
                    OrderedFloat(a.1)
                        .cmp(&OrderedFloat(b.1))
                        .then_with(|| a.0.cmp(&b.0))
                });
                Ok(items)
            }
            Some(_) => Err(wrong_type(key, "zset")),
        }
    }
}

#[async_trait]
impl CommonCmd for MemoryDb {
    async fn del(
        &self,
        key: &[u8],
    ) -> RedkitResult<bool> {
        Ok(self.data.remove(key).is_some())
    }

    async fn exists(
        &self,
        key: &[u8],
    ) -> RedkitResult<bool> {
        Ok(self.data.contains_key(key))
    }

    async fn key_type(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<&'static str>> {
        Ok(self.data.get(key).map(|v| v.type_name()))
    }

    async fn dump(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>> {
        Ok(self.data.get(key).map(|v| dump_value(&v)))
    }

    async fn restore(
        &self,
        key: &[u8],
        payload: &[u8],
        replace: bool,
    ) -> RedkitResult<()> {
        let value = decode_verified_dump(payload).map_err(DriverError::Rdb)?;
        let key = Bytes::copy_from_slice(key);
        if !replace && self.data.contains_key(&key) {
            return Err(DriverError::KeyExists {
                key: String::from_utf8_lossy(&key).into_owned(),
            }
            .into());
        }
        debug!(key = ?key, kind = value.type_name(), "restored key");
        self.data.insert(key, value);
        Ok(())
    }
}

#[async_trait]
impl CommandSink for MemoryDb {
    async fn apply(
        &mut self,
        cmds: &[RedisCmd],
    ) -> RedkitResult<()> {
        replay_commands(&*self, cmds).await
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для MemoryStorager
////////////////////////////////////////////////////////////////////////////////

#[async_trait]
impl Storager for MemoryStorager {
    fn name(&self) -> &str {
        &self.name
    }

    async fn open(&self) -> RedkitResult<()> {
        self.opened.store(true, Ordering::Release);
        info!(name = %self.name, dbs = self.dbs.len(), "memory storager opened");
        Ok(())
    }

    async fn select(
        &self,
        index: usize,
    ) -> RedkitResult<Arc<dyn Db>> {
        self.ensure_open()?;
        let db = self.db(index).ok_or_else(|| DriverError::InvalidNumber {
            value: index.to_string(),
        })?;
        Ok(db)
    }

    async fn flush_all(&self) -> RedkitResult<()> {
        self.ensure_open()?;
        for db in &self.dbs {
            db.clear();
        }
        Ok(())
    }

    async fn close(&self) -> RedkitResult<()> {
        self.opened.store(false, Ordering::Release);
        info!(name = %self.name, "memory storager closed");
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Хранилище ключ-значение
////////////////////////////////////////////////////////////////////////////////

pub struct MemoryKvStore {
    name: String,
    data: Arc<DashMap<Bytes, Bytes>>,
    closed: Arc<AtomicBool>,
}

pub struct MemoryWriteBatch {
    data: Arc<DashMap<Bytes, Bytes>>,
    closed: Arc<AtomicBool>,
    ops: BatchOpBuffer,
    finished: bool,
}

impl MemoryKvStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Arc::new(DashMap::new()),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn ensure_open(&self) -> Result<(), DriverError> {
        if self.closed.load(Ordering::Acquire) {
            Err(DriverError::Closed { what: "kv store" })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>> {
        self.ensure_open()?;
        Ok(self.data.get(key).map(|v| v.clone()))
    }

    async fn put(
        &self,
        key: Bytes,
        value: Bytes,
    ) -> RedkitResult<()> {
        self.ensure_open()?;
        self.data.insert(key, value);
        Ok(())
    }

    async fn delete(
        &self,
        key: &[u8],
    ) -> RedkitResult<()> {
        self.ensure_open()?;
        self.data.remove(key);
        Ok(())
    }

    fn batch(&self) -> Box<dyn WriteBatch> {
        Box::new(MemoryWriteBatch {
            data: Arc::clone(&self.data),
            closed: Arc::clone(&self.closed),
            ops: BatchOpBuffer::new(),
            finished: false,
        })
    }

    async fn close(&self) -> RedkitResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl WriteBatch for MemoryWriteBatch {
    fn put(
        &mut self,
        key: Bytes,
        value: Bytes,
    ) {
        self.ops.put(key, value);
    }

    fn delete(
        &mut self,
        key: Bytes,
    ) {
        self.ops.delete(key);
    }

    fn data(&self) -> &[BatchOp] {
        self.ops.ops()
    }

    async fn commit(&mut self) -> RedkitResult<()> {
        if self.finished || self.closed.load(Ordering::Acquire) {
            return Err(DriverError::Closed {
                what: "write batch",
            }
            .into());
        }
        self.finished = true;
        for op in self.ops.take() {
            match op {
                BatchOp::Put { key, value } => {
                    self.data.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    self.data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn rollback(&mut self) {
        self.ops.reset();
        self.finished = true;
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
