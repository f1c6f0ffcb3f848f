//! Реестры реализаций хранилищ по имени.
//!
//! Реестры глобальны для процесса; повторная регистрация имени
//! отклоняется, а не перезаписывает прежнюю реализацию.

use std::{collections::BTreeMap, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use redkit_error::DriverError;
use tracing::debug;

use super::{KvStore, Storager};

struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: RwLock<BTreeMap<String, Arc<T>>>,
}

impl<T: ?Sized> Registry<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    fn register(
        &self,
        name: &str,
        item: Arc<T>,
    ) -> Result<(), DriverError> {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(DriverError::AlreadyRegistered {
                kind: self.kind,
                name: name.to_string(),
            });
        }
        entries.insert(name.to_string(), item);
        debug!(kind = self.kind, name, "registered");
        Ok(())
    }

    fn get(
        &self,
        name: &str,
    ) -> Result<Arc<T>, DriverError> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DriverError::NotRegistered {
                kind: self.kind,
                name: name.to_string(),
            })
    }

    fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}

static STORAGERS: Lazy<Registry<dyn Storager>> = Lazy::new(|| Registry::new("storager"));
static KV_STORES: Lazy<Registry<dyn KvStore>> = Lazy::new(|| Registry::new("kv store"));

pub fn register_storager(
    name: &str,
    storager: Arc<dyn Storager>,
) -> Result<(), DriverError> {
    STORAGERS.register(name, storager)
}

pub fn get_storager(name: &str) -> Result<Arc<dyn Storager>, DriverError> {
    STORAGERS.get(name)
}

/// Имена зарегистрированных хранилищ по алфавиту.
pub fn list_storagers() -> Vec<String> {
    STORAGERS.list()
}

pub fn register_kv_store(
    name: &str,
    store: Arc<dyn KvStore>,
) -> Result<(), DriverError> {
    KV_STORES.register(name, store)
}

pub fn get_kv_store(name: &str) -> Result<Arc<dyn KvStore>, DriverError> {
    KV_STORES.get(name)
}

pub fn list_kv_stores() -> Vec<String> {
    KV_STORES.list()
}
