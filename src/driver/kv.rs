use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use redkit_error::RedkitResult;

use super::Db;
use crate::utils::BatchOp;

/// Хранилище, которое драйвер открывает и из которого выбирает базы.
#[async_trait]
pub trait Storager: Send + Sync {
    fn name(&self) -> &str;

    async fn open(&self) -> RedkitResult<()>;

    /// База с номером `index`. Хранилище должно быть открыто.
    async fn select(
        &self,
        index: usize,
    ) -> RedkitResult<Arc<dyn Db>>;

    async fn flush_all(&self) -> RedkitResult<()>;

    async fn close(&self) -> RedkitResult<()>;
}

/// Плоское хранилище ключ-значение (слот-хранилище узла).
#[async_trait]
pub trait KvStore: Send + Sync {
    fn name(&self) -> &str;

    async fn get(
        &self,
        key: &[u8],
    ) -> RedkitResult<Option<Bytes>>;

    async fn put(
        &self,
        key: Bytes,
        value: Bytes,
    ) -> RedkitResult<()>;

    async fn delete(
        &self,
        key: &[u8],
    ) -> RedkitResult<()>;

    /// Новый пустой пакет записи.
    fn batch(&self) -> Box<dyn WriteBatch>;

    async fn close(&self) -> RedkitResult<()>;
}

/// Пакет записи: операции копятся локально и применяются по `commit`
/// в порядке добавления. После `commit` или `rollback` пакет закрыт.
#[async_trait]
pub trait WriteBatch: Send {
    fn put(
        &mut self,
        key: Bytes,
        value: Bytes,
    );

    fn delete(
        &mut self,
        key: Bytes,
    );

    /// Накопленные операции.
    fn data(&self) -> &[BatchOp];

    async fn commit(&mut self) -> RedkitResult<()>;

    fn rollback(&mut self);
}
