use bytes::Bytes;
use redkit::{
    driver::*,
    rdb::{decode_dump_to_commands, dump_hash_value, dump_list_value, dump_zset_value, RedisCmd},
};
use redkit_error::{DriverError, RdbError};

fn b(s: &str) -> Bytes {
    Bytes::copy_from_slice(s.as_bytes())
}

fn driver_error(err: &redkit_error::StackError) -> &DriverError {
    err.downcast_ref::<DriverError>()
        .unwrap_or_else(|| panic!("expected DriverError, got {err:?}"))
}

/// Тест проверяет полный путь миграции: DUMP, разбор в команды и их
/// повтор на другой базе.
#[tokio::test]
async fn test_replay_rewritten_hash() {
    let payload = dump_hash_value(&[("name", "redkit"), ("lang", "rust")]);
    let cmds = decode_dump_to_commands(&payload, b"user:1").unwrap();

    let mut db = MemoryDb::new();
    db.apply(&cmds).await.unwrap();

    let mut fields = db.hgetall(b"user:1").await.unwrap();
    fields.sort();
    assert_eq!(
        fields,
        vec![(b("lang"), b("rust")), (b("name"), b("redkit"))]
    );
    assert_eq!(db.key_type(b"user:1").await.unwrap(), Some("hash"));
}

#[tokio::test]
async fn test_replay_keeps_list_order() {
    let payload = dump_list_value(&["c", "a", "b", "a"]);
    let cmds = decode_dump_to_commands(&payload, b"l").unwrap();

    let mut db = MemoryDb::new();
    db.apply(&cmds).await.unwrap();
    assert_eq!(
        db.lrange(b"l", 0, -1).await.unwrap(),
        vec![b("c"), b("a"), b("b"), b("a")]
    );
}

#[tokio::test]
async fn test_restore_zset_and_dump_back() {
    let db = MemoryDb::new();
    let payload = dump_zset_value(&[("x", 1.5), ("y", -2.0)]);
    db.restore(b"z", &payload, false).await.unwrap();

    assert_eq!(
        db.zrange_with_scores(b"z").await.unwrap(),
        vec![(b("y"), -2.0), (b("x"), 1.5)]
    );
    assert_eq!(db.zscore(b"z", b"x").await.unwrap(), Some(1.5));

    // Повторный дамп читается другой базой.
    let dumped = db.dump(b"z").await.unwrap().unwrap();
    let other = MemoryDb::new();
    other.restore(b"z2", &dumped, false).await.unwrap();
    assert_eq!(other.value(b"z2"), db.value(b"z"));
}

#[tokio::test]
async fn test_restore_existing_key_requires_replace() {
    let db = MemoryDb::new();
    db.set(b"k", b("old")).await.unwrap();

    let payload = redkit::rdb::dump_string_value(b"new");
    let err = db.restore(b"k", &payload, false).await.unwrap_err();
    assert!(matches!(driver_error(&err), DriverError::KeyExists { .. }));

    db.restore(b"k", &payload, true).await.unwrap();
    assert_eq!(db.get(b"k").await.unwrap(), Some(b("new")));
}

/// Тест проверяет, что испорченный пакет не меняет базу.
#[tokio::test]
async fn test_restore_rejects_bad_checksum() {
    let db = MemoryDb::new();
    let mut payload = dump_list_value(&["a"]).to_vec();
    let last = payload.len() - 1;
    payload[last] ^= 0xFF;

    let err = db.restore(b"l", &payload, false).await.unwrap_err();
    assert!(matches!(
        driver_error(&err),
        DriverError::Rdb(RdbError::ChecksumMismatch { .. })
    ));
    assert!(!db.exists(b"l").await.unwrap());
}

#[tokio::test]
async fn test_wrong_type() {
    let db = MemoryDb::new();
    db.set(b"s", b("v")).await.unwrap();
    let err = db.rpush(b"s", vec![b("x")]).await.unwrap_err();
    assert!(matches!(driver_error(&err), DriverError::WrongType { .. }));
}

#[tokio::test]
async fn test_replay_rejects_unknown_and_bad_arity() {
    let mut db = MemoryDb::new();

    let unknown = RedisCmd::from_parts(vec![b("incr"), b("k")]);
    let err = db.apply(&[unknown]).await.unwrap_err();
    assert!(matches!(
        driver_error(&err),
        DriverError::UnknownCommand { .. }
    ));

    let odd_hset = RedisCmd::from_parts(vec![b("hset"), b("h"), b("f")]);
    let err = db.apply(&[odd_hset]).await.unwrap_err();
    assert!(matches!(driver_error(&err), DriverError::WrongArity { .. }));
    assert!(db.is_empty());
}

/// Тест проверяет жизненный цикл хранилища и изоляцию баз.
#[tokio::test]
async fn test_storager_lifecycle() {
    let storager = MemoryStorager::with_db_count("lifecycle", 2);

    let err = storager.select(0).await.err().unwrap();
    assert!(matches!(driver_error(&err), DriverError::Closed { .. }));

    storager.open().await.unwrap();
    let db0 = storager.select(0).await.unwrap();
    let db1 = storager.select(1).await.unwrap();
    assert!(storager.select(2).await.is_err());

    db0.sadd(b"s", vec![b("b"), b("a"), b("b")]).await.unwrap();
    assert_eq!(db0.smembers(b"s").await.unwrap(), vec![b("a"), b("b")]);
    assert!(!db1.exists(b"s").await.unwrap());

    storager.flush_all().await.unwrap();
    assert!(!db0.exists(b"s").await.unwrap());

    storager.close().await.unwrap();
    assert!(storager.select(0).await.is_err());
}

#[tokio::test]
async fn test_kv_store_batch() {
    let store = MemoryKvStore::new("batch-test");
    store.put(b("a"), b("1")).await.unwrap();

    let mut batch = store.batch();
    batch.put(b("b"), b("2"));
    batch.delete(b("a"));
    assert_eq!(batch.data().len(), 2);
    // До commit ничего не видно.
    assert_eq!(store.get(b"b").await.unwrap(), None);

    batch.commit().await.unwrap();
    assert_eq!(store.get(b"a").await.unwrap(), None);
    assert_eq!(store.get(b"b").await.unwrap(), Some(b("2")));

    let err = batch.commit().await.unwrap_err();
    assert!(matches!(driver_error(&err), DriverError::Closed { .. }));

    let mut rolled = store.batch();
    rolled.put(b("c"), b("3"));
    rolled.rollback();
    assert_eq!(store.get(b"c").await.unwrap(), None);
}
