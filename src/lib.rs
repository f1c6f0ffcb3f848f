/// Settings loading (defaults, config file, `REDKIT_*` environment).
pub mod config;
/// Storage and command driver contracts plus the in-memory reference driver.
pub mod driver;
/// Logging initialisation (formats, filters, sinks).
pub mod logging;
/// RDB object codec: DUMP payload decoding, encoding and command rewriting.
pub mod rdb;
/// RESP2 frames, codec and the async command client.
pub mod resp;
/// Buffer pools, batch buffers and the named async task queue.
pub mod utils;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Configuration.
pub use config::Settings;
/// Driver contracts and the in-memory implementation.
pub use driver::{
    get_kv_store, get_storager, register_kv_store, register_storager, replay_commands,
    CommandSink, Db, KvStore, MemoryDb, MemoryKvStore, MemoryStorager, Storager, WriteBatch,
};
/// Logging.
pub use logging::{init_logging, LogFormat, LoggingConfig, LoggingHandle};
/// RDB codec entry points and value types.
pub use rdb::{
    decode_dump, decode_dump_object, decode_dump_to_commands, decode_verified_dump, dump_value,
    verify_dump_payload, RdbType, RdbValue, RedisCmd, RedisObject,
};
/// Errors shared across the crate.
pub use redkit_error::{RedkitResult, StackError};
/// RESP client and frames.
pub use resp::{ClientConfig, RespCmdClient, RespFrame};
