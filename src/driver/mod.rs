//! Контракты хранилищ, в которые применяются команды переписывания, и
//! эталонная реализация в памяти.
//!
//! - [`cmd`] — группы команд, [`Db`], [`CommandSink`] и `replay_commands`
//! - [`kv`] — [`Storager`], [`KvStore`], [`WriteBatch`]
//! - [`registry`] — реестры реализаций по имени
//! - [`memory`] — `MemoryStorager`, `MemoryDb`, `MemoryKvStore`

pub mod cmd;
pub mod kv;
pub mod memory;
pub mod registry;

pub use cmd::*;
pub use kv::*;
pub use memory::*;
pub use registry::*;
