//! Кодек объектов RDB в формате команды `DUMP`.
//!
//! Пакет состоит из байта типа, тела объекта и футера (версия RDB + CRC-64).
//! Модуль разделён на уровни:
//!
//! - [`tags`] — теги типов, константы длин и опкоды module2
//! - [`structure`] — примитивы: длины, строки, числа, intset/ziplist/listpack
//! - [`types`] — объектная модель и переписывание в команды
//! - [`decode`] — декодирование и проверка пакета
//! - [`encode`], [`dump`] — сериализация логических значений

pub mod decode;
pub mod dump;
pub mod encode;
pub mod structure;
pub mod tags;
pub mod types;

pub use decode::{
    decode_dump, decode_dump_object, decode_dump_to_commands, decode_object,
    decode_verified_dump, verify_dump_payload, DumpAccumulator, DumpState,
};
pub use dump::{
    dump_hash_value, dump_list_value, dump_set_value, dump_string_value, dump_value,
    dump_zset_value, RdbValue,
};
pub use encode::{crc64, DumpEncoder};
pub use tags::{RdbType, MAX_RDB_VERSION, RDB_VERSION};
pub use types::{RdbObject, RedisCmd, RedisObject};
