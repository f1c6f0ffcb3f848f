//! Теги типов и константы формата RDB.
//!
//! Однобайтовый тег в начале DUMP-пакета выбирает и логический тип, и его
//! представление на диске. Используется модулями `types`, `encode` и
//! `decode`.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use redkit_error::{RdbError, RdbResult};

/// Версия формата, которую пишет кодировщик в футер.
pub const RDB_VERSION: u16 = 9;
/// Максимальная версия футера, принимаемая при проверке (listpack-типы Redis
/// 7.x пишутся с версией 10 и 11).
pub const MAX_RDB_VERSION: u16 = 11;
/// Размер футера: версия (2 байта) + CRC-64 (8 байт).
pub const FOOTER_LEN: usize = 10;

/// Префиксы длины: 2 старших бита первого байта.
pub const RDB_6BITLEN: u8 = 0;
pub const RDB_14BITLEN: u8 = 1;
pub const RDB_32BITLEN: u8 = 0x80;
pub const RDB_64BITLEN: u8 = 0x81;
pub const RDB_ENCVAL: u8 = 3;

/// Подтипы специальной ("encoded") длины строки.
pub const RDB_ENC_INT8: u8 = 0;
pub const RDB_ENC_INT16: u8 = 1;
pub const RDB_ENC_INT32: u8 = 2;
pub const RDB_ENC_LZF: u8 = 3;

/// Сентинелы legacy-float.
pub const FLOAT_NAN: u8 = 253;
pub const FLOAT_POS_INF: u8 = 254;
pub const FLOAT_NEG_INF: u8 = 255;

/// Тег типа объекта в DUMP-пакете.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum RdbType {
    String = 0,
    List = 1,
    Set = 2,
    ZSet = 3,
    Hash = 4,
    ZSet2 = 5,
    Module = 6,
    Module2 = 7,
    HashZipmap = 9,
    ListZiplist = 10,
    SetIntset = 11,
    ZSetZiplist = 12,
    HashZiplist = 13,
    ListQuicklist = 14,
    StreamListpacks = 15,
    HashListpack = 16,
    ZSetListpack = 17,
    ListQuicklist2 = 18,
    StreamListpacks2 = 19,
}

/// Вид контейнера узла quicklist v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ContainerKind {
    Plain = 1,
    Packed = 2,
}

/// Опкоды потока значений module2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ModuleOpcode {
    Eof = 0,
    SInt = 1,
    UInt = 2,
    Float = 3,
    Double = 4,
    String = 5,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RdbType {
    /// Разбирает тег; неизвестный байт — `UnknownTypeByte`.
    pub fn from_byte(byte: u8) -> RdbResult<Self> {
        Self::try_from(byte).map_err(|_| RdbError::UnknownTypeByte(byte))
    }

    pub fn as_byte(self) -> u8 {
        self.into()
    }

    /// Имя представления на диске.
    pub fn encoding_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List => "list",
            Self::Set => "set",
            Self::ZSet => "zset",
            Self::Hash => "hash",
            Self::ZSet2 => "zset2",
            Self::Module => "module",
            Self::Module2 => "module2",
            Self::HashZipmap => "hash-zipmap",
            Self::ListZiplist => "list-ziplist",
            Self::SetIntset => "set-intset",
            Self::ZSetZiplist => "zset-ziplist",
            Self::HashZiplist => "hash-ziplist",
            Self::ListQuicklist => "list-quicklist",
            Self::StreamListpacks => "stream-listpacks",
            Self::HashListpack => "hash-listpack",
            Self::ZSetListpack => "zset-listpack",
            Self::ListQuicklist2 => "list-quicklist2",
            Self::StreamListpacks2 => "stream-listpacks2",
        }
    }

    /// Имя логического типа (как у команды `TYPE`).
    pub fn type_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::List | Self::ListZiplist | Self::ListQuicklist | Self::ListQuicklist2 => "list",
            Self::Set | Self::SetIntset => "set",
            Self::ZSet | Self::ZSet2 | Self::ZSetZiplist | Self::ZSetListpack => "zset",
            Self::Hash | Self::HashZipmap | Self::HashZiplist | Self::HashListpack => "hash",
            Self::StreamListpacks | Self::StreamListpacks2 => "stream",
            Self::Module | Self::Module2 => "module",
        }
    }
}

impl ModuleOpcode {
    /// Опкоды пишутся как RDB-длины, поэтому приходят как `u64`.
    pub fn from_length(op: u64) -> RdbResult<Self> {
        u8::try_from(op)
            .ok()
            .and_then(|b| Self::try_from(b).ok())
            .ok_or(RdbError::UnknownModuleOpcode(op))
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
