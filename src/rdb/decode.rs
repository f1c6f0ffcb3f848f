//! Точки входа декодирования DUMP-пакетов.
//!
//! Одно декодирование проходит состояния `Empty → Initialized → Done`
//! ([`DumpAccumulator`]); повторная инициализация означает, что в пакете
//! два объекта верхнего уровня, и отклоняется как `DoubleInitialization`.

use std::io::{Cursor, Read};

use bytes::Bytes;
use redkit_error::{RdbError, RdbResult};
use tracing::{debug, warn};

use super::{
    dump::RdbValue,
    encode::crc64,
    structure::read_byte,
    tags::{RdbType, FOOTER_LEN, MAX_RDB_VERSION},
    types::{parse_object, RedisCmd, RedisObject},
};

/// Состояние одного декодирования.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpState {
    Empty,
    Initialized(RdbType),
    Done,
}

/// Накопитель результата: принимает ровно один объект.
#[derive(Debug)]
pub struct DumpAccumulator {
    state: DumpState,
    object: Option<RedisObject>,
}

impl Default for DumpAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl DumpAccumulator {
    pub fn new() -> Self {
        Self {
            state: DumpState::Empty,
            object: None,
        }
    }

    pub fn state(&self) -> DumpState {
        self.state
    }

    /// Переход `Empty → Initialized`. Из любого другого состояния —
    /// `DoubleInitialization`.
    pub fn initialize(
        &mut self,
        tag: RdbType,
        object: RedisObject,
    ) -> RdbResult<()> {
        if self.state != DumpState::Empty {
            return Err(RdbError::DoubleInitialization);
        }
        self.state = DumpState::Initialized(tag);
        self.object = Some(object);
        Ok(())
    }

    /// Переход `Initialized → Done` с выдачей объекта. Пустой накопитель
    /// означает, что пакет оборвался до первого объекта.
    pub fn finish(&mut self) -> RdbResult<RedisObject> {
        match self.state {
            DumpState::Initialized(_) => {
                self.state = DumpState::Done;
                self.object.take().ok_or(RdbError::TruncatedInput)
            }
            DumpState::Empty => Err(RdbError::TruncatedInput),
            DumpState::Done => Err(RdbError::DoubleInitialization),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Публичные операции
////////////////////////////////////////////////////////////////////////////////

/// Читает тег и тело одного объекта из потока.
pub fn decode_object<R: Read>(
    r: &mut R,
    key: Bytes,
) -> RdbResult<(RdbType, RedisObject)> {
    let tag = RdbType::from_byte(read_byte(r)?)?;
    let obj = parse_object(r, key, tag)?;
    Ok((tag, obj))
}

/// Материализует объект из DUMP-пакета под ключом `key`.
///
/// Футер не проверяется (см. [`verify_dump_payload`]); его отсутствие
/// допустимо. Если после объекта остаётся больше, чем футер, остаток
/// читается как ещё один объект и отвергается.
pub fn decode_dump_object(
    payload: &[u8],
    key: Bytes,
) -> RdbResult<RedisObject> {
    let mut acc = DumpAccumulator::new();
    let mut c = Cursor::new(payload);
    loop {
        let (tag, obj) = decode_object(&mut c, key.clone()).inspect_err(|e| {
            warn!(error = %e, kind = e.kind(), payload_len = payload.len(), "rejecting dump payload");
        })?;
        debug!(
            tag = tag.encoding_name(),
            consumed = c.position(),
            payload_len = payload.len(),
            "decoded dump object"
        );
        acc.initialize(tag, obj).inspect_err(|e| {
            warn!(error = %e, "dump payload carries more than one object");
        })?;
        let remaining = payload.len() - c.position() as usize;
        if remaining <= FOOTER_LEN {
            break;
        }
    }
    acc.finish()
}

/// Декодирует DUMP-пакет в логическое значение.
pub fn decode_dump(payload: &[u8]) -> RdbResult<RdbValue> {
    RdbValue::try_from(decode_dump_object(payload, Bytes::new())?)
}

/// Декодирует пакет и переписывает значение в команды для ключа `key`.
pub fn decode_dump_to_commands(
    payload: &[u8],
    key: &[u8],
) -> RdbResult<Vec<RedisCmd>> {
    decode_dump_object(payload, Bytes::copy_from_slice(key))?.rewrite()
}

/// Проверяет футер: длину, версию и CRC-64 по всем байтам до контрольной
/// суммы. Возвращает записанную версию.
pub fn verify_dump_payload(payload: &[u8]) -> RdbResult<u16> {
    if payload.len() < FOOTER_LEN {
        return Err(RdbError::TruncatedInput);
    }
    let split = payload.len() - 8;
    let version = u16::from_le_bytes([payload[split - 2], payload[split - 1]]);
    if version > MAX_RDB_VERSION {
        return Err(RdbError::UnsupportedVersion {
            version,
            max: MAX_RDB_VERSION,
        });
    }
    let mut recorded = [0u8; 8];
    recorded.copy_from_slice(&payload[split..]);
    let expected = u64::from_le_bytes(recorded);
    let actual = crc64(&payload[..split]);
    if expected != actual {
        warn!(expected, actual, "dump checksum mismatch");
        return Err(RdbError::ChecksumMismatch { expected, actual });
    }
    Ok(version)
}

/// Проверяет футер и декодирует пакет.
pub fn decode_verified_dump(payload: &[u8]) -> RdbResult<RdbValue> {
    verify_dump_payload(payload)?;
    decode_dump(payload)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
