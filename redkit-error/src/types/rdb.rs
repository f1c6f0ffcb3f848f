use std::{any::Any, io};

use crate::{ErrorExt, StatusCode};

/// Результат операций RDB-кодека.
pub type RdbResult<T> = Result<T, RdbError>;

/// Ошибки разбора и сборки DUMP-пакетов RDB.
///
/// Каждая ошибка описывает ровно один нарушенный инвариант, чтобы вызывающая
/// сторона могла записать её в лог и отклонить пакет, не падая.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RdbError {
    /// Данные закончились раньше, чем ожидалось
    TruncatedInput,
    /// Тег типа вне таблицы диспетчеризации
    UnknownTypeByte(u8),
    /// Известная, но не поддерживаемая кодировка (zipmap, module v1, LZF)
    UnsupportedEncoding { encoding: &'static str },
    /// Упакованный контейнер нарушает собственный инвариант
    MalformedContainer {
        container: &'static str,
        reason: String,
    },
    /// Число (ASCII или бинарное) не разбирается
    MalformedNumber { reason: String },
    /// Узел quicklist v2 с контейнером не из {1, 2}
    UnknownContainerKind(u64),
    /// Повторная инициализация значения в одном декодировании
    DoubleInitialization,
    /// CRC-64 в футере не совпадает с пересчитанным
    ChecksumMismatch { expected: u64, actual: u64 },
    /// Специальная (encoded) длина там, где нужна обычная
    UnexpectedSpecialLength(u8),
    /// Версия в футере новее поддерживаемой
    UnsupportedVersion { version: u16, max: u16 },
    /// Неизвестный опкод в потоке module2
    UnknownModuleOpcode(u64),
    /// Значение другого логического типа
    TypeMismatch {
        expected: &'static str,
        got: &'static str,
    },
    /// Кодировка распознана, но не материализуется (stream, module)
    NotImplemented { what: &'static str },
    /// Ошибка ввода-вывода нижележащего источника
    Io { kind: io::ErrorKind, message: String },
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl RdbError {
    pub fn malformed_container(
        container: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedContainer {
            container,
            reason: reason.into(),
        }
    }

    pub fn malformed_number(reason: impl Into<String>) -> Self {
        Self::MalformedNumber {
            reason: reason.into(),
        }
    }

    /// Короткое имя варианта для логов и метрик.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TruncatedInput => "truncated_input",
            Self::UnknownTypeByte(_) => "unknown_type_byte",
            Self::UnsupportedEncoding { .. } => "unsupported_encoding",
            Self::MalformedContainer { .. } => "malformed_container",
            Self::MalformedNumber { .. } => "malformed_number",
            Self::UnknownContainerKind(_) => "unknown_container_kind",
            Self::DoubleInitialization => "double_initialization",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
            Self::UnexpectedSpecialLength(_) => "unexpected_special_length",
            Self::UnsupportedVersion { .. } => "unsupported_version",
            Self::UnknownModuleOpcode(_) => "unknown_module_opcode",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::NotImplemented { .. } => "not_implemented",
            Self::Io { .. } => "io",
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для RdbError
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for RdbError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::TruncatedInput => write!(f, "truncated input"),
            Self::UnknownTypeByte(tag) => write!(f, "unknown type byte {tag}"),
            Self::UnsupportedEncoding { encoding } => {
                write!(f, "unsupported encoding: {encoding}")
            }
            Self::MalformedContainer { container, reason } => {
                write!(f, "malformed {container}: {reason}")
            }
            Self::MalformedNumber { reason } => write!(f, "malformed number: {reason}"),
            Self::UnknownContainerKind(kind) => {
                write!(f, "unknown quicklist container kind {kind}")
            }
            Self::DoubleInitialization => write!(f, "object initialized twice"),
            Self::ChecksumMismatch { expected, actual } => write!(
                f,
                "checksum mismatch: recorded {expected:#018x}, computed {actual:#018x}"
            ),
            Self::UnexpectedSpecialLength(enc) => {
                write!(f, "unexpected special length encoding {enc}")
            }
            Self::UnsupportedVersion { version, max } => {
                write!(f, "unsupported RDB version {version} (max {max})")
            }
            Self::UnknownModuleOpcode(op) => write!(f, "unknown module opcode {op}"),
            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::NotImplemented { what } => write!(f, "not implemented: {what}"),
            Self::Io { kind, message } => write!(f, "I/O error ({kind:?}): {message}"),
        }
    }
}

impl std::error::Error for RdbError {}

impl ErrorExt for RdbError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::TruncatedInput
            | Self::MalformedContainer { .. }
            | Self::MalformedNumber { .. }
            | Self::UnknownContainerKind(_)
            | Self::DoubleInitialization
            | Self::UnexpectedSpecialLength(_)
            | Self::UnknownModuleOpcode(_) => StatusCode::CorruptedData,
            Self::UnknownTypeByte(_) => StatusCode::InvalidData,
            Self::UnsupportedEncoding { .. } => StatusCode::Unsupported,
            Self::ChecksumMismatch { .. } => StatusCode::ChecksumMismatch,
            Self::UnsupportedVersion { .. } => StatusCode::UnsupportedVersion,
            Self::TypeMismatch { .. } => StatusCode::WrongType,
            Self::NotImplemented { .. } => StatusCode::NotImplemented,
            Self::Io { .. } => StatusCode::Io,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "rdb".to_string()),
            ("rdb_error", self.kind().to_string()),
            ("status_code", self.status_code().to_string()),
        ];
        if let Self::UnknownTypeByte(tag) = self {
            tags.push(("tag", tag.to_string()));
        }
        tags
    }
}

/// `UnexpectedEof` от `Read::read_exact` и `byteorder` означает обрыв
/// пакета.
impl From<io::Error> for RdbError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::TruncatedInput,
            kind => Self::Io {
                kind,
                message: err.to_string(),
            },
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    /// Тест проверяет, что UnexpectedEof превращается в TruncatedInput.
    #[test]
    fn test_eof_maps_to_truncated() {
        let err: RdbError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert_eq!(err, RdbError::TruncatedInput);

        let err: RdbError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        assert!(matches!(
            err,
            RdbError::Io {
                kind: io::ErrorKind::BrokenPipe,
                ..
            }
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RdbError::TruncatedInput.status_code(),
            StatusCode::CorruptedData
        );
        assert_eq!(
            RdbError::UnknownTypeByte(99).status_code(),
            StatusCode::InvalidData
        );
        assert_eq!(
            RdbError::UnsupportedEncoding {
                encoding: "hash-zipmap"
            }
            .status_code(),
            StatusCode::Unsupported
        );
        assert_eq!(
            RdbError::ChecksumMismatch {
                expected: 0,
                actual: 1
            }
            .status_code(),
            StatusCode::ChecksumMismatch
        );
        assert_eq!(
            RdbError::NotImplemented { what: "stream" }.status_code(),
            StatusCode::NotImplemented
        );
    }

    /// Тест проверяет, что сообщение об ошибке называет нарушенный инвариант.
    #[test]
    fn test_display_names_invariant() {
        let err = RdbError::malformed_container("ziplist", "odd number of entries: 3");
        assert_eq!(err.to_string(), "malformed ziplist: odd number of entries: 3");
        assert_eq!(err.client_message(), err.to_string());
        assert_eq!(RdbError::UnknownTypeByte(99).to_string(), "unknown type byte 99");
    }

    #[test]
    fn test_metrics_tags_include_kind_and_tag() {
        let tags = RdbError::UnknownTypeByte(42).metrics_tags();
        assert!(tags
            .iter()
            .any(|(k, v)| *k == "rdb_error" && v == "unknown_type_byte"));
        assert!(tags.iter().any(|(k, v)| *k == "tag" && v == "42"));
    }
}
