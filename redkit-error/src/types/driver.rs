use std::any::Any;

use crate::{ErrorExt, RdbError, StatusCode};

/// Ошибки драйверов хранилища и воспроизведения команд.
#[derive(Debug, Clone)]
pub enum DriverError {
    /// Имя команды не поддерживается драйвером
    UnknownCommand { command: String },
    /// Неверное число аргументов
    WrongArity {
        command: String,
        expected: &'static str,
        got: usize,
    },
    /// Ключ хранит значение другого типа
    WrongType { key: String, expected: &'static str },
    /// Ключ не найден
    KeyNotFound { key: String },
    /// Ключ уже существует (RESTORE без REPLACE)
    KeyExists { key: String },
    /// Аргумент не разбирается как число
    InvalidNumber { value: String },
    /// Реализация с таким именем уже зарегистрирована
    AlreadyRegistered { kind: &'static str, name: String },
    /// Реализация с таким именем не зарегистрирована
    NotRegistered { kind: &'static str, name: String },
    /// Хранилище закрыто или пакет уже завершён
    Closed { what: &'static str },
    /// Ошибка RDB-кодека при dump/restore
    Rdb(RdbError),
}

impl std::fmt::Display for DriverError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnknownCommand { command } => write!(f, "unknown command '{command}'"),
            Self::WrongArity {
                command,
                expected,
                got,
            } => write!(
                f,
                "wrong number of arguments for '{command}': expected {expected}, got {got}"
            ),
            Self::WrongType { key, expected } => {
                write!(f, "key '{key}' holds a value that is not a {expected}")
            }
            Self::KeyNotFound { key } => write!(f, "no such key '{key}'"),
            Self::KeyExists { key } => write!(f, "target key '{key}' already exists"),
            Self::InvalidNumber { value } => write!(f, "value '{value}' is not a valid number"),
            Self::AlreadyRegistered { kind, name } => {
                write!(f, "{kind} '{name}' is already registered")
            }
            Self::NotRegistered { kind, name } => write!(f, "{kind} '{name}' is not registered"),
            Self::Closed { what } => write!(f, "{what} is closed"),
            Self::Rdb(err) => write!(f, "RDB codec error: {err}"),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rdb(err) => Some(err),
            _ => None,
        }
    }
}

impl ErrorExt for DriverError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownCommand { .. } | Self::WrongArity { .. } => StatusCode::InvalidCommand,
            Self::WrongType { .. } => StatusCode::WrongType,
            Self::KeyNotFound { .. } | Self::NotRegistered { .. } => StatusCode::NotFound,
            Self::KeyExists { .. } | Self::AlreadyRegistered { .. } => StatusCode::AlreadyExists,
            Self::InvalidNumber { .. } => StatusCode::InvalidValue,
            Self::Closed { .. } => StatusCode::StorageUnavailable,
            Self::Rdb(err) => err.status_code(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "driver".to_string()),
            ("status_code", self.status_code().to_string()),
        ];
        match self {
            Self::UnknownCommand { command } | Self::WrongArity { command, .. } => {
                tags.push(("command", command.clone()));
            }
            Self::AlreadyRegistered { kind, .. } | Self::NotRegistered { kind, .. } => {
                tags.push(("registry", kind.to_string()));
            }
            _ => {}
        }
        tags
    }
}

impl From<RdbError> for DriverError {
    fn from(err: RdbError) -> Self {
        Self::Rdb(err)
    }
}
