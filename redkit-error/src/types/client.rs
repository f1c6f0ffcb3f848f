use std::io;

use crate::{ErrorExt, StatusCode};

/// Ошибки RESP-клиента.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// Ошибка подключения к серверу
    ConnectionFailed { address: String, reason: String },
    /// Таймаут подключения
    ConnectionTimeout,
    /// Соединение закрыто сервером или после ошибки ввода-вывода
    ConnectionClosed,
    /// Ответ `-ERR ...` от сервера
    ServerError { message: String },
    /// Ответ неожиданного типа
    UnexpectedResponse { expected: &'static str, got: String },
    /// Ошибка ввода-вывода
    Io {
        kind: io::ErrorKind,
        message: String,
    },
    /// Нарушение формата RESP
    Protocol { reason: String },
    /// Таймаут чтения
    ReadTimeout,
    /// Таймаут записи
    WriteTimeout,
}

impl std::fmt::Display for ClientError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed { address, reason } => {
                write!(f, "Failed to connect to {address}: {reason}")
            }
            Self::ConnectionTimeout => write!(f, "Connection timeout"),
            Self::ConnectionClosed => write!(f, "Connection closed"),
            Self::ServerError { message } => write!(f, "Server error: {message}"),
            Self::UnexpectedResponse { expected, got } => {
                write!(f, "Unexpected response: expected {expected}, got {got}")
            }
            Self::Io { kind, message } => write!(f, "I/O error ({kind:?}): {message}"),
            Self::Protocol { reason } => write!(f, "Protocol error: {reason}"),
            Self::ReadTimeout => write!(f, "Read timeout"),
            Self::WriteTimeout => write!(f, "Write timeout"),
        }
    }
}

impl std::error::Error for ClientError {}

impl ErrorExt for ClientError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ConnectionFailed { .. } | Self::ConnectionClosed => StatusCode::ConnectionFailed,
            Self::ConnectionTimeout | Self::ReadTimeout | Self::WriteTimeout => StatusCode::Timeout,
            Self::ServerError { .. } => StatusCode::Unexpected,
            Self::UnexpectedResponse { .. } | Self::Protocol { .. } => StatusCode::ProtocolError,
            Self::Io { .. } => StatusCode::Io,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn client_message(&self) -> String {
        match self {
            Self::ConnectionFailed { address, .. } => format!("Failed to connect to {address}"),
            Self::ServerError { message } => format!("Server error: {message}"),
            Self::Io { .. } => "Network error occurred".to_string(),
            other => other.to_string(),
        }
    }

    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        let mut tags = vec![
            ("error_type", "client".to_string()),
            ("status_code", self.status_code().to_string()),
        ];

        match self {
            Self::ConnectionFailed { address, .. } => {
                tags.push(("address", address.clone()));
            }
            Self::Io { kind, .. } => {
                tags.push(("io_kind", format!("{kind:?}")));
            }
            _ => {}
        }

        tags
    }
}

// Конверсия из io::Error
impl From<io::Error> for ClientError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::ConnectionClosed,
            kind => Self::Io {
                kind,
                message: err.to_string(),
            },
        }
    }
}
