use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Ошибки фоновых очередей задач.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Очередь с таким именем уже существует
    DuplicateName { name: String },
    /// Недопустимые параметры очереди
    InvalidConfig { name: String, reason: String },
    /// Очередь закрыта, задача не принята
    Closed { name: String },
    /// Обработчик задачи вернул ошибку или запаниковал
    Failed { name: String, reason: String },
}

impl std::fmt::Display for TaskError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::DuplicateName { name } => write!(f, "task queue '{name}' already exists"),
            Self::InvalidConfig { name, reason } => {
                write!(f, "invalid task queue '{name}': {reason}")
            }
            Self::Closed { name } => write!(f, "task queue '{name}' is closed"),
            Self::Failed { name, reason } => write!(f, "task in '{name}' failed: {reason}"),
        }
    }
}

impl std::error::Error for TaskError {}

impl ErrorExt for TaskError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateName { .. } => StatusCode::AlreadyExists,
            Self::InvalidConfig { .. } => StatusCode::InvalidArgs,
            Self::Closed { .. } => StatusCode::StorageUnavailable,
            Self::Failed { .. } => StatusCode::Internal,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_codes() {
        let dup = TaskError::DuplicateName {
            name: "restore".to_string(),
        };
        assert_eq!(dup.status_code(), StatusCode::AlreadyExists);
        assert_eq!(dup.to_string(), "task queue 'restore' already exists");

        let failed = TaskError::Failed {
            name: "restore".to_string(),
            reason: "boom".to_string(),
        };
        assert_eq!(failed.client_message(), "Internal error");
    }
}
