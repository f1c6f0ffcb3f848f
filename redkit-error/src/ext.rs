use std::{any::Any, error::Error};

use crate::StatusCode;

/// Расширение для ошибок библиотеки (object-safe).
///
/// Даёт статус-код, безопасное сообщение для клиента, подробное сообщение для
/// логов и теги для метрик.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки. По умолчанию [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    /// Возвращает ошибку как [`Any`](std::any::Any) для downcast.
    fn as_any(&self) -> &dyn Any;

    /// Сообщение, которое можно показать пользователю CLI или удалённой
    /// стороне. Для внутренних ошибок детали скрываются.
    fn client_message(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal | StatusCode::Unexpected => {
                "Internal error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Подробное сообщение для логов.
    fn log_message(&self) -> String {
        format!("{self:?}")
    }

    /// Пары ключ–значение для систем наблюдаемости.
    fn metrics_tags(&self) -> Vec<(&'static str, String)> {
        vec![
            ("error_type", self.type_name()),
            ("status_code", self.status_code().to_string()),
        ]
    }

    /// Короткое имя типа ошибки.
    fn type_name(&self) -> String {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string()
    }
}

/// Обёртка над любой ошибкой, реализующей `ErrorExt`.
pub struct BoxedError {
    inner: Box<dyn ErrorExt>,
}

impl BoxedError {
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    pub fn into_inner(self) -> Box<dyn ErrorExt> {
        self.inner
    }
}

impl std::fmt::Debug for BoxedError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

impl std::fmt::Display for BoxedError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::error::Error for BoxedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl ErrorExt for BoxedError {
    fn status_code(&self) -> StatusCode {
        self.inner.status_code()
    }

    fn as_any(&self) -> &dyn Any {
        self.inner.as_any()
    }

    fn client_message(&self) -> String {
        self.inner.client_message()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct PlainError(&'static str);

    impl fmt::Display for PlainError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "plain: {}", self.0)
        }
    }

    impl Error for PlainError {}

    impl ErrorExt for PlainError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct CorruptError;

    impl fmt::Display for CorruptError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "payload is corrupted")
        }
    }

    impl Error for CorruptError {}

    impl ErrorExt for CorruptError {
        fn status_code(&self) -> StatusCode {
            StatusCode::CorruptedData
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Тест проверяет, что по умолчанию статус ошибки — `Internal`, а
    /// сообщение для клиента скрывает детали.
    #[test]
    fn test_default_status_hides_details() {
        let e = PlainError("secret");
        assert_eq!(e.status_code(), StatusCode::Internal);
        assert_eq!(e.client_message(), "Internal error");
    }

    /// Тест проверяет, что для доменных кодов `client_message` совпадает с
    /// `Display`.
    #[test]
    fn test_client_message_for_domain_code() {
        let e = CorruptError;
        assert_eq!(e.client_message(), "payload is corrupted");
    }

    #[test]
    fn test_type_name_and_tags() {
        let e = CorruptError;
        assert_eq!(e.type_name(), "CorruptError");
        let tags = e.metrics_tags();
        assert!(tags.iter().any(|(k, v)| *k == "error_type" && v == "CorruptError"));
        assert!(tags.iter().any(|(k, v)| *k == "status_code" && v.contains("5002")));
    }

    /// Тест проверяет, что `BoxedError` делегирует статус и downcast
    /// внутренней ошибке.
    #[test]
    fn test_boxed_error_delegates() {
        let boxed = BoxedError::new(CorruptError);
        assert_eq!(boxed.status_code(), StatusCode::CorruptedData);
        assert!(boxed.as_any().downcast_ref::<CorruptError>().is_some());
        assert_eq!(boxed.to_string(), "payload is corrupted");
        let inner = boxed.into_inner();
        assert_eq!(inner.status_code(), StatusCode::CorruptedData);
    }
}
