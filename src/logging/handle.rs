use std::time::Instant;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle жизненного цикла логирования.
///
/// Держит `WorkerGuard` файлового вывода: пока handle жив, фоновый поток
/// записи работает; при уничтожении буфер сбрасывается на диск.
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    /// Включён ли файловый вывод.
    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Явное завершение: сбрасывает файловый буфер.
    pub fn shutdown(mut self) {
        let start = Instant::now();
        if let Some(guard) = self.file_guard.take() {
            tracing::debug!("flushing file log sink");
            drop(guard);
        }
        tracing::debug!(
            shutdown_duration_ms = start.elapsed().as_millis() as u64,
            "logging shutdown completed"
        );
    }
}
