//! Именованная очередь задач с фиксированным числом воркеров.
//!
//! Имя очереди уникально в пределах процесса и освобождается при
//! закрытии или удалении очереди.

use std::{collections::HashSet, future::Future, sync::Arc};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use redkit_error::{RedkitResult, TaskError};
use tokio::{
    sync::{mpsc, Mutex as AsyncMutex},
    task::JoinHandle,
};
use tracing::{debug, warn};

static TASK_NAMES: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// Вызывается для каждой задачи, обработчик которой вернул ошибку.
pub type ErrorCallback = Arc<dyn Fn(TaskError) + Send + Sync>;

/// Параметры очереди.
#[derive(Debug, Clone)]
pub struct AsyncTaskConfig {
    pub name: String,
    pub workers: usize,
    pub queue_size: usize,
}

pub struct AsyncTask<T> {
    name: String,
    sender: Option<mpsc::Sender<T>>,
    workers: Vec<JoinHandle<()>>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl<T: Send + 'static> AsyncTask<T> {
    /// Запускает воркеры. Должна вызываться внутри tokio runtime.
    pub fn spawn<F, Fut>(
        config: AsyncTaskConfig,
        handler: F,
        on_error: Option<ErrorCallback>,
    ) -> Result<Self, TaskError>
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RedkitResult<()>> + Send + 'static,
    {
        let AsyncTaskConfig {
            name,
            workers,
            queue_size,
        } = config;
        if workers == 0 || queue_size == 0 {
            return Err(TaskError::InvalidConfig {
                name,
                reason: "workers and queue_size must be positive".to_string(),
            });
        }
        if !TASK_NAMES.lock().insert(name.clone()) {
            return Err(TaskError::DuplicateName { name });
        }

        let (sender, receiver) = mpsc::channel(queue_size);
        let receiver = Arc::new(AsyncMutex::new(receiver));
        let handler = Arc::new(handler);

        let handles = (0..workers)
            .map(|id| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&handler);
                let on_error = on_error.clone();
                let name = name.clone();
                tokio::spawn(async move {
                    loop {
                        let item = receiver.lock().await.recv().await;
                        let Some(item) = item else {
                            break;
                        };
                        if let Err(e) = handler(item).await {
                            warn!(task = %name, worker = id, error = %e, "task handler failed");
                            if let Some(cb) = &on_error {
                                cb(TaskError::Failed {
                                    name: name.clone(),
                                    reason: e.to_string(),
                                });
                            }
                        }
                    }
                    debug!(task = %name, worker = id, "worker stopped");
                })
            })
            .collect();

        debug!(task = %name, workers, queue_size, "async task started");
        Ok(Self {
            name,
            sender: Some(sender),
            workers: handles,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ставит задачу в очередь, ожидая свободного места.
    pub async fn post(
        &self,
        item: T,
    ) -> Result<(), TaskError> {
        let closed = || TaskError::Closed {
            name: self.name.clone(),
        };
        let sender = self.sender.as_ref().ok_or_else(closed)?;
        sender.send(item).await.map_err(|_| closed())
    }

    /// Прекращает приём задач, дожидается обработки очереди и
    /// освобождает имя.
    pub async fn close(mut self) -> Result<(), TaskError> {
        self.sender.take();
        let mut result = Ok(());
        for handle in std::mem::take(&mut self.workers) {
            if let Err(e) = handle.await {
                result = Err(TaskError::Failed {
                    name: self.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
        debug!(task = %self.name, "async task closed");
        result
    }
}

impl<T> Drop for AsyncTask<T> {
    fn drop(&mut self) {
        TASK_NAMES.lock().remove(&self.name);
    }
}

/// Занято ли имя очереди.
pub fn task_name_in_use(name: &str) -> bool {
    TASK_NAMES.lock().contains(name)
}
