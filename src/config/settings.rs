use std::{path::PathBuf, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::{
    logging::{FileConfig, LogFormat, LoggingConfig},
    resp::ClientConfig,
    utils::BufferPool,
};

/// Ёмкость одного буфера в пуле.
const POOL_BUFFER_CAPACITY: usize = 4096;

/// Настройки утилит redkit.
///
/// Источники по возрастанию приоритета: значения по умолчанию, файл
/// конфигурации (если указан), переменные окружения `REDKIT_*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    /// Проверять версию и CRC-64 футера DUMP-пакетов
    pub verify_checksum: bool,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Каталог файловых логов; без него пишем только в консоль
    pub log_dir: Option<PathBuf>,
    /// Сколько буферов держать в `BufferPool`
    pub buffer_pool_size: usize,
    pub password: Option<String>,
    pub username: Option<String>,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Загрузка с необязательным файлом конфигурации (toml, json, yaml).
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            // Значения по умолчанию
            .set_default("connect_timeout_ms", 5_000)?
            .set_default("read_timeout_ms", 30_000)?
            .set_default("write_timeout_ms", 10_000)?
            .set_default("verify_checksum", true)?
            .set_default("log_level", "info")?
            .set_default("log_format", "compact")?
            .set_default("buffer_pool_size", 64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let cfg = builder
            // Переменные окружения с префиксом REDKIT_
            .add_source(Environment::with_prefix("REDKIT").try_parsing(true))
            .build()?;

        cfg.try_deserialize()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            password: self.password.clone(),
            username: self.username.clone(),
        }
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let defaults = LoggingConfig::default();
        let file_enabled = self.log_dir.is_some();
        LoggingConfig {
            level: self.log_level.to_lowercase(),
            format: self.log_format,
            log_dir: self.log_dir.clone().unwrap_or(defaults.log_dir),
            file_enabled,
            file: FileConfig {
                enabled: file_enabled,
                ..defaults.file
            },
            ..LoggingConfig::default()
        }
    }

    /// Нужна ли проверка футера: флаг команды лишь включает её поверх
    /// `verify_checksum`.
    pub fn verify_dump(
        &self,
        requested: bool,
    ) -> bool {
        requested || self.verify_checksum
    }

    pub fn buffer_pool(&self) -> BufferPool {
        BufferPool::new(POOL_BUFFER_CAPACITY, self.buffer_pool_size)
    }
}
