use std::{env, fmt, fs, io, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Допустимые уровни логирования.
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Формат вывода событий.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    #[default]
    Compact,
}

/// Настройки консольного вывода.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// Формат консоли; если не задан, берётся общий `LoggingConfig::format`
    pub format: Option<LogFormat>,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_thread_ids: bool,
    pub with_line_numbers: bool,
}

/// Настройки файлового вывода (ежедневная ротация).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    /// Префикс имени файла; к нему добавляется дата
    pub filename: String,
}

/// Полная конфигурация логирования.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub log_dir: PathBuf,
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl LoggingConfig {
    /// Переопределяет поля из `REDKIT_LOG_LEVEL`, `REDKIT_LOG_FORMAT` и
    /// `REDKIT_LOG_DIR`. Некорректный формат игнорируется.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = env::var("REDKIT_LOG_LEVEL") {
            self.level = level.to_lowercase();
        }
        if let Some(format) = env::var("REDKIT_LOG_FORMAT")
            .ok()
            .and_then(|f| f.parse().ok())
        {
            self.format = format;
        }
        if let Ok(dir) = env::var("REDKIT_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
            self.file_enabled = true;
            self.file.enabled = true;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !LEVELS.contains(&self.level.as_str()) {
            return Err(format!(
                "invalid log level '{}', expected one of {}",
                self.level,
                LEVELS.join(", ")
            ));
        }
        if self.file_enabled && self.file.enabled && self.file.filename.is_empty() {
            return Err("log file name must not be empty".to_string());
        }
        Ok(())
    }

    /// Создаёт каталог логов, если включён файловый вывод.
    pub fn ensure_log_dir(&self) -> io::Result<()> {
        if self.file_enabled && self.file.enabled {
            fs::create_dir_all(&self.log_dir)?;
        }
        Ok(())
    }

    /// Директива `EnvFilter`: сторонние крейты на `warn`, свои на `level`.
    pub fn build_filter_directive(&self) -> String {
        format!(
            "warn,redkit={0},redkit_error={0}",
            self.level
        )
    }

    pub fn console_format(&self) -> LogFormat {
        self.console.format.unwrap_or(self.format)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для LoggingConfig
////////////////////////////////////////////////////////////////////////////////

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: None,
            with_ansi: true,
            with_target: true,
            with_thread_ids: false,
            with_line_numbers: false,
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: "redkit.log".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            log_dir: PathBuf::from("logs"),
            console_enabled: true,
            file_enabled: false,
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        };
        f.write_str(name)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    /// Тест проверяет, что конфигурация по умолчанию проходит валидацию.
    #[test]
    fn test_default_is_valid() {
        let cfg = LoggingConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.console_format(), LogFormat::Compact);
        assert_eq!(
            cfg.build_filter_directive(),
            "warn,redkit=info,redkit_error=info"
        );
    }

    /// Тест проверяет отклонение неизвестного уровня и пустого имени файла.
    #[test]
    fn test_validate_rejects_bad_values() {
        let cfg = LoggingConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = LoggingConfig {
            file_enabled: true,
            file: FileConfig {
                enabled: true,
                filename: String::new(),
            },
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    /// Тест проверяет, что переменные окружения переопределяют уровень,
    /// формат и включают файловый вывод.
    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("REDKIT_LOG_LEVEL", "DEBUG");
        env::set_var("REDKIT_LOG_FORMAT", "json");
        env::set_var("REDKIT_LOG_DIR", "/tmp/redkit-logs");

        let mut cfg = LoggingConfig::default();
        cfg.apply_env_overrides();

        env::remove_var("REDKIT_LOG_LEVEL");
        env::remove_var("REDKIT_LOG_FORMAT");
        env::remove_var("REDKIT_LOG_DIR");

        assert_eq!(cfg.level, "debug");
        assert_eq!(cfg.format, LogFormat::Json);
        assert_eq!(cfg.log_dir, PathBuf::from("/tmp/redkit-logs"));
        assert!(cfg.file_enabled && cfg.file.enabled);
    }

    /// Тест проверяет, что каталог создаётся только при включённом файле.
    #[test]
    fn test_ensure_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("logs");

        let mut cfg = LoggingConfig {
            log_dir: dir.clone(),
            ..Default::default()
        };
        cfg.ensure_log_dir().unwrap();
        assert!(!dir.exists());

        cfg.file_enabled = true;
        cfg.file.enabled = true;
        cfg.ensure_log_dir().unwrap();
        assert!(dir.is_dir());
    }
}
