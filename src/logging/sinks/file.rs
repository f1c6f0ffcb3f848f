use tracing_appender::{non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Файловый слой с ежедневной ротацией в `log_dir`.
///
/// Запись неблокирующая; буфер сбрасывается, когда `WorkerGuard` уничтожается.
pub fn layer_with_config<S>(config: &LoggingConfig) -> (Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let appender = daily(&config.log_dir, &config.file.filename);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer: Box<dyn LayerTrait<S> + Send + Sync> = match config.format {
        LogFormat::Json => Box::new(
            fmt::layer()
                .event_format(fmt::format().json())
                .with_ansi(false)
                .with_writer(writer),
        ),
        LogFormat::Pretty | LogFormat::Compact => {
            Box::new(fmt::layer().with_ansi(false).with_writer(writer))
        }
    };

    (layer, guard)
}
