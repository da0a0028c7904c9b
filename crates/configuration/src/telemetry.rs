use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides `settings.level` when present. When a log file is
/// configured, the returned guard must be kept alive for buffered lines to be
/// flushed. If a subscriber is already installed this is a no-op and `None` is
/// returned.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| {
            ConfigError::Telemetry(format!("invalid log filter '{}': {}", settings.level, e))
        })?;

    let Some(path) = &settings.file else {
        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(LocalTime::rfc_3339())
            .try_init();
        if installed.is_err() {
            tracing::debug!("Tracing subscriber already installed; keeping the existing one");
        }
        return Ok(None);
    };

    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            ConfigError::Telemetry(format!("log file '{}' has no file name", path.display()))
        })?;

    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(LocalTime::rfc_3339())
        .with_ansi(false)
        .with_writer(writer)
        .try_init();

    match installed {
        Ok(()) => Ok(Some(guard)),
        Err(_) => {
            tracing::debug!(
                "Tracing subscriber already installed; log file {} not attached",
                path.display()
            );
            Ok(None)
        }
    }
}
