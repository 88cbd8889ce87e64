use crate::config::ServerConfig;
use anyhow::Result;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    fmt::{self, time::OffsetTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize logging for the server.
///
/// The console layer is skipped in silent mode. When a log directory is
/// configured, a daily rolling file layer is added; the returned guard must
/// be held until shutdown so buffered lines get flushed.
pub fn init_logging(config: &ServerConfig) -> Result<Option<WorkerGuard>> {
    let timer = OffsetTime::local_rfc_3339().unwrap_or_else(|_| {
        // Local offset can be unavailable in multi-threaded processes
        OffsetTime::new(
            time::UtcOffset::UTC,
            time::format_description::well_known::Rfc3339,
        )
    });

    let (file_layer, guard) = match &config.log_dir {
        Some(logs_dir) => {
            std::fs::create_dir_all(logs_dir)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("parley")
                .filename_suffix("log")
                .build(logs_dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_timer(timer.clone())
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = (!config.silent_logging).then(|| {
        fmt::layer()
            .with_timer(timer)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()?;

    tracing::info!("Logging system initialized");
    if let Some(dir) = &config.log_dir {
        tracing::info!("Log files are being written to: {:?}", dir);
    }

    Ok(guard)
}

/// Log server shutdown
pub fn log_shutdown() {
    tracing::info!("=== Parley shutdown complete ===");
}
