pub mod config;
pub mod middleware;
pub mod paths;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use config::LogConfig;
pub use middleware::{
    access_log_middleware, request_id_middleware, AccessLogSettings, RequestId, REQUEST_ID_HEADER,
};

/// Keeps the file writers flushing; dropping it closes the log files
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Initialize console logging plus, when enabled, JSON access and application log files
///
/// Files roll daily: `access.log` gets only `access_log` events and
/// `application.log` everything else.
pub fn init_logging(config: &LogConfig) -> Result<LogGuards, Box<dyn std::error::Error>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_filter(
            EnvFilter::try_new(&config.console_log_level)
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        );

    if !config.files_enabled {
        tracing_subscriber::registry().with(console_layer).try_init()?;
        tracing::info!("File logging disabled");
        return Ok(LogGuards { _guards: Vec::new() });
    }

    let log_dir = paths::get_log_directory(config.custom_log_dir.as_deref())?;

    let access_appender = tracing_appender::rolling::daily(&log_dir, "access.log");
    let app_appender = tracing_appender::rolling::daily(&log_dir, "application.log");

    let (access_writer, access_guard) = tracing_appender::non_blocking(access_appender);
    let (app_writer, app_guard) = tracing_appender::non_blocking(app_appender);

    let access_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(access_writer)
        .with_filter(EnvFilter::new("off,access_log=info"));

    let app_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(app_writer)
        .with_filter(
            EnvFilter::try_new(&config.file_log_level)
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_FILE_LOG_FILTER))
                .add_directive("access_log=off".parse()?),
        );

    tracing_subscriber::registry()
        .with(console_layer)
        .with(access_layer)
        .with(app_layer)
        .try_init()?;

    tracing::info!(log_dir = %log_dir.display(), "Logging to access.log and application.log");

    Ok(LogGuards {
        _guards: vec![access_guard, app_guard],
    })
}

/// Log platform information on startup
pub fn log_platform_info() {
    tracing::info!(
        platform = std::env::consts::OS,
        architecture = std::env::consts::ARCH,
        version = env!("CARGO_PKG_VERSION"),
        "Server starting on platform"
    );
}
