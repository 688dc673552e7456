//! Telemetry and observability module
//!
//! Provides:
//! - Subscriber setup for `tracing` (compact or JSON, stderr or file)
//! - Per-generation request spans
//! - `metrics` facade counters and histograms
//! - The structured per-attempt request log

mod logger;
mod metrics;
mod tracing_ext;

pub use logger::*;
pub use self::metrics::*;
pub use tracing_ext::*;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::error::{IntegratorError, IntegratorResult};

/// Initialize the telemetry subsystem.
///
/// The returned guard must be kept alive while logging to a file; dropping
/// it flushes the background writer.
pub fn init_telemetry(config: &TelemetryConfig) -> IntegratorResult<Option<WorkerGuard>> {
    if !config.enabled {
        return Ok(None);
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| IntegratorError::Config(format!("Invalid log level '{}': {}", config.log_level, e)))?;

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path
                .file_name()
                .ok_or_else(|| IntegratorError::Config(format!("Invalid log file path: {}", path.display())))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true);

        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(config.log_file.is_none())
            .with_target(true)
            .compact();

        subscriber.with(fmt_layer).try_init()
    };
    result.map_err(|e| IntegratorError::Config(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(
        service = %config.service_name,
        version = %env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(guard)
}
