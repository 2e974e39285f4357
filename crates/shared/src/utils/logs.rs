use anyhow::{Context, Result};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use tracing_appender::{
    non_blocking,
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber: JSON file log, pretty console log
/// (filtered by `RUST_LOG`) and the OpenTelemetry log bridge.
///
/// The returned guard flushes the file writer on drop and must live as long
/// as the process.
pub fn init_logger(
    sdk_logger_provider: &SdkLoggerProvider,
    component: &str,
    is_dev: bool,
) -> Result<WorkerGuard> {
    let log_dir = if is_dev { "./logs" } else { "/var/log/app" };

    let file_name = format!("rust_app_{component}.log");
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, file_name);
    let (file_writer, guard) = non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .json()
        .with_filter(EnvFilter::new("info"));

    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    let console_layer = fmt::layer()
        .pretty()
        .with_thread_names(true)
        .with_ansi(true)
        .with_filter(console_filter);

    let mut otel_filter = EnvFilter::new("info");
    for directive in ["hyper=off", "opentelemetry=off", "tonic=off", "h2=off", "rdkafka=off"] {
        otel_filter = otel_filter.add_directive(
            directive
                .parse()
                .with_context(|| format!("Invalid log directive: {directive}"))?,
        );
    }

    let otel_layer = OpenTelemetryTracingBridge::new(sdk_logger_provider).with_filter(otel_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_subscriber_once() {
        let provider = SdkLoggerProvider::builder().build();

        let guard = init_logger(&provider, "logs-test", true);
        assert!(guard.is_ok());

        let again = init_logger(&provider, "logs-test", true);
        assert!(again.is_err());
    }
}
