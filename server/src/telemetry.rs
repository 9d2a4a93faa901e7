use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::{Config, LogFormat, LoggingConfig};

/// Initialize the tracing subscriber.
///
/// Logs go to stderr; stdout carries only command output.
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("Invalid log level configuration")?;

    let registry = Registry::default().with(env_filter);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_span_list(true)
                .flatten_event(true);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false);

            registry.with(fmt_layer).try_init()
        }
    }
    .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        log_level = %config.level,
        log_format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}

/// Log startup information
pub fn log_startup_info(config: &Config) {
    tracing::info!(
        database_url = %config.database_url(),
        max_connections = config.database.max_connections,
        version = tracker_core::VERSION,
        "Tracker starting up"
    );
}

/// Log an error and its cause chain
pub fn report_error(error: &anyhow::Error, context: &str) {
    tracing::error!(error = %error, context = context, "Operation failed");

    let mut depth = 1;
    for cause in error.chain().skip(1) {
        tracing::error!(error = %cause, depth = depth, "Error cause");
        depth += 1;
    }
}
