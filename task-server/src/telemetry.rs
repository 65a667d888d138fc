use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::{Config, LogFormat, LoggingConfig};

/// Target of the storage crate, filtered by its own level
const DATABASE_TARGET: &str = "database";

/// Filter directives for the configured levels: the application level as the
/// default and the storage level for the database crate.
pub fn filter_directives(config: &LoggingConfig) -> String {
    format!(
        "{},{DATABASE_TARGET}={}",
        config.level.to_lowercase(),
        config.db_level.to_lowercase()
    )
}

/// `RUST_LOG` when set, the configured levels otherwise
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(config)))
        .context("Invalid log level configuration")
}

/// Initialize the tracing subscriber for logging
pub fn init_telemetry(config: &LoggingConfig) -> Result<()> {
    let env_filter = build_env_filter(config)?;

    let registry = Registry::default().with(env_filter);

    match config.format {
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            registry
                .with(fmt_layer)
                .try_init()
                .context("Logging already initialized")?;
        }
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_list(true)
                .flatten_event(true);

            registry
                .with(fmt_layer)
                .try_init()
                .context("Logging already initialized")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry
                .with(fmt_layer)
                .try_init()
                .context("Logging already initialized")?;
        }
    }

    tracing::info!(
        log_level = %config.level,
        db_log_level = %config.db_level,
        log_format = ?config.format,
        "Telemetry initialized"
    );

    Ok(())
}

/// Log server startup information
pub fn log_startup_info(config: &Config) {
    tracing::info!(
        environment = config.environment.as_str(),
        server_address = %config.server_address(),
        database_url = %config.database.url,
        reconnect_attempts = config.database.reconnect_attempts,
        "Task server starting up"
    );
}

/// Log an error together with its chain of causes
pub fn report_error(error: &anyhow::Error, context: &str) {
    tracing::error!(error = %error, context = context, "Operation failed");

    for (depth, cause) in error.chain().skip(1).enumerate() {
        tracing::error!(error = %cause, depth = depth + 1, "Error cause");
    }
}
