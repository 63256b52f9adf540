//! Tracing subscriber setup for the API binary.

use stormlead_core::LoggingConfig;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber: compact console output filtered by `RUST_LOG`, or by
/// the configured level for the stormlead crates and tower_http when `RUST_LOG` is unset.
/// With `LOG_TO_CONSOLE=false` no console layer is installed.
pub fn init_telemetry(
    logging: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_filter = format!(
        "stormlead={level},stormlead_api={level},stormlead_services={level},stormlead_storage={level},stormlead_processing={level},tower_http={level}",
        level = logging.level
    );

    let console_fmt = logging.log_to_console.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(Format::default().compact().with_target(false))
    });

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(console_fmt)
        .try_init()?;

    Ok(())
}
