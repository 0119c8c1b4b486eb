//! Tracing subscriber initialisation.
//!
//! Production emits JSON lines with span context; every other environment
//! gets human-readable output. `RUST_LOG` overrides the configured filter.

use thiserror::Error;
use tracing_subscriber::{
    layer::{Layer, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Registry,
};

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing(config: &ServerConfig) -> Result<(), TelemetryError> {
    if config.is_production() {
        install(
            config,
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true),
        )
    } else {
        install(
            config,
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_line_number(true),
        )
    }
}

fn build_env_filter(config: &ServerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},hyper=warn,tower=warn", config.log_level))
    })
}

fn install<L>(config: &ServerConfig, fmt_layer: L) -> Result<(), TelemetryError>
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(build_env_filter(config))
        .try_init()?;
    Ok(())
}
