//! # Observability Infrastructure
//!
//! This module provides structured logging for certplane using the tracing
//! ecosystem. Store and engine operations emit structured events; the
//! subscriber installed here routes them to compact or JSON output.

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;
use crate::errors::Result;

/// Initialize the tracing subscriber
///
/// The configured log level is the default filter directive; `RUST_LOG`
/// overrides it when set. Output format is compact text, or JSON when
/// `json_logging` is enabled.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    // Subscriber already set elsewhere (e.g. integration tests); ignore.
    if config.json_logging {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt().json().with_env_filter(filter).finish(),
        )
        .ok();
    } else {
        tracing::subscriber::set_global_default(
            tracing_subscriber::fmt().with_env_filter(filter).finish(),
        )
        .ok();
    }

    tracing::info!(
        service_name = %config.service_name,
        log_level = %config.log_level,
        json_logging = %config.json_logging,
        "Observability initialized"
    );

    Ok(())
}
