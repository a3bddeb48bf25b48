//! Process-wide `tracing` subscriber for the daemon.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use switchboard_config::{Config, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Proof that the global subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Directive taken from configuration.
        filter: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Another subscriber was installed outside this module.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[source] SetGlobalDefaultError),
}

/// Installs the global subscriber described by `config`.
///
/// Only the first successful call installs anything; later calls return a
/// handle without touching global state, whatever configuration they pass.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a foreign
/// subscriber already owns the global default.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .map(|()| TelemetryHandle)
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = parse_filter(config.log_filter())?;
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    };
    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|error| TelemetryError::Filter {
        filter: directive.to_owned(),
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparsable_filters() {
        let error = parse_filter("switchboard=loud").expect_err("invalid directive");
        assert!(error.to_string().contains("switchboard=loud"));
    }

    #[test]
    fn accepts_default_filter() {
        assert!(parse_filter(Config::default().log_filter()).is_ok());
    }
}
