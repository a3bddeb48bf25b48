//! Lifecycle events surfaced to telemetry sinks.

use std::sync::Arc;

use switchboard::ServiceRegistry;
use switchboard_config::Config;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer for daemon lifecycle events.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked once configuration, telemetry and the registry are ready.
    fn bootstrap_succeeded(&self, config: &Config, registry: &ServiceRegistry);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, registry: &ServiceRegistry) {
        (**self).bootstrap_succeeded(config, registry);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }
}

/// Reporter that records lifecycle events with `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, registry: &ServiceRegistry) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            services = ?registry.service_names(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }
}
