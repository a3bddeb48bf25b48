//! Daemon bootstrap: configuration, telemetry, socket directory, registry.

use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use switchboard::{Dispatcher, ServiceRegistry};
use switchboard_config::{Config, SocketPreparationError};

use crate::catalogue::{self, CatalogueError};
use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Source of the daemon configuration.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    ///
    /// # Errors
    ///
    /// Returns the layered loader's error when any source is invalid.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that reads defaults, file, environment and command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out a configuration resolved earlier.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The socket directory could not be prepared.
    #[error("failed to prepare daemon socket: {source}")]
    Socket {
        /// Filesystem error reported while preparing the socket directory.
        #[source]
        source: SocketPreparationError,
    },
    /// The configured services could not be registered.
    #[error("failed to assemble services: {source}")]
    Catalogue {
        /// Underlying catalogue error.
        #[source]
        source: CatalogueError,
    },
}

/// A bootstrapped daemon, ready to bind its listener.
#[derive(Debug)]
pub struct Daemon {
    config: Config,
    dispatcher: Dispatcher,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatcher over the configured services.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Registered services.
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        self.dispatcher.registry()
    }

    /// Telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] encountered, after reporting it.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();
    let result = assemble(loader);
    match &result {
        Ok(daemon) => reporter.bootstrap_succeeded(daemon.config(), daemon.registry()),
        Err(error) => reporter.bootstrap_failed(error),
    }
    result
}

fn assemble(loader: &dyn ConfigLoader) -> Result<Daemon, BootstrapError> {
    let config = loader
        .load()
        .map_err(|source| BootstrapError::Configuration { source })?;
    let telemetry =
        telemetry::initialise(&config).map_err(|source| BootstrapError::Telemetry { source })?;
    config
        .listen()
        .prepare_filesystem()
        .map_err(|source| BootstrapError::Socket { source })?;
    let registry = catalogue::build_registry(config.services())
        .map_err(|source| BootstrapError::Catalogue { source })?;

    Ok(Daemon {
        config,
        dispatcher: Dispatcher::new(Arc::new(registry)),
        telemetry,
    })
}
