//! Runs the daemon from bootstrap to shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, SystemConfigLoader, bootstrap_with};
use crate::dispatch::DispatchConnectionHandler;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
use crate::transport::{ListenerError, ListenerHandle, SocketListener};

pub(crate) const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Errors that stop the daemon.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrapping the daemon failed.
    #[error("daemon bootstrap failed: {source}")]
    Bootstrap {
        /// Underlying bootstrap error.
        #[source]
        source: BootstrapError,
    },
    /// The socket listener failed.
    #[error("daemon socket listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for shutdown failed.
    #[error("failed to await shutdown signal: {source}")]
    Shutdown {
        /// Underlying shutdown error.
        #[source]
        source: ShutdownError,
    },
}

impl From<BootstrapError> for LaunchError {
    fn from(source: BootstrapError) -> Self {
        Self::Bootstrap { source }
    }
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Listener { source }
    }
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Shutdown { source }
    }
}

/// A daemon accepting connections on its configured endpoint.
#[derive(Debug)]
pub struct RunningDaemon {
    listener: ListenerHandle,
    local_addr: Option<SocketAddr>,
}

impl RunningDaemon {
    /// Bound TCP address; `None` for Unix sockets.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Stops accepting and waits for the accept loop to exit. Connections
    /// already being served run to completion on their own threads.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the accept loop panicked.
    pub fn stop(self) -> Result<(), ListenerError> {
        self.listener.shutdown();
        self.listener.join()
    }
}

/// Binds the configured endpoint and starts serving `daemon`'s services.
///
/// # Errors
///
/// Returns [`ListenerError`] when the endpoint cannot be bound.
pub fn start_serving(daemon: &Daemon) -> Result<RunningDaemon, ListenerError> {
    let listener = SocketListener::bind(daemon.config().listen())?;
    let local_addr = listener.local_addr();
    let handler = Arc::new(DispatchConnectionHandler::new(daemon.dispatcher().clone()));
    let handle = listener.start(handler)?;
    info!(
        target: LAUNCH_TARGET,
        endpoint = %daemon.config().listen(),
        "daemon ready"
    );
    Ok(RunningDaemon {
        listener: handle,
        local_addr,
    })
}

/// Runs the daemon with the production collaborators until a termination
/// signal arrives.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, binding, or signal handling fails.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(
        &SystemConfigLoader,
        &StructuredHealthReporter,
        &SystemShutdownSignal,
    )
}

/// Runs the daemon with injected collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap, binding, or `shutdown` fails.
pub fn run_daemon_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    shutdown: &dyn ShutdownSignal,
) -> Result<(), LaunchError> {
    let daemon = bootstrap_with(loader, reporter)?;
    let running = start_serving(&daemon)?;
    let waited = shutdown.wait();
    running.stop()?;
    waited?;
    info!(target: LAUNCH_TARGET, "shutdown sequence completed");
    Ok(())
}
