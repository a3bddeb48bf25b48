//! The switchboard daemon.
//!
//! `switchboardd` hosts dynamically dispatched services behind a JSONL socket
//! protocol. Bootstrap loads the layered configuration from
//! [`switchboard_config`], installs structured telemetry, prepares the socket
//! directory, and assembles the service registry from the configured
//! `name=kind` bindings. The listener then serves one request per connection,
//! each on its own thread, until a termination signal arrives.
//!
//! Requests name a service and method by path and carry their arguments as a
//! JSON array in the `a` parameter:
//!
//! ```json
//! {"path":"/test/echo","parameters":{"a":"[7]"},"session":"s-1"}
//! ```
//!
//! See [`dispatch`] for the response messages.

mod bootstrap;
pub mod catalogue;
pub mod dispatch;
mod health;
mod launch;
pub mod services;
mod shutdown;
mod telemetry;
pub mod transport;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use launch::{LaunchError, RunningDaemon, run_daemon, run_daemon_with, start_serving};
pub use shutdown::{ShutdownError, ShutdownSignal, SystemShutdownSignal};
pub use telemetry::{TelemetryError, TelemetryHandle, initialise as initialise_telemetry};

#[cfg(test)]
mod tests;
