//! Layered configuration for the switchboard daemon.
//!
//! [`Config`] merges built-in defaults, an optional configuration file, the
//! `SWITCHBOARD_*` environment and command-line flags, later layers winning.
//! A file is chosen with `--config-path` or `SWITCHBOARD_CONFIG_PATH`:
//!
//! ```toml
//! listen = "tcp://127.0.0.1:9780"
//! log_filter = "switchboard=debug,info"
//! log_format = "compact"
//! services = ["test=echo", "chat=chat"]
//! ```

mod defaults;
mod logging;
mod services;
mod socket;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_SERVICES, DEFAULT_TCP_PORT, default_listen_endpoint,
    default_log_filter, default_log_filter_string, default_log_format, default_services,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use services::{ServiceBinding, ServiceBindingParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "SWITCHBOARD")]
pub struct Config {
    /// Endpoint the daemon listens on.
    #[serde(default = "default_listen_endpoint")]
    pub listen: SocketEndpoint,
    /// `tracing` filter directives.
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Output format of the log stream.
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
    /// Services to register, as `name=kind` bindings.
    #[serde(default = "default_services")]
    pub services: Vec<ServiceBinding>,
}

impl Config {
    /// Endpoint the daemon listens on.
    #[must_use]
    pub const fn listen(&self) -> &SocketEndpoint {
        &self.listen
    }

    /// `tracing` filter directives.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Output format of the log stream.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Services to register.
    #[must_use]
    pub fn services(&self) -> &[ServiceBinding] {
        &self.services
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen_endpoint(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            services: default_services(),
        }
    }
}
