use crate::logging::LogFormat;
use crate::services::ServiceBinding;
use crate::socket::SocketEndpoint;

/// Default TCP host the daemon binds.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default TCP port the daemon binds.
pub const DEFAULT_TCP_PORT: u16 = 9780;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Service bindings registered when the configuration names none.
pub const DEFAULT_SERVICES: [(&str, &str); 2] = [("test", "echo"), ("chat", "chat")];

/// Default log filter expression used by the daemon.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint the daemon listens on when none is configured.
#[must_use]
pub fn default_listen_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_TCP_PORT)
}

/// Service bindings registered when none are configured.
#[must_use]
pub fn default_services() -> Vec<ServiceBinding> {
    DEFAULT_SERVICES
        .iter()
        .map(|(name, kind)| ServiceBinding::new(*name, *kind))
        .collect()
}
