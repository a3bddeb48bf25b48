//! Path routing for service invocations.
//!
//! Paths follow `/<service>/<method>` with an optional leading separator. An
//! empty path asks for the service listing; anything other than exactly two
//! non-empty segments is malformed.

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

/// Result of routing a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome<'a> {
    /// The path is empty: list the registered services.
    ListServices,
    /// Invoke `method` on `service`.
    Invoke {
        /// Service segment.
        service: &'a str,
        /// Method segment.
        method: &'a str,
    },
    /// The path does not have the `/<service>/<method>` shape.
    Malformed,
}

/// Routes a request path.
///
/// # Examples
///
/// ```
/// use switchboard::{RouteOutcome, route};
///
/// assert_eq!(route(""), RouteOutcome::ListServices);
/// assert_eq!(
///     route("/calc/add"),
///     RouteOutcome::Invoke { service: "calc", method: "add" }
/// );
/// assert_eq!(route("/calc/add/extra"), RouteOutcome::Malformed);
/// ```
#[must_use]
pub fn route(path: &str) -> RouteOutcome<'_> {
    let relative = path.strip_prefix(PATH_SEPARATOR).unwrap_or(path);
    if relative.is_empty() {
        return RouteOutcome::ListServices;
    }

    let Some((service, method)) = relative.split_once(PATH_SEPARATOR) else {
        return RouteOutcome::Malformed;
    };
    if service.is_empty() || method.is_empty() || method.contains(PATH_SEPARATOR) {
        return RouteOutcome::Malformed;
    }

    RouteOutcome::Invoke { service, method }
}
