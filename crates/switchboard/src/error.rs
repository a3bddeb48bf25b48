//! Framework faults surfaced by the dispatcher.
//!
//! These never pass through fault renderers. Routing faults are the caller's
//! mistake; configuration faults mean a service was registered with chains
//! that cannot serve the request and need an operator's attention.

use std::fmt;

use thiserror::Error;

use crate::handler::HandlerError;
use crate::method::join_types;
use crate::target::TargetAccessError;
use crate::value::ValueType;

/// Broad classification of a [`DispatchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCategory {
    /// The request named something that cannot be served.
    Routing,
    /// The service registration cannot serve a well-formed request.
    Configuration,
}

impl FaultCategory {
    /// Lower-case label used on the wire and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Routing => "routing",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for FaultCategory {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Pipeline step a handler failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    /// Argument extraction.
    ExtractArguments,
    /// Target resolution.
    ResolveTarget,
    /// Result rendering.
    RenderResult,
    /// Fault rendering.
    RenderFault,
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::ExtractArguments => "argument extraction",
            Self::ResolveTarget => "target resolution",
            Self::RenderResult => "result rendering",
            Self::RenderFault => "fault rendering",
        })
    }
}

/// Errors surfaced by [`crate::Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The path does not have the `/<service>/<method>` shape.
    #[error("malformed path: {path}")]
    MalformedPath {
        /// Offending path.
        path: String,
    },

    /// No service is registered under the name.
    #[error("unknown service: {service}")]
    UnknownService {
        /// Requested service.
        service: String,
    },

    /// The method is filtered and may not be invoked remotely.
    #[error("method '{method}' of service '{service}' is not exposed")]
    MethodFiltered {
        /// Requested service.
        service: String,
        /// Filtered method.
        method: String,
    },

    /// Every argument extractor declined the request.
    #[error("no argument extractor of service '{service}' handled the request")]
    NoArgumentExtractor {
        /// Service being invoked.
        service: String,
    },

    /// Every target resolver declined the request.
    #[error("no target resolver of service '{service}' supplied a target")]
    NoTargetResolver {
        /// Service being invoked.
        service: String,
    },

    /// No declared method accepts the runtime arguments.
    #[error("no method matches {method}({})", join_types(.argument_types))]
    NoMatchingMethod {
        /// Service being invoked.
        service: String,
        /// Requested method.
        method: String,
        /// Runtime types of the supplied arguments.
        argument_types: Vec<ValueType>,
    },

    /// The resolved target could not be used by the service's invoker.
    #[error("target of service '{service}' is unusable: {source}")]
    TargetUnavailable {
        /// Service being invoked.
        service: String,
        /// Underlying access failure.
        #[source]
        source: TargetAccessError,
    },

    /// Every result renderer declined the return value.
    #[error("no result renderer of service '{service}' accepted a {return_type} return")]
    UnrenderableResult {
        /// Service being invoked.
        service: String,
        /// Type of the return, or `void`.
        return_type: String,
    },

    /// Every fault renderer declined the fault.
    #[error("no fault renderer of service '{service}' accepted the fault: {fault}")]
    UnrenderableFault {
        /// Service being invoked.
        service: String,
        /// Display form of the fault.
        fault: String,
    },

    /// A handler failed.
    #[error("{phase} failed for {service}/{method}: {source}")]
    Handler {
        /// Service being invoked.
        service: String,
        /// Requested method.
        method: String,
        /// Step that failed.
        phase: DispatchPhase,
        /// Handler failure.
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Classifies the fault.
    #[must_use]
    pub const fn category(&self) -> FaultCategory {
        match self {
            Self::MalformedPath { .. }
            | Self::UnknownService { .. }
            | Self::MethodFiltered { .. } => FaultCategory::Routing,
            Self::NoArgumentExtractor { .. }
            | Self::NoTargetResolver { .. }
            | Self::NoMatchingMethod { .. }
            | Self::TargetUnavailable { .. }
            | Self::UnrenderableResult { .. }
            | Self::UnrenderableFault { .. }
            | Self::Handler { .. } => FaultCategory::Configuration,
        }
    }

    /// Returns the exit status a transport should report.
    ///
    /// Routing faults return status 1. Configuration faults return status 2.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self.category() {
            FaultCategory::Routing => 1,
            FaultCategory::Configuration => 2,
        }
    }

    /// Creates a malformed path error.
    pub fn malformed_path(path: impl Into<String>) -> Self {
        Self::MalformedPath { path: path.into() }
    }

    /// Creates an unknown service error.
    pub fn unknown_service(service: impl Into<String>) -> Self {
        Self::UnknownService {
            service: service.into(),
        }
    }

    /// Creates a filtered method error.
    pub fn method_filtered(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self::MethodFiltered {
            service: service.into(),
            method: method.into(),
        }
    }

    /// Creates a handler error tagged with the phase it failed in.
    pub fn handler(
        service: impl Into<String>,
        method: impl Into<String>,
        phase: DispatchPhase,
        source: HandlerError,
    ) -> Self {
        Self::Handler {
            service: service.into(),
            method: method.into(),
            phase,
            source,
        }
    }
}
