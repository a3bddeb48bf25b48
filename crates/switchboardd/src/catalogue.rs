//! Built-in service kinds and registry assembly from configuration.
//!
//! Configuration binds public service names to kinds (`test=echo`). The
//! catalogue turns each binding into a [`ServiceDescription`] with the
//! handler chains that kind needs, then builds the immutable registry.

use std::fmt;
use std::str::FromStr;

use switchboard::{
    PerCallTargetResolver, RegistrationError, ServiceDescription, ServiceRegistry, presets,
};
use switchboard_config::ServiceBinding;
use thiserror::Error;

use crate::services::{ChatService, EchoService, RandomService};

/// Service implementations the daemon knows how to host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    /// [`EchoService`], one instance per session.
    Echo,
    /// [`ChatService`], one instance shared by every caller.
    Chat,
    /// [`RandomService`], one instance per session.
    Random,
}

impl ServiceKind {
    /// Describes a service of this kind registered under `name`.
    ///
    /// Echo services keep one object per session and fall back to a fresh
    /// object per call for requests that carry no session.
    #[must_use]
    pub fn describe(self, name: &str) -> ServiceDescription {
        match self {
            Self::Echo => presets::json_session_service::<EchoService>(name)
                .target_resolver(PerCallTargetResolver::with_default::<EchoService>()),
            Self::Chat => presets::json_shared_service::<ChatService>(name),
            Self::Random => presets::json_session_service::<RandomService>(name),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Echo => "echo",
            Self::Chat => "chat",
            Self::Random => "random",
        };
        formatter.write_str(label)
    }
}

/// Error returned when a service kind is not in the catalogue.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported service kind: {0}")]
pub struct ServiceKindParseError(String);

impl ServiceKindParseError {
    /// Returns the offending value that could not be parsed.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for ServiceKind {
    type Err = ServiceKindParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "echo" => Ok(Self::Echo),
            "chat" => Ok(Self::Chat),
            "random" => Ok(Self::Random),
            other => Err(ServiceKindParseError(other.to_owned())),
        }
    }
}

/// Errors raised while assembling the registry from configuration.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// A binding names a kind the catalogue does not provide.
    #[error("service {name} is bound to an unknown kind: {source}")]
    UnknownKind {
        /// Service name from the binding.
        name: String,
        /// Parse failure for the kind.
        #[source]
        source: ServiceKindParseError,
    },
    /// The registry rejected a service.
    #[error("failed to register service: {source}")]
    Registration {
        /// Underlying registration error.
        #[source]
        source: RegistrationError,
    },
}

/// Builds the registry for the configured service bindings.
///
/// # Errors
///
/// Fails when a binding names an unknown kind, or when the registry rejects
/// a name (empty, containing `/`, or registered twice).
pub fn build_registry(bindings: &[ServiceBinding]) -> Result<ServiceRegistry, CatalogueError> {
    let mut builder = ServiceRegistry::builder();
    for binding in bindings {
        let kind = binding
            .kind()
            .parse::<ServiceKind>()
            .map_err(|source| CatalogueError::UnknownKind {
                name: binding.name().to_owned(),
                source,
            })?;
        builder
            .register(kind.describe(binding.name()))
            .map_err(|source| CatalogueError::Registration { source })?;
    }
    Ok(builder.build())
}
