//! Bindings from service names to catalogue kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Exposes a catalogue service kind under a routable name.
///
/// Written as `name=kind`, for example `test=echo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceBinding {
    name: String,
    kind: String,
}

impl ServiceBinding {
    /// Binds `kind` under `name`.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Routable service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalogue kind providing the implementation.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

impl fmt::Display for ServiceBinding {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}={}", self.name, self.kind)
    }
}

impl FromStr for ServiceBinding {
    type Err = ServiceBindingParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (raw_name, raw_kind) = input
            .split_once('=')
            .ok_or_else(|| ServiceBindingParseError::MissingSeparator(input.to_owned()))?;
        let name = raw_name.trim();
        let kind = raw_kind.trim();
        if name.is_empty() {
            return Err(ServiceBindingParseError::EmptyName(input.to_owned()));
        }
        if kind.is_empty() {
            return Err(ServiceBindingParseError::EmptyKind(input.to_owned()));
        }
        Ok(Self::new(name, kind))
    }
}

impl TryFrom<String> for ServiceBinding {
    type Error = ServiceBindingParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServiceBinding> for String {
    fn from(binding: ServiceBinding) -> Self {
        binding.to_string()
    }
}

/// Errors encountered while parsing a [`ServiceBinding`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceBindingParseError {
    /// The text lacked the `=` separator.
    #[error("service binding '{0}' must have the form name=kind")]
    MissingSeparator(String),
    /// The name before `=` was empty.
    #[error("service binding '{0}' has an empty name")]
    EmptyName(String),
    /// The kind after `=` was empty.
    #[error("service binding '{0}' has an empty kind")]
    EmptyKind(String),
}
