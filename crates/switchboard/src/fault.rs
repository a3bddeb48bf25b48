//! Domain faults raised by service methods.
//!
//! A [`TargetError`] is what a service method returns when the business
//! operation itself fails. It travels through the fault-renderer chain and is
//! never confused with the framework's own [`crate::DispatchError`].

use std::error::Error;
use std::fmt;

/// Severity of a domain fault.
///
/// Renderers may distinguish recoverable exceptions from fatal errors; the
/// JSON fault renderer files them under `exception` and `error` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultSeverity {
    /// A recoverable failure of the business operation.
    #[default]
    Exception,
    /// A failure the service considers fatal.
    Error,
}

/// Fault raised by a service method, optionally caused by another fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetError {
    kind: String,
    message: String,
    severity: FaultSeverity,
    cause: Option<Box<TargetError>>,
}

impl TargetError {
    /// Creates a recoverable fault of the given kind.
    pub fn exception(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            severity: FaultSeverity::Exception,
            cause: None,
        }
    }

    /// Creates a fatal fault of the given kind.
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: FaultSeverity::Error,
            ..Self::exception(kind, message)
        }
    }

    /// Creates the fault raised when an argument cannot be read as the
    /// requested type.
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::exception("IllegalArgument", message)
    }

    /// Captures a standard error and its `source()` chain.
    ///
    /// The outermost fault takes the Rust type name of `E`; each source in the
    /// chain becomes a nested cause of kind `source`.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: Error + 'static,
    {
        let mut fault = Self::exception(std::any::type_name::<E>(), error.to_string());
        fault.cause = capture_sources(error.source()).map(Box::new);
        fault
    }

    /// Attaches the fault that caused this one.
    #[must_use]
    pub fn with_cause(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Kind of the fault, such as `InvalidUsername`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Human-readable description; may be empty.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Severity of the fault.
    #[must_use]
    pub const fn severity(&self) -> FaultSeverity {
        self.severity
    }

    /// The fault that caused this one, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_deref()
    }
}

fn capture_sources(source: Option<&(dyn Error + 'static)>) -> Option<TargetError> {
    let source = source?;
    let mut fault = TargetError::exception("source", source.to_string());
    fault.cause = capture_sources(source.source()).map(Box::new);
    Some(fault)
}

impl fmt::Display for TargetError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            formatter.write_str(&self.kind)
        } else {
            write!(formatter, "{}: {}", self.kind, self.message)
        }
    }
}

impl Error for TargetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}
