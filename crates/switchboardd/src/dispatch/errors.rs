//! Failures of the wire protocol itself, as opposed to dispatch faults.

use std::io;

use thiserror::Error;

/// Errors raised while reading a request line or writing responses.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request line is not a valid request document.
    #[error("malformed request: {message}")]
    MalformedRequest {
        /// Parser diagnostic.
        message: String,
        /// Underlying JSON error, when there is one.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The request line exceeds the size limit.
    #[error("request too large: more than {max_size} bytes")]
    RequestTooLarge {
        /// Limit in bytes.
        max_size: usize,
    },

    /// Reading from or writing to the client failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A response message could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Exit status reported to the client: `1` when the client sent a bad
    /// request, `2` when the daemon failed.
    #[must_use]
    pub const fn exit_status(&self) -> i32 {
        match self {
            Self::MalformedRequest { .. } | Self::RequestTooLarge { .. } => 1,
            Self::Io(_) | Self::Serialize(_) => 2,
        }
    }

    /// Category label written in fault messages.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::MalformedRequest { .. } | Self::RequestTooLarge { .. } => "protocol",
            Self::Io(_) | Self::Serialize(_) => "internal",
        }
    }

    /// Creates a malformed request error from a JSON parse failure.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed request error with a custom message.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }
}
