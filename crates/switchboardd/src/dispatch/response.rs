//! Response messages and their JSONL framing.

use std::io::Write;

use serde::Serialize;
use switchboard::DispatchError;

use super::errors::ProtocolError;

/// Response messages sent to clients, one JSON object per line.
///
/// Every exchange ends with an [`DaemonMessage::Exit`] line.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DaemonMessage {
    /// Output written by a result or fault renderer.
    Body {
        /// Media type set by the renderer.
        #[serde(skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
        /// Body text.
        data: String,
    },
    /// Registered service names, in sorted order.
    Services {
        /// Service names.
        services: Vec<String>,
    },
    /// A request the daemon could not serve.
    Fault {
        /// `routing`, `configuration`, `protocol` or `internal`.
        category: String,
        /// Human-readable description.
        message: String,
    },
    /// Terminal message carrying the exit status.
    Exit {
        /// `0` on success, `1` for client errors, `2` for daemon errors.
        status: i32,
    },
}

/// Writes [`DaemonMessage`]s as JSON lines.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Wraps an output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one message followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_message(&mut self, message: &DaemonMessage) -> Result<(), ProtocolError> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    /// Writes a rendered body.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_body(
        &mut self,
        content_type: Option<String>,
        body: &[u8],
    ) -> Result<(), ProtocolError> {
        self.write_message(&DaemonMessage::Body {
            content_type,
            data: String::from_utf8_lossy(body).into_owned(),
        })
    }

    /// Writes the service listing.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_services(&mut self, services: Vec<String>) -> Result<(), ProtocolError> {
        self.write_message(&DaemonMessage::Services { services })
    }

    /// Writes an exit message and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_exit(&mut self, status: i32) -> Result<(), ProtocolError> {
        self.write_message(&DaemonMessage::Exit { status })?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes a fault followed by an exit with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_fault(
        &mut self,
        category: &str,
        message: String,
        status: i32,
    ) -> Result<(), ProtocolError> {
        self.write_message(&DaemonMessage::Fault {
            category: category.to_owned(),
            message,
        })?;
        self.write_exit(status)
    }

    /// Reports a dispatch failure.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_dispatch_error(&mut self, error: &DispatchError) -> Result<(), ProtocolError> {
        self.write_fault(
            error.category().as_str(),
            error.to_string(),
            error.exit_status(),
        )
    }

    /// Reports a protocol failure.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_protocol_error(&mut self, error: &ProtocolError) -> Result<(), ProtocolError> {
        self.write_fault(error.category(), error.to_string(), error.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(write: impl FnOnce(&mut ResponseWriter<&mut Vec<u8>>)) -> String {
        let mut output = Vec::new();
        write(&mut ResponseWriter::new(&mut output));
        String::from_utf8(output).expect("valid utf8")
    }

    #[test]
    fn writes_exit_message() {
        let response = written(|writer| writer.write_exit(0).expect("write exit"));
        assert_eq!(response, "{\"kind\":\"exit\",\"status\":0}\n");
    }

    #[test]
    fn body_omits_missing_content_type() {
        let response = written(|writer| writer.write_body(None, b"7").expect("write body"));
        assert_eq!(response, "{\"kind\":\"body\",\"data\":\"7\"}\n");
    }

    #[test]
    fn dispatch_errors_carry_category_and_status() {
        let error = DispatchError::unknown_service("nope");
        let response = written(|writer| writer.write_dispatch_error(&error).expect("write error"));
        let lines = response.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                r#"{"kind":"fault","category":"routing","message":"unknown service: nope"}"#,
                r#"{"kind":"exit","status":1}"#,
            ]
        );
    }

    #[test]
    fn protocol_errors_are_client_errors() {
        let error = ProtocolError::malformed("empty request line");
        let response = written(|writer| writer.write_protocol_error(&error).expect("write error"));
        assert!(response.contains(r#""category":"protocol""#));
        assert!(response.contains(r#""status":1"#));
    }
}
