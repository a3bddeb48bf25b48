//! Connection handler that feeds request lines to the dispatcher.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, warn};

use switchboard::{BufferedResponse, DispatchOutcome, Dispatcher};

use crate::transport::{ConnectionHandler, ConnectionStream};

use super::DISPATCH_TARGET;
use super::errors::ProtocolError;
use super::request::{parse_request, read_request_line};
use super::response::ResponseWriter;

/// Serves one request per connection through a [`Dispatcher`].
///
/// Renderers write into a buffer, so a request that fails after a renderer
/// started writing sends only the fault to the client.
#[derive(Debug, Clone)]
pub struct DispatchConnectionHandler {
    dispatcher: Dispatcher,
}

impl DispatchConnectionHandler {
    /// Creates a handler over `dispatcher`.
    #[must_use]
    pub const fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Reads, dispatches and answers one request on `stream`.
    ///
    /// # Errors
    ///
    /// Returns the protocol error that ended the exchange early. The client
    /// has already been told about it when writing was still possible.
    pub fn serve<S>(&self, stream: &mut S) -> Result<(), ProtocolError>
    where
        S: std::io::Read + Write,
    {
        let line = match read_request_line(stream) {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!(target: DISPATCH_TARGET, "client disconnected without request");
                return Ok(());
            }
            Err(failure) => return reject(&mut ResponseWriter::new(stream), failure),
        };
        let mut writer = ResponseWriter::new(stream);
        let request = match parse_request(&line) {
            Ok(request) => request,
            Err(failure) => return reject(&mut writer, failure),
        };

        let mut response = BufferedResponse::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.dispatcher.dispatch(&request, &mut response)
        }));
        match outcome {
            Ok(Ok(DispatchOutcome::ServiceListing(services))) => {
                writer.write_services(services)?;
                writer.write_exit(0)
            }
            Ok(Ok(DispatchOutcome::Rendered | DispatchOutcome::Faulted)) => {
                let (content_type, body) = response.into_parts();
                writer.write_body(content_type, &body)?;
                writer.write_exit(0)
            }
            Ok(Err(failure)) => writer.write_dispatch_error(&failure),
            Err(_) => {
                error!(
                    target: DISPATCH_TARGET,
                    path = %request.path,
                    operator_action = true,
                    "service method panicked"
                );
                writer.write_fault(
                    "internal",
                    format!("service panicked while serving {}", request.path),
                    2,
                )
            }
        }
    }
}

fn reject<W: Write>(
    writer: &mut ResponseWriter<W>,
    failure: ProtocolError,
) -> Result<(), ProtocolError> {
    warn!(target: DISPATCH_TARGET, error = %failure, "rejected request");
    writer.write_protocol_error(&failure)?;
    Err(failure)
}

impl ConnectionHandler for DispatchConnectionHandler {
    fn handle(&self, mut stream: ConnectionStream) {
        if let Err(failure) = self.serve(&mut stream) {
            debug!(target: DISPATCH_TARGET, error = %failure, "connection closed early");
        }
    }
}
