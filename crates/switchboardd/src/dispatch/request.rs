//! Request line parsing.
//!
//! A request line is a JSON document with the shape of
//! [`switchboard::BasicRequest`]:
//!
//! ```json
//! {"path":"/test/echo","parameters":{"a":"[1]"},"session":"s-1"}
//! ```

use std::io::{BufRead, BufReader, Read};

use switchboard::BasicRequest;

use super::errors::ProtocolError;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Reads one newline-terminated request line.
///
/// Returns `Ok(None)` when the client disconnects before sending anything.
/// A final line without a newline is accepted at end of stream.
pub(crate) fn read_request_line<R: Read>(stream: &mut R) -> Result<Option<Vec<u8>>, ProtocolError> {
    let limit = u64::try_from(MAX_REQUEST_BYTES)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let mut reader = BufReader::new(stream.take(limit));
    let mut line = Vec::new();
    reader.read_until(b'\n', &mut line)?;
    if line.len() > MAX_REQUEST_BYTES {
        return Err(ProtocolError::RequestTooLarge {
            max_size: MAX_REQUEST_BYTES,
        });
    }
    Ok((!line.is_empty()).then_some(line))
}

/// Parses a request line, ignoring trailing whitespace.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedRequest`] for blank lines and for
/// documents that do not match the request shape.
pub(crate) fn parse_request(line: &[u8]) -> Result<BasicRequest, ProtocolError> {
    let trimmed = line.trim_ascii_end();
    if trimmed.is_empty() {
        return Err(ProtocolError::malformed("empty request line"));
    }
    serde_json::from_slice(trimmed).map_err(ProtocolError::from_json_error)
}
