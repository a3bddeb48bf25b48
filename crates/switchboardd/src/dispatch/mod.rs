//! JSONL request handling for daemon connections.
//!
//! A client sends one request line and reads response lines until `exit`:
//!
//! ```json
//! {"path":"/test/echo","parameters":{"a":"[7]"}}
//! ```
//!
//! ```json
//! {"kind":"body","content_type":"application/json","data":"{...}"}
//! {"kind":"exit","status":0}
//! ```
//!
//! Dispatch failures are reported as a `fault` line with the failure's
//! category, followed by `exit` with status `1` for routing faults and `2`
//! for configuration faults. An empty path answers with a `services` line.

mod errors;
mod handler;
mod request;
mod response;

pub use self::errors::ProtocolError;
pub use self::handler::DispatchConnectionHandler;
pub use self::response::{DaemonMessage, ResponseWriter};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
