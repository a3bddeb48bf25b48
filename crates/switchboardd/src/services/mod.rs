//! Sample services hosted by the daemon.
//!
//! `echo` mirrors its arguments back and keeps a value per session; `chat`
//! is a single room shared by every caller. `random` generates strings and
//! remembers the last one per session.

mod chat;
mod echo;
mod random;

pub use self::chat::ChatService;
pub use self::echo::EchoService;
pub use self::random::RandomService;

const SERVICES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::services");
