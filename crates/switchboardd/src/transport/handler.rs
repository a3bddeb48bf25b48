//! Connection streams and the handler contract.

use std::io::{self, Read, Write};
use std::net::TcpStream;
#[cfg(unix)]
use std::os::unix::net::UnixStream;

/// An accepted client connection.
#[derive(Debug)]
pub enum ConnectionStream {
    /// A TCP client.
    Tcp(TcpStream),
    /// A Unix domain socket client.
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ConnectionStream {
    fn as_read(&mut self) -> &mut dyn Read {
        match self {
            Self::Tcp(stream) => stream,
            #[cfg(unix)]
            Self::Unix(stream) => stream,
        }
    }

    fn as_write(&mut self) -> &mut dyn Write {
        match self {
            Self::Tcp(stream) => stream,
            #[cfg(unix)]
            Self::Unix(stream) => stream,
        }
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.as_read().read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.as_write().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.as_write().flush()
    }
}

/// Serves accepted connections.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Serves one connection to completion. Implementations must not panic.
    fn handle(&self, stream: ConnectionStream);
}
