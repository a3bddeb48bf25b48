//! Non-blocking accept loop on a background thread.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use switchboard_config::SocketEndpoint;

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET, ListenerError};

#[cfg(unix)]
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;
#[cfg(unix)]
use std::os::unix::net::{UnixListener, UnixStream};
#[cfg(unix)]
use std::path::Path;

/// Pause between polls when no connection is pending.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(25);
/// Pause after an accept error before polling again.
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

#[derive(Debug)]
enum Bound {
    Tcp(TcpListener),
    #[cfg(unix)]
    Unix(UnixListener),
}

impl Bound {
    fn set_nonblocking(&self) -> io::Result<()> {
        match self {
            Self::Tcp(listener) => listener.set_nonblocking(true),
            #[cfg(unix)]
            Self::Unix(listener) => listener.set_nonblocking(true),
        }
    }

    /// Returns `Ok(None)` when no client is waiting.
    fn accept(&self) -> io::Result<Option<ConnectionStream>> {
        let accepted = match self {
            Self::Tcp(listener) => listener.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Tcp(stream))
            }),
            #[cfg(unix)]
            Self::Unix(listener) => listener.accept().and_then(|(stream, _)| {
                stream.set_nonblocking(false)?;
                Ok(ConnectionStream::Unix(stream))
            }),
        };
        match accepted {
            Ok(stream) => Ok(Some(stream)),
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Listener bound to a configured endpoint, not yet accepting.
#[derive(Debug)]
pub struct SocketListener {
    endpoint: SocketEndpoint,
    bound: Bound,
}

impl SocketListener {
    /// Binds `endpoint`, reclaiming a stale Unix socket file if one is left
    /// over from an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the address does not resolve, the bind
    /// fails, or a live process already owns the Unix socket.
    pub fn bind(endpoint: &SocketEndpoint) -> Result<Self, ListenerError> {
        let bound = match endpoint {
            SocketEndpoint::Tcp { host, port } => Bound::Tcp(bind_tcp(host, *port)?),
            #[cfg(unix)]
            SocketEndpoint::Unix { path } => Bound::Unix(bind_unix(path.as_std_path())?),
            #[cfg(not(unix))]
            SocketEndpoint::Unix { .. } => {
                return Err(ListenerError::UnsupportedUnix {
                    endpoint: endpoint.to_string(),
                });
            }
        };
        Ok(Self {
            endpoint: endpoint.clone(),
            bound,
        })
    }

    /// Address of a TCP listener; `None` for Unix sockets.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.bound {
            Bound::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Bound::Unix(_) => None,
        }
    }

    /// Starts accepting on a background thread; each connection is served
    /// by `handler` on a thread of its own.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::NonBlocking`] when the socket cannot be
    /// switched to non-blocking mode.
    pub fn start(
        self,
        handler: Arc<dyn ConnectionHandler>,
    ) -> Result<ListenerHandle, ListenerError> {
        if let Err(source) = self.bound.set_nonblocking() {
            self.remove_socket_file();
            return Err(ListenerError::NonBlocking { source });
        }
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || self.serve(&flag, &handler));
        Ok(ListenerHandle {
            stop,
            thread: Some(thread),
        })
    }

    fn serve(self, stop: &AtomicBool, handler: &Arc<dyn ConnectionHandler>) {
        info!(
            target: LISTENER_TARGET,
            endpoint = %self.endpoint,
            "socket listener active"
        );
        let mut last_error = None::<io::ErrorKind>;
        while !stop.load(Ordering::SeqCst) {
            match self.bound.accept() {
                Ok(Some(stream)) => {
                    last_error = None;
                    let connection_handler = Arc::clone(handler);
                    thread::spawn(move || connection_handler.handle(stream));
                }
                Ok(None) => thread::sleep(ACCEPT_BACKOFF),
                Err(error) => {
                    // Repeated failures of the same kind are logged once.
                    if last_error != Some(error.kind()) {
                        warn!(target: LISTENER_TARGET, %error, "socket accept error");
                    }
                    last_error = Some(error.kind());
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        self.remove_socket_file();
        debug!(target: LISTENER_TARGET, endpoint = %self.endpoint, "socket listener stopped");
    }

    fn remove_socket_file(&self) {
        #[cfg(unix)]
        remove_unix_socket(&self.endpoint);
    }
}

/// Controls the background accept thread. Dropping the handle stops the
/// loop without waiting for it.
#[derive(Debug)]
pub struct ListenerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ListenerHandle {
    /// Asks the accept loop to stop after its current poll.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Waits for the accept loop to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] when the accept thread panicked.
    pub fn join(mut self) -> Result<(), ListenerError> {
        self.thread
            .take()
            .map_or(Ok(()), |thread| thread.join().map_err(|_| ListenerError::ThreadPanic))
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn bind_tcp(host: &str, port: u16) -> Result<TcpListener, ListenerError> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|source| ListenerError::Resolve {
            host: host.to_owned(),
            port,
            source,
        })?
        .next()
        .ok_or_else(|| ListenerError::ResolveEmpty {
            host: host.to_owned(),
            port,
        })?;
    TcpListener::bind(addr).map_err(|source| ListenerError::BindTcp { addr, source })
}

#[cfg(unix)]
fn bind_unix(path: &Path) -> Result<UnixListener, ListenerError> {
    let display = || path.display().to_string();
    match fs::symlink_metadata(path) {
        Ok(metadata) if !metadata.file_type().is_socket() => {
            return Err(ListenerError::UnixNotSocket { path: display() });
        }
        Ok(_) => reclaim_stale_socket(path)?,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(ListenerError::UnixReclaim {
                path: display(),
                source,
            });
        }
    }
    UnixListener::bind(path).map_err(|source| ListenerError::BindUnix {
        path: display(),
        source,
    })
}

#[cfg(unix)]
fn remove_unix_socket(endpoint: &SocketEndpoint) {
    let SocketEndpoint::Unix { path } = endpoint else {
        return;
    };
    if let Err(error) = fs::remove_file(path.as_std_path())
        && error.kind() != io::ErrorKind::NotFound
    {
        warn!(
            target: LISTENER_TARGET,
            %error,
            path = %path,
            "failed to remove unix socket file"
        );
    }
}

/// Removes a socket file nobody is listening on; refuses a live one.
#[cfg(unix)]
fn reclaim_stale_socket(path: &Path) -> Result<(), ListenerError> {
    match UnixStream::connect(path) {
        Ok(_) => Err(ListenerError::UnixInUse {
            path: path.display().to_string(),
        }),
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound
            ) =>
        {
            fs::remove_file(path).map_err(|source| ListenerError::UnixReclaim {
                path: path.display().to_string(),
                source,
            })
        }
        Err(source) => Err(ListenerError::UnixReclaim {
            path: path.display().to_string(),
            source,
        }),
    }
}
