//! Target resolvers for the three object scopes.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::context::InvocationContext;
use crate::dispatcher::DISPATCH_TARGET;
use crate::target::Target;

use super::{HandlerError, TargetResolver};

type Factory = Box<dyn Fn() -> Target + Send + Sync>;

fn factory<T, F>(make: F) -> Factory
where
    T: Any + Send,
    F: Fn() -> T + Send + Sync + 'static,
{
    Box::new(move || Target::new(make()))
}

/// Resolves every call to one object shared by all callers.
#[derive(Debug, Clone)]
pub struct SharedTargetResolver {
    target: Target,
}

impl SharedTargetResolver {
    /// Shares `object` between all calls.
    pub fn new<T>(object: T) -> Self
    where
        T: Any + Send,
    {
        Self::from_target(Target::new(object))
    }

    /// Shares an existing target handle.
    #[must_use]
    pub const fn from_target(target: Target) -> Self {
        Self { target }
    }

    /// Shares a default-constructed `T`.
    #[must_use]
    pub fn with_default<T>() -> Self
    where
        T: Any + Send + Default,
    {
        Self::new(T::default())
    }
}

impl TargetResolver for SharedTargetResolver {
    fn resolve(&self, _context: &InvocationContext<'_>) -> Result<Option<Target>, HandlerError> {
        Ok(Some(self.target.clone()))
    }
}

/// Resolves every call to a freshly constructed object.
pub struct PerCallTargetResolver {
    make: Factory,
}

impl PerCallTargetResolver {
    /// Builds a new object with `make` for each call.
    pub fn new<T, F>(make: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            make: factory(make),
        }
    }

    /// Builds a default-constructed `T` for each call.
    #[must_use]
    pub fn with_default<T>() -> Self
    where
        T: Any + Send + Default,
    {
        Self::new(T::default)
    }
}

impl fmt::Debug for PerCallTargetResolver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PerCallTargetResolver")
            .finish_non_exhaustive()
    }
}

impl TargetResolver for PerCallTargetResolver {
    fn resolve(&self, _context: &InvocationContext<'_>) -> Result<Option<Target>, HandlerError> {
        Ok(Some((self.make)()))
    }
}

/// Idle time after which a session's object is released.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Sessions kept before the least recently used one is released.
pub const DEFAULT_SESSION_CAPACITY: usize = 1024;

#[derive(Debug)]
struct SessionEntry {
    target: Target,
    last_used: Instant,
    sequence: u64,
}

#[derive(Debug, Default)]
struct Sessions {
    entries: HashMap<String, SessionEntry>,
    next_sequence: u64,
}

impl Sessions {
    fn expire(&mut self, now: Instant, idle_timeout: Duration) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_used) < idle_timeout);
        let expired = before.saturating_sub(self.entries.len());
        if expired > 0 {
            debug!(target: DISPATCH_TARGET, expired, "released idle sessions");
        }
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.sequence)
            .map(|(session, _)| session.clone());
        if let Some(session) = oldest {
            self.entries.remove(&session);
            debug!(
                target: DISPATCH_TARGET,
                session = %session,
                "released least recently used session"
            );
        }
    }
}

/// Resolves calls to one object per request session, created on first use.
///
/// Requests without a session identifier are declined so that a later
/// resolver in the chain may supply a target. A session's object is released
/// once it has been idle for the idle timeout, when the capacity is reached
/// and it is the least recently used, or when [`end_session`] is called.
///
/// [`end_session`]: SessionTargetResolver::end_session
pub struct SessionTargetResolver {
    make: Factory,
    idle_timeout: Duration,
    capacity: usize,
    sessions: Mutex<Sessions>,
}

impl SessionTargetResolver {
    /// Builds a new object with `make` for each new session.
    pub fn new<T, F>(make: F) -> Self
    where
        T: Any + Send,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            make: factory(make),
            idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            capacity: DEFAULT_SESSION_CAPACITY,
            sessions: Mutex::new(Sessions::default()),
        }
    }

    /// Builds a default-constructed `T` for each new session.
    #[must_use]
    pub fn with_default<T>() -> Self
    where
        T: Any + Send + Default,
    {
        Self::new(T::default)
    }

    /// Releases a session's object after `idle_timeout` without requests.
    #[must_use]
    pub const fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Keeps at most `capacity` sessions, at least one.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Releases the object owned by `session`. Returns `false` when the
    /// session had none.
    pub fn end_session(&self, session: &str) -> bool {
        self.lock_sessions().entries.remove(session).is_some()
    }

    /// Number of sessions that currently own an object.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.lock_sessions().entries.len()
    }

    fn lock_sessions(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SessionTargetResolver {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SessionTargetResolver")
            .field("idle_timeout", &self.idle_timeout)
            .field("capacity", &self.capacity)
            .field("sessions", &self.session_count())
            .finish_non_exhaustive()
    }
}

impl TargetResolver for SessionTargetResolver {
    fn resolve(&self, context: &InvocationContext<'_>) -> Result<Option<Target>, HandlerError> {
        let Some(session) = context.request().session() else {
            return Ok(None);
        };
        let now = Instant::now();
        let mut sessions = self.lock_sessions();
        sessions.expire(now, self.idle_timeout);

        let sequence = sessions.next_sequence;
        sessions.next_sequence = sequence.wrapping_add(1);
        if let Some(entry) = sessions.entries.get_mut(session) {
            entry.last_used = now;
            entry.sequence = sequence;
            return Ok(Some(entry.target.clone()));
        }

        if sessions.entries.len() >= self.capacity {
            sessions.evict_least_recent();
        }
        let target = (self.make)();
        sessions.entries.insert(
            session.to_owned(),
            SessionEntry {
                target: target.clone(),
                last_used: now,
                sequence,
            },
        );
        Ok(Some(target))
    }
}
