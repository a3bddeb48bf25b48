//! Type-erased handles to service objects.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::dispatcher::DISPATCH_TARGET;

/// Shareable handle to the object a method is invoked on.
///
/// Target resolvers hand these out; cloning a `Target` shares the underlying
/// object. The inner mutex only makes shared mutation sound. Serialising
/// invocations is the job of the per-service lock held by the dispatcher.
#[derive(Clone)]
pub struct Target {
    object: Arc<Mutex<dyn Any + Send>>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Target {
    /// Wraps a freshly created service object.
    pub fn new<T>(object: T) -> Self
    where
        T: Any + Send,
    {
        Self::from_shared(Arc::new(Mutex::new(object)))
    }

    /// Wraps an object that is already shared elsewhere.
    pub fn from_shared<T>(object: Arc<Mutex<T>>) -> Self
    where
        T: Any + Send,
    {
        Self {
            object,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Type identity of the wrapped object.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Type name of the wrapped object.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Runs `f` with exclusive access to the object as a `T`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetAccessError::TypeMismatch`] when the object is not a
    /// `T`.
    pub fn with_mut<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, TargetAccessError>
    where
        T: Any + Send,
    {
        if self.type_id != TypeId::of::<T>() {
            return Err(TargetAccessError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                actual: self.type_name,
            });
        }
        let mut guard = self.lock_recovering();
        let object: &mut (dyn Any + Send) = &mut *guard;
        object
            .downcast_mut::<T>()
            .map(f)
            .ok_or(TargetAccessError::TypeMismatch {
                expected: std::any::type_name::<T>(),
                actual: self.type_name,
            })
    }

    /// Locks the object. A panic in an earlier invocation leaves the object
    /// as that invocation left it; the poison flag is cleared and the object
    /// stays in service, as the per-service lock does.
    fn lock_recovering(&self) -> MutexGuard<'_, dyn Any + Send> {
        self.object.lock().unwrap_or_else(|poisoned| {
            warn!(
                target: DISPATCH_TARGET,
                type_name = self.type_name,
                "recovered service object poisoned by an earlier panic"
            );
            self.object.clear_poison();
            poisoned.into_inner()
        })
    }

    /// Returns `true` when both handles share the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.object, &other.object)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Target")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Errors raised while accessing a [`Target`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetAccessError {
    /// The target holds a different type than the method table expects.
    #[error("target of type {actual} cannot be used as {expected}")]
    TypeMismatch {
        /// Type the method table was built for.
        expected: &'static str,
        /// Type actually held by the target.
        actual: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter(u32);

    #[test]
    fn mutations_are_visible_through_clones() {
        let target = Target::new(Counter::default());
        let clone = target.clone();
        clone
            .with_mut(|counter: &mut Counter| counter.0 += 1)
            .expect("access clone");
        let value = target
            .with_mut(|counter: &mut Counter| counter.0)
            .expect("access original");
        assert_eq!(value, 1);
        assert!(target.ptr_eq(&clone));
    }

    #[test]
    fn panics_while_holding_the_object_do_not_disable_it() {
        let target = Target::new(Counter::default());
        let shared = target.clone();
        let joined = std::thread::spawn(move || {
            shared.with_mut(|counter: &mut Counter| -> u32 {
                counter.0 = 5;
                panic!("method failed mid-update");
            })
        })
        .join();
        assert!(joined.is_err(), "the closure should panic");

        let value = target
            .with_mut(|counter: &mut Counter| {
                counter.0 += 1;
                counter.0
            })
            .expect("access after panic");
        assert_eq!(value, 6);
    }

    #[test]
    fn rejects_wrong_type() {
        let target = Target::new(Counter::default());
        let error = target
            .with_mut(|_: &mut String| ())
            .expect_err("type mismatch");
        assert!(matches!(error, TargetAccessError::TypeMismatch { .. }));
        assert!(error.to_string().contains("Counter"));
    }
}
