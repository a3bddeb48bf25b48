//! Service registrations and the builder that assembles them.

use std::any::{Any, TypeId};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::handler::{
    ArgumentExtractor, FaultRenderer, HandlerChains, ResultRenderer, TargetResolver,
};
use crate::method::{Exposed, Invoker, MethodTable, method_table};
use crate::router::PATH_SEPARATOR;

/// Identity of the type a service is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    /// Identity of `T`.
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: Any,
    {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Type identity.
    #[must_use]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name)
    }
}

/// Everything the dispatcher needs to serve one service.
///
/// Registrations are immutable once built. The embedded lock serialises
/// every invocation on the service, whichever method is called.
pub struct ServiceRegistration {
    name: String,
    service_type: ServiceType,
    invoker: Arc<dyn Invoker>,
    chains: HandlerChains,
    filtered_methods: BTreeSet<String>,
    lock: Mutex<()>,
}

impl ServiceRegistration {
    /// Name the service is routed by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type bound to the service.
    #[must_use]
    pub const fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    /// Invoker for the bound type.
    #[must_use]
    pub fn invoker(&self) -> &dyn Invoker {
        self.invoker.as_ref()
    }

    /// Handler chains of the service.
    #[must_use]
    pub const fn chains(&self) -> &HandlerChains {
        &self.chains
    }

    /// Methods that may never be invoked remotely.
    #[must_use]
    pub const fn filtered_methods(&self) -> &BTreeSet<String> {
        &self.filtered_methods
    }

    /// Returns `true` when `method` is filtered.
    #[must_use]
    pub fn is_filtered(&self, method: &str) -> bool {
        self.filtered_methods.contains(method)
    }

    /// Acquires the per-service lock, recovering it if a previous holder
    /// panicked. The flag reports whether recovery happened.
    pub(crate) fn acquire(&self) -> (MutexGuard<'_, ()>, bool) {
        match self.lock.lock() {
            Ok(guard) => (guard, false),
            Err(poisoned) => {
                self.lock.clear_poison();
                (poisoned.into_inner(), true)
            }
        }
    }
}

impl fmt::Debug for ServiceRegistration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServiceRegistration")
            .field("name", &self.name)
            .field("service_type", &self.service_type)
            .field("chains", &self.chains)
            .field("filtered_methods", &self.filtered_methods)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`ServiceRegistration`].
///
/// # Examples
///
/// ```
/// use switchboard::{
///     Exposed, JsonArgumentExtractor, JsonResultRenderer, MethodTable, PerCallTargetResolver,
///     ServiceDescription,
/// };
///
/// #[derive(Default)]
/// struct Clock;
///
/// impl Exposed for Clock {
///     fn methods() -> MethodTable<Self> {
///         MethodTable::<Self>::builder().build()
///     }
/// }
///
/// let registration = ServiceDescription::new::<Clock>("clock")
///     .argument_extractor(JsonArgumentExtractor::default())
///     .target_resolver(PerCallTargetResolver::with_default::<Clock>())
///     .result_renderer(JsonResultRenderer)
///     .filter_method("reset")
///     .build()
///     .expect("valid registration");
/// assert!(registration.is_filtered("reset"));
/// ```
pub struct ServiceDescription {
    name: String,
    service_type: ServiceType,
    invoker: Arc<dyn Invoker>,
    chains: HandlerChains,
    filtered_methods: BTreeSet<String>,
}

impl ServiceDescription {
    /// Describes a service bound to an [`Exposed`] type.
    pub fn new<T>(name: impl Into<String>) -> Self
    where
        T: Exposed,
    {
        Self::with_table(name, method_table::<T>())
    }

    /// Describes a service bound to `T` using an explicit method table.
    pub fn with_table<T>(name: impl Into<String>, table: Arc<MethodTable<T>>) -> Self
    where
        T: Any + Send,
    {
        Self {
            name: name.into(),
            service_type: ServiceType::of::<T>(),
            invoker: table,
            chains: HandlerChains::default(),
            filtered_methods: BTreeSet::new(),
        }
    }

    /// Name the service will be routed by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends an argument extractor to the chain.
    #[must_use]
    pub fn argument_extractor(mut self, handler: impl ArgumentExtractor + 'static) -> Self {
        self.chains.push_argument_extractor(Arc::new(handler));
        self
    }

    /// Appends a target resolver to the chain.
    #[must_use]
    pub fn target_resolver(mut self, handler: impl TargetResolver + 'static) -> Self {
        self.chains.push_target_resolver(Arc::new(handler));
        self
    }

    /// Appends a result renderer to the chain.
    #[must_use]
    pub fn result_renderer(mut self, handler: impl ResultRenderer + 'static) -> Self {
        self.chains.push_result_renderer(Arc::new(handler));
        self
    }

    /// Appends a fault renderer to the chain.
    #[must_use]
    pub fn fault_renderer(mut self, handler: impl FaultRenderer + 'static) -> Self {
        self.chains.push_fault_renderer(Arc::new(handler));
        self
    }

    /// Prevents `method` from being invoked remotely.
    #[must_use]
    pub fn filter_method(mut self, method: impl Into<String>) -> Self {
        self.filtered_methods.insert(method.into());
        self
    }

    /// Validates the name and freezes the registration.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the name is empty or contains the
    /// path separator.
    pub fn build(self) -> Result<ServiceRegistration, RegistrationError> {
        if self.name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.name.contains(PATH_SEPARATOR) {
            return Err(RegistrationError::InvalidName { name: self.name });
        }
        Ok(ServiceRegistration {
            name: self.name,
            service_type: self.service_type,
            invoker: self.invoker,
            chains: self.chains,
            filtered_methods: self.filtered_methods,
            lock: Mutex::new(()),
        })
    }
}

impl fmt::Debug for ServiceDescription {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ServiceDescription")
            .field("name", &self.name)
            .field("service_type", &self.service_type)
            .field("chains", &self.chains)
            .field("filtered_methods", &self.filtered_methods)
            .finish_non_exhaustive()
    }
}

/// Errors raised while registering services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The service name is empty.
    #[error("service name must not be empty")]
    EmptyName,
    /// The service name cannot be routed.
    #[error("service name '{name}' must not contain '/'")]
    InvalidName {
        /// Rejected name.
        name: String,
    },
    /// Another service already uses the name.
    #[error("service '{name}' is already registered")]
    DuplicateService {
        /// Conflicting name.
        name: String,
    },
}
