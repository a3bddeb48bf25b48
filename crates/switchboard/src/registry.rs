//! Read-only registry of services keyed by name.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::registration::{RegistrationError, ServiceDescription, ServiceRegistration};

/// Registry of services, built once at startup and read concurrently
/// afterwards without locking.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceRegistration>,
}

impl ServiceRegistry {
    /// Starts an empty builder.
    #[must_use]
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::default()
    }

    /// Looks up a service by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ServiceRegistration> {
        self.services.get(name)
    }

    /// Names of every registered service, sorted.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// Returns the number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` when no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Collects service registrations and rejects duplicate names.
#[derive(Debug, Default)]
pub struct ServiceRegistryBuilder {
    services: BTreeMap<String, ServiceRegistration>,
}

impl ServiceRegistryBuilder {
    /// Builds and adds a service.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the description is invalid or a
    /// service with the same name is already registered.
    pub fn register(&mut self, description: ServiceDescription) -> Result<(), RegistrationError> {
        let registration = description.build()?;
        match self.services.entry(registration.name().to_owned()) {
            Entry::Occupied(entry) => Err(RegistrationError::DuplicateService {
                name: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(registration);
                Ok(())
            }
        }
    }

    /// Chaining form of [`ServiceRegistryBuilder::register`].
    ///
    /// # Errors
    ///
    /// See [`ServiceRegistryBuilder::register`].
    pub fn with_service(
        mut self,
        description: ServiceDescription,
    ) -> Result<Self, RegistrationError> {
        self.register(description)?;
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> ServiceRegistry {
        ServiceRegistry {
            services: self.services,
        }
    }
}
