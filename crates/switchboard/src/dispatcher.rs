//! The dispatch orchestrator.
//!
//! A request moves through routing, registry lookup and the method filter
//! before the per-service lock is taken. Everything from argument extraction
//! to rendering then runs under that lock, and the guard releases it on every
//! exit path.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::context::{InvocationContext, Request, Response};
use crate::error::{DispatchError, DispatchPhase, FaultCategory};
use crate::fault::TargetError;
use crate::handler::first_authoritative;
use crate::method::InvokeError;
use crate::registration::ServiceRegistration;
use crate::registry::ServiceRegistry;
use crate::router::{RouteOutcome, route};
use crate::value::ReturnValue;

/// Tracing target for dispatch events.
pub const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// How a dispatch finished when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The path was empty; the names of every registered service, sorted.
    ServiceListing(Vec<String>),
    /// The method returned and a result renderer wrote the response.
    Rendered,
    /// The method raised a domain fault and a fault renderer wrote it.
    Faulted,
}

/// Routes requests to registered services.
///
/// Cloning is cheap; clones share the registry.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Registry this dispatcher routes to.
    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Serves one request, writing any rendered output to `response`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for routing faults and for registrations
    /// whose handler chains cannot serve the request. Domain faults raised
    /// by the method are rendered and reported as
    /// [`DispatchOutcome::Faulted`] instead.
    pub fn dispatch(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
    ) -> Result<DispatchOutcome, DispatchError> {
        let result = self.route_and_invoke(request, response);
        if let Err(failure) = &result {
            log_failure(failure);
        }
        result
    }

    fn route_and_invoke(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
    ) -> Result<DispatchOutcome, DispatchError> {
        let path = request.path();
        let (service, method) = match route(path) {
            RouteOutcome::ListServices => {
                return Ok(DispatchOutcome::ServiceListing(self.registry.service_names()));
            }
            RouteOutcome::Malformed => return Err(DispatchError::malformed_path(path)),
            RouteOutcome::Invoke { service, method } => (service, method),
        };

        let registration = self
            .registry
            .lookup(service)
            .ok_or_else(|| DispatchError::unknown_service(service))?;
        if registration.is_filtered(method) {
            return Err(DispatchError::method_filtered(service, method));
        }

        let (_guard, recovered) = registration.acquire();
        if recovered {
            warn!(
                target: DISPATCH_TARGET,
                service,
                "recovered service lock poisoned by an earlier panic"
            );
        }
        debug!(target: DISPATCH_TARGET, service, method, "dispatching request");

        let mut context = InvocationContext::new(
            registration.name(),
            registration.service_type(),
            method,
            request,
            response,
            registration.chains(),
            registration.filtered_methods(),
        );
        invoke_locked(registration, method, &mut context)
    }
}

fn invoke_locked(
    registration: &ServiceRegistration,
    method: &str,
    context: &mut InvocationContext<'_>,
) -> Result<DispatchOutcome, DispatchError> {
    let service = registration.name();
    let chains = registration.chains();

    let arguments = first_authoritative(chains.argument_extractors(), |extractor| {
        extractor.extract(&*context)
    })
    .map_err(|source| {
        DispatchError::handler(service, method, DispatchPhase::ExtractArguments, source)
    })?
    .ok_or_else(|| DispatchError::NoArgumentExtractor {
        service: service.to_owned(),
    })?;

    let target = first_authoritative(chains.target_resolvers(), |resolver| {
        resolver.resolve(&*context)
    })
    .map_err(|source| {
        DispatchError::handler(service, method, DispatchPhase::ResolveTarget, source)
    })?
    .ok_or_else(|| DispatchError::NoTargetResolver {
        service: service.to_owned(),
    })?;

    let invocation = registration
        .invoker()
        .invoke(&target, method, &arguments)
        .map_err(|failure| match failure {
            InvokeError::NoMatchingMethod {
                method,
                argument_types,
            } => DispatchError::NoMatchingMethod {
                service: service.to_owned(),
                method,
                argument_types,
            },
            InvokeError::Target(source) => DispatchError::TargetUnavailable {
                service: service.to_owned(),
                source,
            },
        })?;
    context.select(invocation.signature);

    match invocation.outcome {
        Ok(value) => {
            render_result(registration, method, context, &value)?;
            Ok(DispatchOutcome::Rendered)
        }
        Err(fault) => {
            info!(
                target: DISPATCH_TARGET,
                service,
                method = %context.method_label(),
                fault = %fault,
                "service method raised a fault"
            );
            render_fault(registration, method, context, &fault)?;
            Ok(DispatchOutcome::Faulted)
        }
    }
}

fn render_result(
    registration: &ServiceRegistration,
    method: &str,
    context: &mut InvocationContext<'_>,
    value: &ReturnValue,
) -> Result<(), DispatchError> {
    let service = registration.name();
    first_authoritative(registration.chains().result_renderers(), |renderer| {
        renderer
            .render(context, value)
            .map(|rendered| rendered.then_some(()))
    })
    .map_err(|source| DispatchError::handler(service, method, DispatchPhase::RenderResult, source))?
    .ok_or_else(|| DispatchError::UnrenderableResult {
        service: service.to_owned(),
        return_type: value.type_name().to_owned(),
    })
}

fn render_fault(
    registration: &ServiceRegistration,
    method: &str,
    context: &mut InvocationContext<'_>,
    fault: &TargetError,
) -> Result<(), DispatchError> {
    let service = registration.name();
    first_authoritative(registration.chains().fault_renderers(), |renderer| {
        renderer
            .render(context, fault)
            .map(|rendered| rendered.then_some(()))
    })
    .map_err(|source| DispatchError::handler(service, method, DispatchPhase::RenderFault, source))?
    .ok_or_else(|| DispatchError::UnrenderableFault {
        service: service.to_owned(),
        fault: fault.to_string(),
    })
}

fn log_failure(failure: &DispatchError) {
    match failure.category() {
        FaultCategory::Routing => {
            debug!(target: DISPATCH_TARGET, error = %failure, "request rejected");
        }
        FaultCategory::Configuration => {
            error!(
                target: DISPATCH_TARGET,
                operator_action = true,
                error = %failure,
                "service cannot serve request"
            );
        }
    }
}
