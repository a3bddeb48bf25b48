//! Handler contracts and the chains a service registration carries.
//!
//! Each contract is a capability trait. A service holds one ordered chain per
//! contract and the dispatcher walks it front to back: the first handler that
//! answers authoritatively wins and later handlers are never consulted.

mod json;
mod target;
mod text;

use std::io;
use std::ops::ControlFlow;
use std::sync::Arc;

use thiserror::Error;

use crate::context::InvocationContext;
use crate::fault::TargetError;
use crate::target::Target;
use crate::value::{ReturnValue, Value};

pub use json::{
    DEFAULT_ARGUMENTS_PARAMETER, JSON_CONTENT_TYPE, JsonArgumentExtractor, JsonFaultRenderer,
    JsonResultRenderer,
};
pub use target::{
    DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TIMEOUT, PerCallTargetResolver,
    SessionTargetResolver, SharedTargetResolver,
};
pub use text::{PLAIN_TEXT_CONTENT_TYPE, PlainTextRenderer};

/// Produces the argument values for an invocation.
pub trait ArgumentExtractor: Send + Sync {
    /// Returns `Ok(None)` when this extractor cannot handle the request. An
    /// empty list is an authoritative zero-argument answer.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the request claims to carry arguments
    /// this extractor understands but they cannot be decoded.
    fn extract(&self, context: &InvocationContext<'_>) -> Result<Option<Vec<Value>>, HandlerError>;
}

/// Supplies the object a method is invoked on.
pub trait TargetResolver: Send + Sync {
    /// Returns `Ok(None)` when this resolver cannot supply a target.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the target cannot be produced.
    fn resolve(&self, context: &InvocationContext<'_>) -> Result<Option<Target>, HandlerError>;
}

/// Writes a successful return into the response.
pub trait ResultRenderer: Send + Sync {
    /// Returns `Ok(true)` once the result has been written.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when encoding or writing fails.
    fn render(
        &self,
        context: &mut InvocationContext<'_>,
        value: &ReturnValue,
    ) -> Result<bool, HandlerError>;
}

/// Writes a domain fault into the response.
pub trait FaultRenderer: Send + Sync {
    /// Returns `Ok(true)` once the fault has been written.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when encoding or writing fails.
    fn render(
        &self,
        context: &mut InvocationContext<'_>,
        fault: &TargetError,
    ) -> Result<bool, HandlerError>;
}

/// The four ordered handler chains of a service.
#[derive(Clone, Default)]
pub struct HandlerChains {
    argument_extractors: Vec<Arc<dyn ArgumentExtractor>>,
    target_resolvers: Vec<Arc<dyn TargetResolver>>,
    result_renderers: Vec<Arc<dyn ResultRenderer>>,
    fault_renderers: Vec<Arc<dyn FaultRenderer>>,
}

impl HandlerChains {
    /// Argument extractors in registration order.
    #[must_use]
    pub fn argument_extractors(&self) -> &[Arc<dyn ArgumentExtractor>] {
        &self.argument_extractors
    }

    /// Target resolvers in registration order.
    #[must_use]
    pub fn target_resolvers(&self) -> &[Arc<dyn TargetResolver>] {
        &self.target_resolvers
    }

    /// Result renderers in registration order.
    #[must_use]
    pub fn result_renderers(&self) -> &[Arc<dyn ResultRenderer>] {
        &self.result_renderers
    }

    /// Fault renderers in registration order.
    #[must_use]
    pub fn fault_renderers(&self) -> &[Arc<dyn FaultRenderer>] {
        &self.fault_renderers
    }

    pub(crate) fn push_argument_extractor(&mut self, handler: Arc<dyn ArgumentExtractor>) {
        self.argument_extractors.push(handler);
    }

    pub(crate) fn push_target_resolver(&mut self, handler: Arc<dyn TargetResolver>) {
        self.target_resolvers.push(handler);
    }

    pub(crate) fn push_result_renderer(&mut self, handler: Arc<dyn ResultRenderer>) {
        self.result_renderers.push(handler);
    }

    pub(crate) fn push_fault_renderer(&mut self, handler: Arc<dyn FaultRenderer>) {
        self.fault_renderers.push(handler);
    }
}

impl std::fmt::Debug for HandlerChains {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HandlerChains")
            .field("argument_extractors", &self.argument_extractors.len())
            .field("target_resolvers", &self.target_resolvers.len())
            .field("result_renderers", &self.result_renderers.len())
            .field("fault_renderers", &self.fault_renderers.len())
            .finish()
    }
}

/// Walks `chain` until a handler answers, returning that answer.
///
/// `Ok(None)` means every handler declined. A handler error stops the walk.
pub(crate) fn first_authoritative<H, R>(
    chain: &[Arc<H>],
    mut attempt: impl FnMut(&H) -> Result<Option<R>, HandlerError>,
) -> Result<Option<R>, HandlerError>
where
    H: ?Sized,
{
    let flow = chain
        .iter()
        .try_for_each(|handler| match attempt(&**handler) {
            Ok(None) => ControlFlow::Continue(()),
            Ok(Some(answer)) => ControlFlow::Break(Ok(answer)),
            Err(error) => ControlFlow::Break(Err(error)),
        });
    match flow {
        ControlFlow::Continue(()) => Ok(None),
        ControlFlow::Break(answer) => answer.map(Some),
    }
}

/// Failures raised by handlers while processing a request.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request carried arguments that could not be decoded.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// What was wrong with the arguments.
        message: String,
        /// Underlying decode failure.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// Writing to the response failed.
    #[error("failed to write response: {0}")]
    Io(#[from] io::Error),
    /// Encoding the response failed.
    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
    /// Any other handler failure.
    #[error("{message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl HandlerError {
    /// Builds an [`HandlerError::InvalidArguments`] without an underlying
    /// decode error.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an [`HandlerError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
