//! Dynamic method dispatch for ordinary Rust objects.
//!
//! The `switchboard` crate exposes the methods of registered service types
//! over any request/response transport using the `/<service>/<method>` path
//! convention. The concrete method is chosen at request time by matching the
//! runtime types of the supplied arguments against the type's declared
//! overloads, first fit in declaration order.
//!
//! Each service carries four ordered handler chains: argument extractors,
//! target resolvers, result renderers and fault renderers. The
//! [`Dispatcher`] walks each chain until a handler answers, invokes the
//! selected method under the service's exclusive lock, and hands the result
//! or the domain fault to the renderers.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use switchboard::{
//!     BasicRequest, BufferedResponse, DispatchOutcome, Dispatcher, Exposed, MethodTable,
//!     ParamType, ServiceRegistry, Value, presets,
//! };
//!
//! #[derive(Default)]
//! struct Calc;
//!
//! impl Exposed for Calc {
//!     fn methods() -> MethodTable<Self> {
//!         MethodTable::<Self>::builder()
//!             .method("add", &[ParamType::Int, ParamType::Int], ParamType::Int, |_, args| {
//!                 Ok(Value::from(args.int(0)? + args.int(1)?))
//!             })
//!             .build()
//!     }
//! }
//!
//! let registry = ServiceRegistry::builder()
//!     .with_service(presets::json_shared_service::<Calc>("calc"))
//!     .expect("register calc")
//!     .build();
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//!
//! let request = BasicRequest::new("/calc/add").with_parameter("a", "[3,4]");
//! let mut response = BufferedResponse::new();
//! let outcome = dispatcher.dispatch(&request, &mut response).expect("dispatch");
//! assert_eq!(outcome, DispatchOutcome::Rendered);
//! assert!(response.body_text().contains(r#""return":7"#));
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod fault;
pub mod handler;
pub mod method;
pub mod presets;
pub mod registration;
pub mod registry;
pub mod router;
pub mod target;
pub mod value;

#[cfg(test)]
mod tests;

pub use self::context::{BasicRequest, BufferedResponse, InvocationContext, Request, Response};
pub use self::dispatcher::{DISPATCH_TARGET, DispatchOutcome, Dispatcher};
pub use self::error::{DispatchError, DispatchPhase, FaultCategory};
pub use self::fault::{FaultSeverity, TargetError};
pub use self::handler::{
    ArgumentExtractor, DEFAULT_SESSION_CAPACITY, DEFAULT_SESSION_IDLE_TIMEOUT, FaultRenderer,
    HandlerChains, HandlerError, JsonArgumentExtractor,
    JsonFaultRenderer, JsonResultRenderer, PerCallTargetResolver, PlainTextRenderer,
    ResultRenderer, SessionTargetResolver, SharedTargetResolver, TargetResolver,
};
pub use self::method::{
    Arguments, Exposed, Invocation, InvokeError, Invoker, MethodSignature, MethodTable,
    MethodTableBuilder, ParamType, ReturnType, method_table,
};
pub use self::registration::{
    RegistrationError, ServiceDescription, ServiceRegistration, ServiceType,
};
pub use self::registry::{ServiceRegistry, ServiceRegistryBuilder};
pub use self::router::{PATH_SEPARATOR, RouteOutcome, route};
pub use self::target::{Target, TargetAccessError};
pub use self::value::{ReturnValue, Value, ValueType};
