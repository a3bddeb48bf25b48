//! Per-request transport views and the invocation context.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::io;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::handler::HandlerChains;
use crate::method::MethodSignature;
use crate::registration::ServiceType;

/// Inbound half of a transport exchange.
pub trait Request {
    /// Path naming the service and method, such as `/calc/add`.
    fn path(&self) -> &str;

    /// Named request parameter.
    fn parameter(&self, name: &str) -> Option<&str>;

    /// Opaque identifier of the caller's session, when the transport has one.
    fn session(&self) -> Option<&str>;
}

/// Outbound half of a transport exchange.
pub trait Response {
    /// Sets the media type of the body.
    fn set_content_type(&mut self, content_type: &str);

    /// Appends bytes to the body.
    ///
    /// # Errors
    ///
    /// Returns the transport's I/O failure.
    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()>;
}

/// In-memory [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicRequest {
    /// Request path.
    pub path: String,
    /// Named parameters.
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    /// Session identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
}

impl BasicRequest {
    /// Creates a request for `path` with no parameters or session.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Sets the session identifier.
    #[must_use]
    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }
}

impl Request for BasicRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

/// In-memory [`Response`] that collects the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedResponse {
    content_type: Option<String>,
    body: Vec<u8>,
}

impl BufferedResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type set by a renderer, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Consumes the response, returning the content type and body.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Vec<u8>) {
        (self.content_type, self.body)
    }
}

impl Response for BufferedResponse {
    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_owned());
    }

    fn write_body(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(bytes);
        Ok(())
    }
}

/// Everything a handler may inspect while one request is dispatched.
///
/// The context lives for exactly one dispatch. The selected method starts
/// unset and is filled once the invoker has located a method; it is never
/// reset afterwards.
pub struct InvocationContext<'a> {
    service: &'a str,
    service_type: &'a ServiceType,
    method: &'a str,
    request: &'a dyn Request,
    response: &'a mut dyn Response,
    chains: &'a HandlerChains,
    filtered_methods: &'a BTreeSet<String>,
    selected: OnceCell<MethodSignature>,
}

impl<'a> InvocationContext<'a> {
    pub(crate) fn new(
        service: &'a str,
        service_type: &'a ServiceType,
        method: &'a str,
        request: &'a dyn Request,
        response: &'a mut dyn Response,
        chains: &'a HandlerChains,
        filtered_methods: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            service,
            service_type,
            method,
            request,
            response,
            chains,
            filtered_methods,
            selected: OnceCell::new(),
        }
    }

    /// Name of the service being invoked.
    #[must_use]
    pub const fn service(&self) -> &str {
        self.service
    }

    /// Type bound to the service.
    #[must_use]
    pub const fn service_type(&self) -> &ServiceType {
        self.service_type
    }

    /// Requested method name.
    #[must_use]
    pub const fn method(&self) -> &str {
        self.method
    }

    /// Inbound request.
    #[must_use]
    pub fn request(&self) -> &dyn Request {
        self.request
    }

    /// Outbound response sink.
    pub fn response(&mut self) -> &mut dyn Response {
        &mut *self.response
    }

    /// Handler chains of the service, read-only.
    #[must_use]
    pub const fn chains(&self) -> &HandlerChains {
        self.chains
    }

    /// Methods of the service that may never be invoked remotely.
    #[must_use]
    pub const fn filtered_methods(&self) -> &BTreeSet<String> {
        self.filtered_methods
    }

    /// The method the invoker selected, once resolution has succeeded.
    #[must_use]
    pub fn selected_method(&self) -> Option<&MethodSignature> {
        self.selected.get()
    }

    /// Name to report for the method: the selected signature when known,
    /// otherwise the requested name.
    #[must_use]
    pub fn method_label(&self) -> String {
        self.selected_method()
            .map_or_else(|| self.method.to_owned(), ToString::to_string)
    }

    pub(crate) fn select(&self, signature: MethodSignature) {
        self.selected.get_or_init(|| signature);
    }
}
