//! JSON argument extraction and response envelopes.
//!
//! Arguments arrive as a JSON array in a single request parameter. Results
//! and faults leave as an envelope naming the service, the selected method
//! and a UTC timestamp:
//!
//! ```json
//! {"service":"calc","method":"add(int, int)","timestamp":"20240101T12:00:00","return":7}
//! ```

use serde::Serialize;
use time::OffsetDateTime;

use crate::context::InvocationContext;
use crate::fault::{FaultSeverity, TargetError};
use crate::value::{ReturnValue, Value};

use super::{ArgumentExtractor, FaultRenderer, HandlerError, ResultRenderer};

/// Request parameter that carries the argument array by default.
pub const DEFAULT_ARGUMENTS_PARAMETER: &str = "a";

/// Media type written by the JSON renderers.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Reads arguments from a request parameter holding a JSON array.
///
/// A missing or blank parameter is an authoritative empty argument list.
#[derive(Debug, Clone)]
pub struct JsonArgumentExtractor {
    parameter: String,
}

impl JsonArgumentExtractor {
    /// Reads arguments from `parameter`.
    pub fn new(parameter: impl Into<String>) -> Self {
        Self {
            parameter: parameter.into(),
        }
    }

    /// Name of the parameter holding the array.
    #[must_use]
    pub fn parameter(&self) -> &str {
        &self.parameter
    }
}

impl Default for JsonArgumentExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_ARGUMENTS_PARAMETER)
    }
}

impl ArgumentExtractor for JsonArgumentExtractor {
    fn extract(&self, context: &InvocationContext<'_>) -> Result<Option<Vec<Value>>, HandlerError> {
        let Some(raw) = context.request().parameter(&self.parameter) else {
            return Ok(Some(Vec::new()));
        };
        if raw.trim().is_empty() {
            return Ok(Some(Vec::new()));
        }
        serde_json::from_str::<Vec<Value>>(raw)
            .map(Some)
            .map_err(|source| HandlerError::InvalidArguments {
                message: format!("parameter '{}' must hold a JSON array", self.parameter),
                source: Some(source),
            })
    }
}

/// Writes successful returns as a JSON envelope.
///
/// A `Void` return omits the `return` key; a `Null` return writes
/// `"return": null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResultRenderer;

impl ResultRenderer for JsonResultRenderer {
    fn render(
        &self,
        context: &mut InvocationContext<'_>,
        value: &ReturnValue,
    ) -> Result<bool, HandlerError> {
        let envelope = Envelope {
            returned: value.value(),
            ..Envelope::new(context)
        };
        write_json(context, &envelope)?;
        Ok(true)
    }
}

/// Writes domain faults as a JSON envelope.
///
/// The fault lands under `exception`, or under `error` for faults of
/// [`FaultSeverity::Error`], as `{class, message, cause}` with nested causes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFaultRenderer;

impl FaultRenderer for JsonFaultRenderer {
    fn render(
        &self,
        context: &mut InvocationContext<'_>,
        fault: &TargetError,
    ) -> Result<bool, HandlerError> {
        let body = Some(FaultBody::from(fault));
        let base = Envelope::new(context);
        let envelope = match fault.severity() {
            FaultSeverity::Exception => Envelope {
                exception: body,
                ..base
            },
            FaultSeverity::Error => Envelope { error: body, ..base },
        };
        write_json(context, &envelope)?;
        Ok(true)
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a> {
    service: String,
    method: String,
    timestamp: String,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    returned: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exception: Option<FaultBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<FaultBody>,
}

impl Envelope<'_> {
    fn new(context: &InvocationContext<'_>) -> Self {
        Self {
            service: context.service().to_owned(),
            method: context.method_label(),
            timestamp: timestamp(OffsetDateTime::now_utc()),
            returned: None,
            exception: None,
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FaultBody {
    class: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cause: Option<Box<FaultBody>>,
}

impl From<&TargetError> for FaultBody {
    fn from(fault: &TargetError) -> Self {
        Self {
            class: fault.kind().to_owned(),
            message: fault.message().to_owned(),
            cause: fault.cause().map(|cause| Box::new(Self::from(cause))),
        }
    }
}

fn write_json<T>(context: &mut InvocationContext<'_>, body: &T) -> Result<(), HandlerError>
where
    T: Serialize,
{
    let bytes = serde_json::to_vec(body)?;
    let response = context.response();
    response.set_content_type(JSON_CONTENT_TYPE);
    response.write_body(&bytes)?;
    Ok(())
}

/// Formats `moment` as `YYYYMMDDTHH:MM:SS`.
pub(crate) fn timestamp(moment: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}:{:02}:{:02}",
        moment.year(),
        u8::from(moment.month()),
        moment.day(),
        moment.hour(),
        moment.minute(),
        moment.second()
    )
}
