//! Plain-text rendering of scalar results.

use crate::context::InvocationContext;
use crate::value::{ReturnValue, Value};

use super::{HandlerError, ResultRenderer};

/// Media type written by [`PlainTextRenderer`].
pub const PLAIN_TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Writes scalar returns as bare text, such as `7`, `true` or `x`.
///
/// Declines `Void`, lists and maps so that a later renderer may take them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl ResultRenderer for PlainTextRenderer {
    fn render(
        &self,
        context: &mut InvocationContext<'_>,
        value: &ReturnValue,
    ) -> Result<bool, HandlerError> {
        let text = match value.value() {
            None | Some(Value::List(_) | Value::Map(_)) => return Ok(false),
            Some(Value::Null) => String::from("null"),
            Some(Value::Boolean(flag)) => flag.to_string(),
            Some(Value::Integer(number)) => number.to_string(),
            Some(Value::Long(number)) => number.to_string(),
            Some(Value::Double(number)) => number.to_string(),
            Some(Value::String(text)) => text.clone(),
        };
        let response = context.response();
        response.set_content_type(PLAIN_TEXT_CONTENT_TYPE);
        response.write_body(text.as_bytes())?;
        Ok(true)
    }
}
