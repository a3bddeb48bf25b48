//! Round-trip service used to exercise overload resolution from clients.
//!
//! Every `echo` overload hands its arguments straight back, so a client can
//! observe which declared type the dispatcher selected for a given JSON
//! value. The remaining methods cover void and null returns, nested faults,
//! and per-session state.

use switchboard::{Arguments, Exposed, MethodTable, ParamType, TargetError, Value};
use tracing::debug;

use super::SERVICES_TARGET;

/// Echo service with one saved value per caller session.
#[derive(Debug, Default)]
pub struct EchoService {
    saved_value: Option<String>,
}

impl EchoService {
    /// Value saved by the current session, if any.
    #[must_use]
    pub fn saved_value(&self) -> Option<&str> {
        self.saved_value.as_deref()
    }
}

fn echo_first(_: &mut EchoService, arguments: Arguments<'_>) -> Result<Value, TargetError> {
    arguments.value(0).cloned()
}

fn nested_exception() -> TargetError {
    TargetError::exception("Exception", "exception!").with_cause(
        TargetError::exception("Exception", "exception cause")
            .with_cause(TargetError::error("Error", "error cause")),
    )
}

impl Exposed for EchoService {
    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::builder()
            .method("echo", &[ParamType::Int], ParamType::Int, echo_first)
            .method("echo", &[ParamType::Double], ParamType::Double, echo_first)
            .method("echo", &[ParamType::Long], ParamType::Long, echo_first)
            .method("echo", &[ParamType::Boolean], ParamType::Boolean, echo_first)
            .method("echo", &[ParamType::String], ParamType::String, echo_first)
            .method("echo", &[ParamType::Map], ParamType::Map, echo_first)
            .method("echo", &[ParamType::List], ParamType::List, echo_first)
            .method(
                "echo",
                &[
                    ParamType::Int,
                    ParamType::Double,
                    ParamType::Long,
                    ParamType::Boolean,
                    ParamType::String,
                ],
                ParamType::List,
                |_, arguments| {
                    Ok(Value::List(vec![
                        Value::from(arguments.int(0)?),
                        Value::from(arguments.double(1)?),
                        Value::from(arguments.long(2)?),
                        Value::from(arguments.boolean(3)?),
                        Value::from(arguments.string(4)?),
                    ]))
                },
            )
            .method("echoWrapper", &[ParamType::BoxedInt], ParamType::BoxedInt, echo_first)
            .method(
                "echoWrapper",
                &[ParamType::BoxedDouble],
                ParamType::BoxedDouble,
                echo_first,
            )
            .method("echoWrapper", &[ParamType::BoxedLong], ParamType::BoxedLong, echo_first)
            .method(
                "echoWrapper",
                &[ParamType::BoxedBoolean],
                ParamType::BoxedBoolean,
                echo_first,
            )
            .procedure("returnVoid", &[], |_, _| Ok(()))
            .method("returnNull", &[], ParamType::String, |_, _| Ok(Value::Null))
            .procedure("throwException", &[], |_, _| Err(nested_exception()))
            .procedure("throwError", &[], |_, _| {
                Err(TargetError::error("Error", "error!"))
            })
            .procedure("saveValue", &[ParamType::String], |service, arguments| {
                let value = arguments.optional_string(0)?.map(str::to_owned);
                debug!(target: SERVICES_TARGET, saved = value.is_some(), "echo value saved");
                service.saved_value = value;
                Ok(())
            })
            .method("retrieveValue", &[], ParamType::String, |service, _| {
                Ok(service
                    .saved_value
                    .as_deref()
                    .map_or(Value::Null, Value::from))
            })
            .method("hasValue", &[], ParamType::Boolean, |service, _| {
                Ok(Value::from(service.saved_value.is_some()))
            })
            .procedure("deleteValue", &[], |service, _| {
                debug!(target: SERVICES_TARGET, "echo value deleted");
                service.saved_value = None;
                Ok(())
            })
            .describe_as("_describe")
            .build()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use switchboard::{ReturnValue, method_table};

    use super::*;

    fn call(service: &mut EchoService, method: &str, arguments: &[Value]) -> (String, ReturnValue) {
        let invocation = method_table::<EchoService>()
            .invoke_on(service, method, arguments)
            .expect("method resolves");
        let returned = invocation.outcome.expect("method succeeds");
        (invocation.signature.to_string(), returned)
    }

    #[rstest]
    #[case::int(Value::Integer(7), "echo(int)")]
    #[case::double(Value::Double(2.5), "echo(double)")]
    #[case::long(Value::Long(5_000_000_000), "echo(long)")]
    #[case::boolean(Value::Boolean(true), "echo(boolean)")]
    #[case::string(Value::from("hi"), "echo(String)")]
    #[case::null(Value::Null, "echo(String)")]
    #[case::list(Value::List(vec![Value::Integer(1)]), "echo(List)")]
    fn echo_selects_overload_by_runtime_type(#[case] argument: Value, #[case] expected: &str) {
        let mut service = EchoService::default();
        let (signature, returned) = call(&mut service, "echo", &[argument.clone()]);
        assert_eq!(signature, expected);
        assert_eq!(returned, ReturnValue::Value(argument));
    }

    #[test]
    fn echo_wrapper_takes_first_boxed_overload_for_null() {
        let mut service = EchoService::default();
        let (signature, returned) = call(&mut service, "echoWrapper", &[Value::Null]);
        assert_eq!(signature, "echoWrapper(Integer)");
        assert_eq!(returned, ReturnValue::Value(Value::Null));
    }

    #[test]
    fn echo_five_arguments_returns_them_as_list() {
        let mut service = EchoService::default();
        let arguments = [
            Value::Integer(1),
            Value::Double(2.5),
            Value::Long(3),
            Value::Boolean(false),
            Value::from("s"),
        ];
        let (_, returned) = call(&mut service, "echo", &arguments);
        assert_eq!(returned, ReturnValue::Value(Value::List(arguments.to_vec())));
    }

    #[test]
    fn saved_value_round_trips() {
        let mut service = EchoService::default();
        call(&mut service, "saveValue", &[Value::from("kept")]);
        assert_eq!(service.saved_value(), Some("kept"));
        let (_, has) = call(&mut service, "hasValue", &[]);
        assert_eq!(has, ReturnValue::Value(Value::Boolean(true)));
        let (_, stored) = call(&mut service, "retrieveValue", &[]);
        assert_eq!(stored, ReturnValue::Value(Value::from("kept")));
        let (_, deleted) = call(&mut service, "deleteValue", &[]);
        assert_eq!(deleted, ReturnValue::Void);
        assert!(service.saved_value().is_none());
    }

    #[test]
    fn throw_exception_carries_nested_causes() {
        let mut service = EchoService::default();
        let fault = method_table::<EchoService>()
            .invoke_on(&mut service, "throwException", &[])
            .expect("method resolves")
            .outcome
            .expect_err("method faults");
        let root = fault
            .cause()
            .and_then(TargetError::cause)
            .expect("two causes");
        assert_eq!(fault.message(), "exception!");
        assert_eq!(root.message(), "error cause");
    }
}
