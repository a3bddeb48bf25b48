//! Random string generator keeping the last result per session.

use std::collections::BTreeMap;

use rand::Rng;
use switchboard::{Exposed, MethodTable, ParamType, TargetError, Value};
use tracing::debug;

use super::SERVICES_TARGET;

const ALPHABET: &[u8] = b"1234567890qwertyuiopasdfghjklzxcvbnmQWERTYUIOPASDFGHJKLZXCVBNM";

/// Generates alphanumeric strings and remembers the last one.
#[derive(Debug, Default)]
pub struct RandomService {
    last: Option<String>,
}

impl RandomService {
    /// Most recently generated string, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }

    fn create(&mut self, length: i32) -> Result<Value, TargetError> {
        let count = usize::try_from(length).map_err(|_| {
            TargetError::illegal_argument(format!("length must not be negative: {length}"))
        })?;
        let mut rng = rand::rng();
        let created = (0..count)
            .filter_map(|_| ALPHABET.get(rng.random_range(0..ALPHABET.len())))
            .map(|byte| char::from(*byte))
            .collect::<String>();
        debug!(target: SERVICES_TARGET, length, "random string created");

        let mut reply = BTreeMap::new();
        reply.insert(String::from("created"), Value::from(created.as_str()));
        reply.insert(String::from("length"), Value::from(length));
        self.last = Some(created);
        Ok(Value::Map(reply))
    }
}

impl Exposed for RandomService {
    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::builder()
            .method(
                "createRandomString",
                &[ParamType::Int],
                ParamType::Map,
                |service, arguments| service.create(arguments.int(0)?),
            )
            .method("getLastRandomString", &[], ParamType::String, |service, _| {
                Ok(service.last.as_deref().map_or(Value::Null, Value::from))
            })
            .describe_as("_describe")
            .build()
    }
}

#[cfg(test)]
mod tests {
    use switchboard::{ReturnValue, method_table};

    use super::*;

    fn call(service: &mut RandomService, method: &str, arguments: &[Value]) -> ReturnValue {
        method_table::<RandomService>()
            .invoke_on(service, method, arguments)
            .expect("method resolves")
            .outcome
            .expect("method succeeds")
    }

    #[test]
    fn creates_strings_from_the_alphabet() {
        let mut service = RandomService::default();
        let ReturnValue::Value(Value::Map(reply)) =
            call(&mut service, "createRandomString", &[Value::from(12)])
        else {
            panic!("expected a map");
        };
        let Some(Value::String(created)) = reply.get("created") else {
            panic!("expected the created string");
        };
        assert_eq!(created.len(), 12);
        assert!(created.bytes().all(|byte| ALPHABET.contains(&byte)));
        assert_eq!(reply.get("length"), Some(&Value::from(12)));
        assert_eq!(service.last(), Some(created.as_str()));
    }

    #[test]
    fn last_string_is_null_before_the_first_call() {
        let mut service = RandomService::default();
        assert_eq!(
            call(&mut service, "getLastRandomString", &[]),
            ReturnValue::Value(Value::Null)
        );
    }

    #[test]
    fn negative_lengths_are_rejected() {
        let mut service = RandomService::default();
        let invocation = method_table::<RandomService>()
            .invoke_on(&mut service, "createRandomString", &[Value::from(-1)])
            .expect("method resolves");
        let error = invocation.outcome.expect_err("negative length");
        assert!(error.message().contains("-1"));
        assert_eq!(service.last(), None);
    }
}
