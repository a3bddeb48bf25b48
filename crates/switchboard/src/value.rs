//! Dynamic values exchanged between handlers and service methods.
//!
//! Arguments arrive as [`Value`]s produced by an argument extractor and
//! results leave as [`ReturnValue`]s consumed by result renderers. The value
//! set mirrors what a JSON document can carry, with integers split into
//! 32-bit and 64-bit kinds so overload resolution can tell them apart.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dynamically typed argument or return value.
///
/// Deserialization picks the narrowest integer kind: whole numbers that fit in
/// an `i32` become [`Value::Integer`], larger ones [`Value::Long`], and numbers
/// with a fractional part [`Value::Double`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// The absent reference.
    Null,
    /// A boolean.
    Boolean(bool),
    /// A 32-bit signed integer.
    Integer(i32),
    /// A 64-bit signed integer.
    Long(i64),
    /// A double-precision float.
    Double(f64),
    /// A UTF-8 string.
    String(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A string-keyed map of values.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the runtime type of the value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Null => ValueType::Null,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Long(_) => ValueType::Long,
            Self::Double(_) => ValueType::Double,
            Self::String(_) => ValueType::String,
            Self::List(_) => ValueType::List,
            Self::Map(_) => ValueType::Map,
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Self>> for Value {
    fn from(value: BTreeMap<String, Self>) -> Self {
        Self::Map(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Runtime type tag of a [`Value`].
///
/// The display names follow the boxed type names used in diagnostics such as
/// `no method matches add(Integer, String)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Type of [`Value::Null`].
    Null,
    /// Type of [`Value::Boolean`].
    Boolean,
    /// Type of [`Value::Integer`].
    Integer,
    /// Type of [`Value::Long`].
    Long,
    /// Type of [`Value::Double`].
    Double,
    /// Type of [`Value::String`].
    String,
    /// Type of [`Value::List`].
    List,
    /// Type of [`Value::Map`].
    Map,
}

impl ValueType {
    /// Returns the diagnostic name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::String => "String",
            Self::List => "List",
            Self::Map => "Map",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Result of a successful invocation.
///
/// `Void` marks a method declared without a return value and is distinct from
/// `Value(Value::Null)`, which is a method that returned the absent reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    /// The method is declared without a return value.
    Void,
    /// The method returned a value, possibly [`Value::Null`].
    Value(Value),
}

impl ReturnValue {
    /// Returns the carried value, or `None` for [`ReturnValue::Void`].
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Void => None,
            Self::Value(value) => Some(value),
        }
    }

    /// Returns `true` for [`ReturnValue::Void`].
    #[must_use]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Describes the return for diagnostics (`void` or the value type).
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Value(value) => value.value_type().as_str(),
        }
    }
}

impl From<Value> for ReturnValue {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::small_int("5", Value::Integer(5))]
    #[case::negative_int("-12", Value::Integer(-12))]
    #[case::long("3000000000", Value::Long(3_000_000_000))]
    #[case::double("1.5", Value::Double(1.5))]
    #[case::boolean("true", Value::Boolean(true))]
    #[case::null("null", Value::Null)]
    #[case::string(r#""x""#, Value::String(String::from("x")))]
    fn deserializes_narrowest_kind(#[case] json: &str, #[case] expected: Value) {
        let value: Value = serde_json::from_str(json).expect("parse value");
        assert_eq!(value, expected);
    }

    #[test]
    fn deserializes_nested_structures() {
        let value: Value =
            serde_json::from_str(r#"{"xs":[1,2.5,"a"],"flag":false}"#).expect("parse map");
        let Value::Map(map) = value else {
            panic!("expected map, got {value:?}");
        };
        assert_eq!(map.get("flag"), Some(&Value::Boolean(false)));
        assert_eq!(
            map.get("xs"),
            Some(&Value::List(vec![
                Value::Integer(1),
                Value::Double(2.5),
                Value::from("a"),
            ]))
        );
    }

    #[test]
    fn serializes_null_and_scalars_plainly() {
        let list = Value::List(vec![Value::Null, Value::Integer(7), Value::from("s")]);
        let json = serde_json::to_string(&list).expect("serialize");
        assert_eq!(json, r#"[null,7,"s"]"#);
    }

    #[test]
    fn option_conversion_maps_none_to_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::Integer(3));
    }

    #[test]
    fn void_is_distinct_from_null() {
        assert_ne!(ReturnValue::Void, ReturnValue::Value(Value::Null));
        assert!(ReturnValue::Void.value().is_none());
        assert_eq!(ReturnValue::Value(Value::Null).type_name(), "Null");
        assert_eq!(ReturnValue::Void.type_name(), "void");
    }
}
