//! Declared parameter and return types, signatures, and argument views.

use std::collections::BTreeMap;
use std::fmt;

use crate::fault::TargetError;
use crate::value::{Value, ValueType};

/// Declared type of a method parameter.
///
/// Primitive kinds (`Int`, `Long`, `Double`, `Boolean`) accept exactly their
/// boxed counterpart and never `Null`. Reference kinds accept any value whose
/// runtime type is assignable to them, including `Null`. No numeric widening
/// takes place: a `Long` parameter does not accept an `Integer` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Primitive 32-bit integer.
    Int,
    /// Primitive 64-bit integer.
    Long,
    /// Primitive double.
    Double,
    /// Primitive boolean.
    Boolean,
    /// Nullable 32-bit integer.
    BoxedInt,
    /// Nullable 64-bit integer.
    BoxedLong,
    /// Nullable double.
    BoxedDouble,
    /// Nullable boolean.
    BoxedBoolean,
    /// Any numeric value or `Null`.
    Number,
    /// A string or `Null`.
    String,
    /// A list or `Null`.
    List,
    /// A map or `Null`.
    Map,
    /// Any value.
    Any,
}

impl ParamType {
    /// Returns `true` for the primitive kinds.
    #[must_use]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Int | Self::Long | Self::Double | Self::Boolean)
    }

    /// Returns the boxed value type a primitive kind accepts.
    #[must_use]
    pub const fn boxed_counterpart(self) -> Option<ValueType> {
        match self {
            Self::Int => Some(ValueType::Integer),
            Self::Long => Some(ValueType::Long),
            Self::Double => Some(ValueType::Double),
            Self::Boolean => Some(ValueType::Boolean),
            _ => None,
        }
    }

    /// Decides whether a value of runtime type `actual` may be passed for a
    /// parameter of this type.
    #[must_use]
    pub fn accepts(self, actual: ValueType) -> bool {
        match self.boxed_counterpart() {
            Some(boxed) => boxed == actual,
            None => is_assignable(actual, self),
        }
    }

    /// Diagnostic name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::BoxedInt => "Integer",
            Self::BoxedLong => "Long",
            Self::BoxedDouble => "Double",
            Self::BoxedBoolean => "Boolean",
            Self::Number => "Number",
            Self::String => "String",
            Self::List => "List",
            Self::Map => "Map",
            Self::Any => "Object",
        }
    }
}

const fn is_assignable(actual: ValueType, declared: ParamType) -> bool {
    match (actual, declared) {
        (_, ParamType::Any)
        | (ValueType::Null, _)
        | (ValueType::Integer, ParamType::BoxedInt | ParamType::Number)
        | (ValueType::Long, ParamType::BoxedLong | ParamType::Number)
        | (ValueType::Double, ParamType::BoxedDouble | ParamType::Number)
        | (ValueType::Boolean, ParamType::BoxedBoolean)
        | (ValueType::String, ParamType::String)
        | (ValueType::List, ParamType::List)
        | (ValueType::Map, ParamType::Map) => true,
        _ => false,
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Declared return type of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// The method returns nothing.
    Void,
    /// The method returns a value of the given type.
    Of(ParamType),
}

impl fmt::Display for ReturnType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => formatter.write_str("void"),
            Self::Of(kind) => kind.fmt(formatter),
        }
    }
}

/// Name, parameter types and return type of a registered method.
///
/// Displays as `add(int, int)`, the form renderers put in response envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    name: String,
    params: Vec<ParamType>,
    returns: ReturnType,
}

impl MethodSignature {
    /// Creates a signature.
    pub fn new(name: impl Into<String>, params: Vec<ParamType>, returns: ReturnType) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
        }
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter types, in order.
    #[must_use]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Declared return type.
    #[must_use]
    pub const fn returns(&self) -> ReturnType {
        self.returns
    }

    /// Checks arity and per-position acceptance against runtime arguments.
    #[must_use]
    pub fn matches(&self, arguments: &[Value]) -> bool {
        self.params.len() == arguments.len()
            && self
                .params
                .iter()
                .zip(arguments)
                .all(|(param, argument)| param.accepts(argument.value_type()))
    }

    /// Describes the method as a map of `method`, `params` and `returns`.
    #[must_use]
    pub fn describe(&self) -> Value {
        let params = self
            .params
            .iter()
            .map(|param| Value::from(param.as_str()))
            .collect::<Vec<_>>();
        let mut description = BTreeMap::new();
        description.insert(String::from("method"), Value::from(self.name.as_str()));
        description.insert(String::from("params"), Value::List(params));
        description.insert(
            String::from("returns"),
            Value::String(self.returns.to_string()),
        );
        Value::Map(description)
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}(", self.name)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                formatter.write_str(", ")?;
            }
            formatter.write_str(param.as_str())?;
        }
        formatter.write_str(")")
    }
}

/// Read-only view of the arguments passed to a method callable.
///
/// The accessors re-check each value against the requested type. After
/// overload resolution they cannot fail for a correctly declared method; a
/// mismatch surfaces as an `IllegalArgument` [`TargetError`].
#[derive(Debug, Clone, Copy)]
pub struct Arguments<'a> {
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    /// Wraps a slice of runtime values.
    #[must_use]
    pub const fn new(values: &'a [Value]) -> Self {
        Self { values }
    }

    /// Number of arguments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when there are no arguments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the argument at `index`.
    ///
    /// # Errors
    ///
    /// Fails when `index` is out of range.
    pub fn value(&self, index: usize) -> Result<&'a Value, TargetError> {
        self.values.get(index).ok_or_else(|| {
            TargetError::illegal_argument(format!(
                "argument {index} requested but only {} supplied",
                self.values.len()
            ))
        })
    }

    /// Reads an `Integer` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not an `Integer`.
    pub fn int(&self, index: usize) -> Result<i32, TargetError> {
        match self.value(index)? {
            Value::Integer(value) => Ok(*value),
            other => Err(mismatch(index, "Integer", other)),
        }
    }

    /// Reads a `Long` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not a `Long`.
    pub fn long(&self, index: usize) -> Result<i64, TargetError> {
        match self.value(index)? {
            Value::Long(value) => Ok(*value),
            other => Err(mismatch(index, "Long", other)),
        }
    }

    /// Reads a `Double` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not a `Double`.
    pub fn double(&self, index: usize) -> Result<f64, TargetError> {
        match self.value(index)? {
            Value::Double(value) => Ok(*value),
            other => Err(mismatch(index, "Double", other)),
        }
    }

    /// Reads a `Boolean` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not a `Boolean`.
    pub fn boolean(&self, index: usize) -> Result<bool, TargetError> {
        match self.value(index)? {
            Value::Boolean(value) => Ok(*value),
            other => Err(mismatch(index, "Boolean", other)),
        }
    }

    /// Reads a non-null `String` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing, `Null`, or not a `String`.
    pub fn string(&self, index: usize) -> Result<&'a str, TargetError> {
        match self.value(index)? {
            Value::String(value) => Ok(value.as_str()),
            other => Err(mismatch(index, "String", other)),
        }
    }

    /// Reads a `String` argument that may be `Null`.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or neither a `String` nor `Null`.
    pub fn optional_string(&self, index: usize) -> Result<Option<&'a str>, TargetError> {
        match self.value(index)? {
            Value::Null => Ok(None),
            Value::String(value) => Ok(Some(value.as_str())),
            other => Err(mismatch(index, "String", other)),
        }
    }

    /// Reads a `List` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not a `List`.
    pub fn list(&self, index: usize) -> Result<&'a [Value], TargetError> {
        match self.value(index)? {
            Value::List(values) => Ok(values.as_slice()),
            other => Err(mismatch(index, "List", other)),
        }
    }

    /// Reads a `Map` argument.
    ///
    /// # Errors
    ///
    /// Fails when the argument is missing or not a `Map`.
    pub fn map(&self, index: usize) -> Result<&'a BTreeMap<String, Value>, TargetError> {
        match self.value(index)? {
            Value::Map(entries) => Ok(entries),
            other => Err(mismatch(index, "Map", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, actual: &Value) -> TargetError {
    TargetError::illegal_argument(format!(
        "argument {index} is {} but {expected} was requested",
        actual.value_type()
    ))
}
