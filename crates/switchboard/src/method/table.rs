//! Per-type method tables and first-fit overload resolution.

use std::any::{Any, TypeId};
use std::fmt;

use crate::fault::TargetError;
use crate::target::{Target, TargetAccessError};
use crate::value::{ReturnValue, Value, ValueType};

use super::types::{Arguments, MethodSignature, ParamType, ReturnType};

type Callable<T> =
    Box<dyn Fn(&mut T, Arguments<'_>) -> Result<ReturnValue, TargetError> + Send + Sync>;

struct MethodEntry<T> {
    signature: MethodSignature,
    callable: Callable<T>,
}

/// Methods a service type exposes, in declaration order.
///
/// Several entries may share a name; [`MethodTable::resolve`] picks the first
/// whose parameter list accepts the runtime arguments.
pub struct MethodTable<T> {
    entries: Vec<MethodEntry<T>>,
}

impl<T> MethodTable<T>
where
    T: Any + Send,
{
    /// Starts an empty table.
    #[must_use]
    pub fn builder() -> MethodTableBuilder<T> {
        MethodTableBuilder {
            entries: Vec::new(),
            describe_as: None,
        }
    }

    /// Signatures of every method, in declaration order.
    pub fn signatures(&self) -> impl Iterator<Item = &MethodSignature> {
        self.entries.iter().map(|entry| &entry.signature)
    }

    /// Returns the first method named `name` that accepts `arguments`.
    #[must_use]
    pub fn resolve(&self, name: &str, arguments: &[Value]) -> Option<&MethodSignature> {
        self.find(name, arguments).map(|entry| &entry.signature)
    }

    fn find(&self, name: &str, arguments: &[Value]) -> Option<&MethodEntry<T>> {
        self.entries
            .iter()
            .filter(|entry| entry.signature.name() == name)
            .find(|entry| entry.signature.matches(arguments))
    }

    /// Resolves `name` against `arguments` and calls the selected method.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError::NoMatchingMethod`] when no declared method
    /// accepts the arguments. Failures raised by the method itself are
    /// carried in [`Invocation::outcome`].
    pub fn invoke_on(
        &self,
        object: &mut T,
        name: &str,
        arguments: &[Value],
    ) -> Result<Invocation, InvokeError> {
        let entry = self
            .find(name, arguments)
            .ok_or_else(|| InvokeError::no_matching_method(name, arguments))?;
        let outcome = (entry.callable)(object, Arguments::new(arguments));
        Ok(Invocation {
            signature: entry.signature.clone(),
            outcome,
        })
    }
}

impl<T> fmt::Debug for MethodTable<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_list()
            .entries(self.entries.iter().map(|entry| &entry.signature))
            .finish()
    }
}

/// Builder for [`MethodTable`].
pub struct MethodTableBuilder<T> {
    entries: Vec<MethodEntry<T>>,
    describe_as: Option<String>,
}

impl<T> MethodTableBuilder<T>
where
    T: Any + Send,
{
    /// Declares a method returning a value.
    #[must_use]
    pub fn method<F>(mut self, name: &str, params: &[ParamType], returns: ParamType, f: F) -> Self
    where
        F: Fn(&mut T, Arguments<'_>) -> Result<Value, TargetError> + Send + Sync + 'static,
    {
        self.entries.push(MethodEntry {
            signature: MethodSignature::new(name, params.to_vec(), ReturnType::Of(returns)),
            callable: Box::new(move |object: &mut T, arguments: Arguments<'_>| {
                f(object, arguments).map(ReturnValue::Value)
            }),
        });
        self
    }

    /// Declares a method without a return value.
    #[must_use]
    pub fn procedure<F>(mut self, name: &str, params: &[ParamType], f: F) -> Self
    where
        F: Fn(&mut T, Arguments<'_>) -> Result<(), TargetError> + Send + Sync + 'static,
    {
        self.entries.push(MethodEntry {
            signature: MethodSignature::new(name, params.to_vec(), ReturnType::Void),
            callable: Box::new(move |object: &mut T, arguments: Arguments<'_>| {
                f(object, arguments).map(|()| ReturnValue::Void)
            }),
        });
        self
    }

    /// Adds a zero-argument method called `name` that lists every other
    /// method as `{method, params, returns}` maps.
    #[must_use]
    pub fn describe_as(mut self, name: &str) -> Self {
        self.describe_as = Some(name.to_owned());
        self
    }

    /// Finishes the table.
    #[must_use]
    pub fn build(self) -> MethodTable<T> {
        let Self {
            mut entries,
            describe_as,
        } = self;
        if let Some(name) = describe_as {
            let description = Value::List(
                entries
                    .iter()
                    .map(|entry| entry.signature.describe())
                    .collect(),
            );
            entries.push(MethodEntry {
                signature: MethodSignature::new(name, Vec::new(), ReturnType::Of(ParamType::List)),
                callable: Box::new(move |_: &mut T, _: Arguments<'_>| {
                    Ok(ReturnValue::Value(description.clone()))
                }),
            });
        }
        MethodTable { entries }
    }
}

/// Result of calling a resolved method.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// The method that was selected.
    pub signature: MethodSignature,
    /// What the method returned or raised.
    pub outcome: Result<ReturnValue, TargetError>,
}

/// Failures of the invoker itself, as opposed to failures of the method.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvokeError {
    /// No declared method accepts the runtime arguments.
    #[error("no method matches {method}({})", join_types(.argument_types))]
    NoMatchingMethod {
        /// Requested method name.
        method: String,
        /// Runtime types of the supplied arguments.
        argument_types: Vec<ValueType>,
    },
    /// The resolved target could not be used.
    #[error(transparent)]
    Target(#[from] TargetAccessError),
}

impl InvokeError {
    /// Builds a [`InvokeError::NoMatchingMethod`] from the runtime arguments.
    pub fn no_matching_method(method: impl Into<String>, arguments: &[Value]) -> Self {
        Self::NoMatchingMethod {
            method: method.into(),
            argument_types: arguments.iter().map(Value::value_type).collect(),
        }
    }
}

pub(crate) fn join_types(types: &[ValueType]) -> String {
    types
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Type-erased view of a [`MethodTable`], stored in service registrations.
pub trait Invoker: Send + Sync {
    /// Type identity of the objects this invoker operates on.
    fn target_type(&self) -> TypeId;

    /// Type name of the objects this invoker operates on.
    fn target_type_name(&self) -> &'static str;

    /// Resolves and calls `method` on the object behind `target`.
    ///
    /// # Errors
    ///
    /// Returns [`InvokeError`] when no method matches or the target holds a
    /// different type.
    fn invoke(
        &self,
        target: &Target,
        method: &str,
        arguments: &[Value],
    ) -> Result<Invocation, InvokeError>;

    /// Signatures of every method, in declaration order.
    fn method_signatures(&self) -> Vec<MethodSignature>;
}

impl<T> Invoker for MethodTable<T>
where
    T: Any + Send,
{
    fn target_type(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn target_type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn invoke(
        &self,
        target: &Target,
        method: &str,
        arguments: &[Value],
    ) -> Result<Invocation, InvokeError> {
        target.with_mut(|object: &mut T| self.invoke_on(object, method, arguments))?
    }

    fn method_signatures(&self) -> Vec<MethodSignature> {
        self.signatures().cloned().collect()
    }
}
