//! Process-wide cache of method tables for exposed service types.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;

use super::table::MethodTable;

/// A service type that declares its own method table.
///
/// # Examples
///
/// ```
/// use switchboard::{Exposed, MethodTable, ParamType, Value};
///
/// #[derive(Default)]
/// struct Calc;
///
/// impl Exposed for Calc {
///     fn methods() -> MethodTable<Self> {
///         MethodTable::<Self>::builder()
///             .method("add", &[ParamType::Int, ParamType::Int], ParamType::Int, |_, args| {
///                 Ok(Value::from(args.int(0)? + args.int(1)?))
///             })
///             .build()
///     }
/// }
///
/// let table = switchboard::method_table::<Calc>();
/// let signature = table
///     .resolve("add", &[Value::from(3), Value::from(4)])
///     .expect("add(int, int)");
/// assert_eq!(signature.to_string(), "add(int, int)");
/// ```
pub trait Exposed: Any + Send + Sized {
    /// Declares the methods of the type. Called at most once per process in
    /// the absence of races; see [`method_table`].
    fn methods() -> MethodTable<Self>;
}

type TableCache = Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static TABLES: Lazy<TableCache> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Returns the cached method table for `T`, building it on first use.
///
/// Two threads racing on the first lookup may both build a table; only the
/// first insertion is kept.
#[must_use]
pub fn method_table<T>() -> Arc<MethodTable<T>>
where
    T: Exposed,
{
    let key = TypeId::of::<T>();
    if let Some(table) = cached::<T>(key) {
        return table;
    }

    let built: Arc<dyn Any + Send + Sync> = Arc::new(T::methods());
    let stored = {
        let mut tables = TABLES.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(tables.entry(key).or_insert(built))
    };
    stored
        .downcast::<MethodTable<T>>()
        .unwrap_or_else(|_| Arc::new(T::methods()))
}

fn cached<T>(key: TypeId) -> Option<Arc<MethodTable<T>>>
where
    T: Exposed,
{
    let tables = TABLES.lock().unwrap_or_else(PoisonError::into_inner);
    let table = Arc::clone(tables.get(&key)?);
    table.downcast::<MethodTable<T>>().ok()
}
