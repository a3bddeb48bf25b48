//! Runtime method resolution and invocation.
//!
//! Service types declare their methods once in a [`MethodTable`]. At request
//! time the table is searched in declaration order for the first method with
//! the requested name whose parameters accept the runtime argument types.

mod exposed;
mod table;
mod types;

pub use exposed::{Exposed, method_table};
pub use table::{Invocation, InvokeError, Invoker, MethodTable, MethodTableBuilder};
pub(crate) use table::join_types;
pub use types::{Arguments, MethodSignature, ParamType, ReturnType};
