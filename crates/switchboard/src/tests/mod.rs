//! Crate-level dispatch and BDD tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::context::{BasicRequest, BufferedResponse};
use crate::dispatcher::{DispatchOutcome, Dispatcher};
use crate::error::DispatchError;
use crate::fault::TargetError;
use crate::method::{Exposed, MethodTable, ParamType};
use crate::presets;
use crate::registry::ServiceRegistry;
use crate::value::Value;

mod behaviour;

/// Arithmetic service used across the dispatch tests.
#[derive(Debug, Default)]
pub(crate) struct Calc {
    memory: i32,
}

impl Exposed for Calc {
    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::builder()
            .method("add", &[ParamType::Int, ParamType::Int], ParamType::Int, |_, args| {
                Ok(Value::from(args.int(0)? + args.int(1)?))
            })
            .method("div", &[ParamType::Int, ParamType::Int], ParamType::Int, |_, args| {
                args.int(0)?
                    .checked_div(args.int(1)?)
                    .map(Value::from)
                    .ok_or_else(|| TargetError::exception("ArithmeticError", "division by zero"))
            })
            .method("f", &[ParamType::Int], ParamType::String, |_, _| {
                Ok(Value::from("f(int)"))
            })
            .method("f", &[ParamType::Double], ParamType::String, |_, _| {
                Ok(Value::from("f(double)"))
            })
            .method("f", &[ParamType::Boolean], ParamType::String, |_, _| {
                Ok(Value::from("f(boolean)"))
            })
            .method("g", &[ParamType::Long], ParamType::String, |_, _| {
                Ok(Value::from("g(long)"))
            })
            .method("g", &[ParamType::Double], ParamType::String, |_, _| {
                Ok(Value::from("g(double)"))
            })
            .procedure("store", &[ParamType::Int], |calc, args| {
                calc.memory = args.int(0)?;
                Ok(())
            })
            .method("recall", &[], ParamType::Int, |calc, _| {
                Ok(Value::from(calc.memory))
            })
            .method("digits", &[], ParamType::List, |_, _| {
                Ok(Value::List(vec![Value::from(1), Value::from(2)]))
            })
            .procedure("boom", &[], |_, _| panic!("calc exploded"))
            .build()
    }
}

/// Registry holding `calc` as a shared JSON service.
pub(crate) fn calc_registry() -> ServiceRegistry {
    ServiceRegistry::builder()
        .with_service(presets::json_shared_service::<Calc>("calc"))
        .expect("register calc")
        .build()
}

pub(crate) fn calc_dispatcher() -> Dispatcher {
    Dispatcher::new(Arc::new(calc_registry()))
}

/// Dispatches `path` with the JSON argument array `arguments`.
pub(crate) fn call(
    dispatcher: &Dispatcher,
    path: &str,
    arguments: &str,
) -> (Result<DispatchOutcome, DispatchError>, BufferedResponse) {
    let request = BasicRequest::new(path).with_parameter("a", arguments);
    let mut response = BufferedResponse::new();
    let outcome = dispatcher.dispatch(&request, &mut response);
    (outcome, response)
}

/// Parses the JSON envelope written by a JSON renderer.
pub(crate) fn envelope(response: &BufferedResponse) -> serde_json::Value {
    serde_json::from_slice(response.body()).expect("response body is JSON")
}

/// Service whose only method waits for a second concurrent caller.
///
/// `active` counts callers currently inside `enter`; `peak` records the
/// highest value seen.
#[derive(Debug)]
pub(crate) struct Gate {
    active: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    patience: Duration,
}

impl Gate {
    pub(crate) const fn new(
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        patience: Duration,
    ) -> Self {
        Self {
            active,
            peak,
            patience,
        }
    }

    fn enter(&self) -> bool {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        let deadline = Instant::now() + self.patience;
        let mut met = false;
        while Instant::now() < deadline {
            let current = self.active.load(Ordering::SeqCst);
            self.peak.fetch_max(current, Ordering::SeqCst);
            if current >= 2 {
                met = true;
                break;
            }
            thread::sleep(Duration::from_millis(1));
        }
        // Linger so the partner also observes the overlap.
        if met {
            thread::sleep(Duration::from_millis(20));
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        met
    }
}

impl Exposed for Gate {
    fn methods() -> MethodTable<Self> {
        MethodTable::<Self>::builder()
            .method("enter", &[], ParamType::Boolean, |gate, _| {
                Ok(Value::from(gate.enter()))
            })
            .build()
    }
}
