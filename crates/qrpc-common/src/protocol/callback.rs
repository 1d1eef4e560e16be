//! Deferred-response handles.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::error::Fault;

type Deliver = dyn Fn(Result<Value, Fault>) + Send + Sync;

/// A continuation a service method can hold on to and complete later.
///
/// Cloning is cheap and every clone delivers to the same place. A callback may
/// be completed any number of times from any thread; each completion is an
/// independent delivery.
#[derive(Clone)]
pub struct Callback {
    deliver: Arc<Deliver>,
}

impl Callback {
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(Result<Value, Fault>) + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Completes with a result value.
    pub fn accept(&self, value: Value) {
        (self.deliver)(Ok(value))
    }

    /// Completes with a fault.
    pub fn fail(&self, fault: impl Into<Fault>) {
        (self.deliver)(Err(fault.into()))
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}
