//! QRPC Response Types
//!
//! This module defines the response produced for every dispatched call.

use serde_json::Value;
use std::sync::{Arc, OnceLock};

use super::call::{Call, CallId};
use super::error::Fault;

static VOID: OnceLock<Arc<Response>> = OnceLock::new();

/// A response to a [`Call`].
///
/// # Fields
///
/// - `id`, `timestamp`, `name`, `return_address`: echoed from the originating call
/// - `result`: the returned value, or the fault that prevented one
/// - `call`: the originating call (absent only on the void sentinel)
///
/// # Void
///
/// Methods that return nothing produce [`Response::void`], a single shared
/// instance. Hosts compare against it with [`Response::is_void`] and send
/// nothing back.
///
/// # Example
///
/// ```
/// use qrpc_common::{Call, Response};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let call = Arc::new(Call::to_method("add").with_id(7));
/// let response = Response::success(&call, json!(3));
/// assert_eq!(response.id, 7);
/// assert_eq!(response.value(), Some(&json!(3)));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    pub id: CallId,
    pub timestamp: u64,
    pub name: String,
    pub return_address: String,
    pub result: Result<Value, Fault>,
    pub call: Option<Arc<Call>>,
}

impl Response {
    /// Builds a response tagged from `call`.
    pub fn from_call(call: &Arc<Call>, result: Result<Value, Fault>) -> Self {
        Response {
            id: call.id,
            timestamp: call.timestamp,
            name: call.name.clone(),
            return_address: call.return_address.clone(),
            result,
            call: Some(Arc::clone(call)),
        }
    }

    pub fn success(call: &Arc<Call>, value: Value) -> Self {
        Self::from_call(call, Ok(value))
    }

    pub fn fault(call: &Arc<Call>, fault: Fault) -> Self {
        Self::from_call(call, Err(fault))
    }

    /// The shared "void, no response expected" sentinel.
    pub fn void() -> Arc<Response> {
        Arc::clone(VOID.get_or_init(|| {
            Arc::new(Response {
                id: 0,
                timestamp: 0,
                name: String::new(),
                return_address: String::new(),
                result: Ok(Value::Null),
                call: None,
            })
        }))
    }

    pub fn is_void(&self) -> bool {
        VOID.get()
            .map(|void| std::ptr::eq(self, Arc::as_ptr(void)))
            .unwrap_or(false)
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn value(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&Fault> {
        self.result.as_ref().err()
    }
}
