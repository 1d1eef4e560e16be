//! QRPC Call Types
//!
//! A [`Call`] is a decoded method invocation addressed either by method name
//! or by a `/`-delimited service address.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use super::callback::Callback;
use super::error::ServiceError;
use super::params::MultiMap;

pub type CallId = u64;

static CALL_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// One argument slot handed to a service method.
#[derive(Debug, Clone)]
pub enum Arg {
    /// A plain value (null for slots nothing was bound to)
    Value(Value),
    /// The raw parameter multi-map of the call
    Params(MultiMap),
    /// A deferred-response handle
    Callback(Callback),
}

impl Arg {
    pub fn null() -> Self {
        Arg::Value(Value::Null)
    }

    pub fn is_callback(&self) -> bool {
        matches!(self, Arg::Callback(_))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Callback> for Arg {
    fn from(callback: Callback) -> Self {
        Arg::Callback(callback)
    }
}

/// Body of a call.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    /// A scalar or a mapping
    Value(Value),
    /// An ordered sequence; elements may be callbacks supplied by in-process callers
    Sequence(Vec<Arg>),
}

impl Body {
    /// Absent, or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Value(Value::String(s)) => s.is_empty(),
            _ => false,
        }
    }

    /// JSON view of the body. Callback elements appear as null.
    pub fn to_value(&self) -> Value {
        match self {
            Body::Empty => Value::Null,
            Body::Value(v) => v.clone(),
            Body::Sequence(items) => Value::Array(
                items
                    .iter()
                    .map(|arg| match arg {
                        Arg::Value(v) => v.clone(),
                        Arg::Params(p) => p.to_json(),
                        Arg::Callback(_) => Value::Null,
                    })
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Body::Empty,
            Value::Array(items) => Body::Sequence(items.into_iter().map(Arg::Value).collect()),
            other => Body::Value(other),
        }
    }
}

impl From<Vec<Arg>> for Body {
    fn from(items: Vec<Arg>) -> Self {
        Body::Sequence(items)
    }
}

/// A decoded method invocation.
///
/// The core never mutates a call once it is received. A non-empty `name`
/// selects dispatch by method name; otherwise `address` is resolved against
/// the binding table.
#[derive(Debug, Clone)]
pub struct Call {
    pub id: CallId,
    pub name: String,
    pub address: String,
    pub return_address: String,
    pub params: MultiMap,
    pub body: Body,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl Call {
    fn new(name: String, address: String) -> Self {
        Call {
            id: generate_call_id(),
            name,
            address,
            return_address: String::new(),
            params: MultiMap::new(),
            body: Body::Empty,
            timestamp: now_millis(),
        }
    }

    /// A call dispatched by method name.
    pub fn to_method(name: impl Into<String>) -> Self {
        Self::new(name.into(), String::new())
    }

    /// A call dispatched by service address.
    pub fn to_address(address: impl Into<String>) -> Self {
        Self::new(String::new(), address.into())
    }

    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.add(key, value);
        self
    }

    pub fn with_params(mut self, params: MultiMap) -> Self {
        self.params = params;
        self
    }

    pub fn with_return_address(mut self, return_address: impl Into<String>) -> Self {
        self.return_address = return_address.into();
        self
    }

    pub fn with_id(mut self, id: CallId) -> Self {
        self.id = id;
        self
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn generate_call_id() -> CallId {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    // Upper 32 bits from the clock, lower 32 bits from the counter
    let counter = CALL_ID_COUNTER.fetch_add(1, Ordering::SeqCst);
    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}

/// Bound argument list handed to a service method.
///
/// Every declared parameter has a slot; slots nothing was bound to hold null.
#[derive(Debug, Clone, Default)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn new(args: Vec<Arg>) -> Self {
        Args(args)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    /// Value in slot `index`. Params slots are viewed as a JSON object.
    pub fn value(&self, index: usize) -> Option<Value> {
        match self.0.get(index)? {
            Arg::Value(v) => Some(v.clone()),
            Arg::Params(p) => Some(p.to_json()),
            Arg::Callback(_) => None,
        }
    }

    /// Deserializes slot `index` into `T`.
    pub fn param<T: DeserializeOwned>(&self, index: usize) -> std::result::Result<T, ServiceError> {
        let value = self
            .value(index)
            .ok_or_else(|| ServiceError::new(format!("argument {} is not a value", index)))?;
        serde_json::from_value(value)
            .map_err(|e| ServiceError::new(format!("argument {}: {}", index, e)))
    }

    pub fn params(&self, index: usize) -> Option<&MultiMap> {
        match self.0.get(index)? {
            Arg::Params(p) => Some(p),
            _ => None,
        }
    }

    pub fn callback(&self, index: usize) -> Option<Callback> {
        match self.0.get(index)? {
            Arg::Callback(cb) => Some(cb.clone()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arg> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Arg> {
        self.0
    }
}

impl From<Vec<Arg>> for Args {
    fn from(args: Vec<Arg>) -> Self {
        Args(args)
    }
}
