use serde_json::Value;
use thiserror::Error;

/// Error raised by a service method.
///
/// This is what a handler returns on failure. The dispatcher places it into
/// the response unchanged, so callers see exactly what the method raised.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ServiceError {
    /// Human readable description of the failure
    pub message: String,
    /// Optional structured detail attached by the service
    pub data: Option<Value>,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A mismatch between a method's declared bindings and the shape of a call.
///
/// These are programmer errors in the service declaration that only surface
/// when a call arrives. They are never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigFault {
    #[error("missing required parameter '{param}' for method {method}")]
    MissingRequiredParam { method: String, param: String },

    #[error("body of the call was already bound for method {method}; parameter {index} cannot take it too")]
    BodyAlreadyBound { method: String, index: usize },

    #[error("URI position {position} is beyond the {available} path segments available to method {method}")]
    UriPositionOutOfRange {
        method: String,
        position: usize,
        available: usize,
    },

    #[error("parameter position {position} does not exist on method {method} ({count} parameters)")]
    ParamPositionOutOfRange {
        method: String,
        position: usize,
        count: usize,
    },

    #[error("path variable for method {method} has no name")]
    UnnamedPathVariable { method: String },
}

/// A failure carried inside a [`Response`](crate::Response).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Coercion error: {0}")]
    Coercion(String),

    #[error("Binding configuration error: {0}")]
    Configuration(#[from] ConfigFault),

    /// The invoked method itself failed
    #[error(transparent)]
    Raised(#[from] ServiceError),
}

impl Fault {
    /// Configuration faults mean the binding table disagrees with the caller;
    /// the host is expected to stop the service rather than retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Fault::Configuration(_))
    }
}

/// Infrastructure errors outside of dispatch itself.
#[derive(Error, Debug)]
pub enum QrpcError {
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Queue closed: {0}")]
    QueueClosed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, QrpcError>;
