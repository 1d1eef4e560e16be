//! QRPC Server
//!
//! The dispatch core: it turns decoded [`Call`](qrpc_common::Call)s into
//! method invocations on a service object and produces
//! [`Response`](qrpc_common::Response)s.
//!
//! - [`service`] describes a service's methods, parameters and annotations
//! - [`runtime`] builds the address binding table, resolves addresses and
//!   binds arguments
//! - [`ServiceMethodHandler`] dispatches calls against one service instance
//! - [`ServiceQueue`] serializes calls to a handler on a tokio task

pub mod config;
pub mod handler;
pub mod queue;
pub mod runtime;
pub mod service;

pub use config::{QueueConfig, ServiceConfig};
pub use handler::{LifecycleHook, ServiceMethodHandler};
pub use queue::ServiceQueue;
