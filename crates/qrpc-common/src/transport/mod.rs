//! QRPC Outbound Layer
//!
//! This module defines where finished responses go once the dispatch core is
//! done with them.
//!
//! # Components
//!
//! - **[`SendQueue`]**: the outbound channel contract (`send`, `flush`, `send_and_flush`)
//! - **[`ChannelQueue`]**: a buffered `SendQueue` that flushes onto a tokio channel
//! - **[`ProtocolEncoder`]** / **[`JsonEncoder`]**: encode a batch of responses for a
//!   return address
//!
//! Socket handling and call decoding belong to the host and are not part of
//! this crate.
//!
//! # Example
//!
//! ```
//! use qrpc_common::transport::{ChannelQueue, SendQueue};
//! use qrpc_common::{Call, Response};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let (queue, mut receiver) = ChannelQueue::new();
//! let call = Arc::new(Call::to_method("ping"));
//!
//! queue.send_and_flush(Arc::new(Response::success(&call, json!("pong")))).unwrap();
//! assert!(receiver.try_recv().is_ok());
//! ```

pub mod codec;
pub mod queue;

pub use codec::{JsonEncoder, ProtocolEncoder};
pub use queue::{ChannelQueue, ResponseReceiver, SendQueue};
