//! QRPC Common Types and Outbound Contracts
//!
//! This crate provides the protocol types exchanged with the QRPC dispatch core
//! and the outbound boundary the core hands finished responses to.
//!
//! # Overview
//!
//! The dispatch core receives already-decoded method calls and produces
//! responses. Everything that crosses that boundary lives here:
//!
//! - **Protocol Layer**: [`Call`], [`Response`], [`Callback`], faults and argument types
//! - **Transport Layer**: the [`SendQueue`] outbound channel contract and a
//!   response encoder
//!
//! # Example
//!
//! ```
//! use qrpc_common::{Call, Response};
//! use serde_json::json;
//!
//! let call = Call::to_address("calc/add").with_body(json!([1, 2]));
//! let call = std::sync::Arc::new(call);
//!
//! let response = Response::success(&call, json!(3));
//! assert_eq!(response.id, call.id);
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::*;
pub use transport::{ChannelQueue, JsonEncoder, ProtocolEncoder, SendQueue};
