use crate::protocol::error::Result;
use crate::protocol::{CallId, Response};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Encodes batches of responses bound for one return address.
///
/// The transport decides when to call this; the dispatch core only produces
/// the responses.
pub trait ProtocolEncoder {
    fn encode_responses(&self, return_address: &str, responses: &[Arc<Response>]) -> Result<String>;
}

/// Wire shape of one response.
#[derive(Debug, Serialize)]
struct ResponseFrame<'a> {
    id: CallId,
    timestamp: u64,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    success: bool,
}

#[derive(Debug, Serialize)]
struct ResponseBatch<'a> {
    return_address: &'a str,
    responses: Vec<ResponseFrame<'a>>,
}

/// JSON implementation of [`ProtocolEncoder`].
///
/// # Example
///
/// ```
/// use qrpc_common::transport::{JsonEncoder, ProtocolEncoder};
/// use qrpc_common::{Call, Response};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let call = Arc::new(Call::to_method("add").with_return_address("client-1"));
/// let responses = vec![Arc::new(Response::success(&call, json!(3)))];
///
/// let encoded = JsonEncoder.encode_responses("client-1", &responses).unwrap();
/// assert!(encoded.contains("\"result\":3"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder;

impl JsonEncoder {
    /// Encodes a single response frame.
    pub fn encode_response(response: &Response) -> Result<String> {
        Ok(serde_json::to_string(&frame(response))?)
    }
}

impl ProtocolEncoder for JsonEncoder {
    fn encode_responses(&self, return_address: &str, responses: &[Arc<Response>]) -> Result<String> {
        let batch = ResponseBatch {
            return_address,
            responses: responses.iter().map(|r| frame(r)).collect(),
        };
        Ok(serde_json::to_string(&batch)?)
    }
}

fn frame(response: &Response) -> ResponseFrame<'_> {
    ResponseFrame {
        id: response.id,
        timestamp: response.timestamp,
        name: &response.name,
        result: response.value(),
        error: response.error().map(|e| e.to_string()),
        success: response.is_success(),
    }
}
