use std::sync::Arc;

use qrpc_common::{Call, Callback, Response, SendQueue};

/// Builds the callback handed to a method's callback slot.
///
/// Every completion becomes a response tagged from `call` and is sent and
/// flushed on `outbound` immediately. Without an outbound queue completions
/// are logged and dropped.
pub fn callback_for(outbound: Option<Arc<dyn SendQueue>>, call: Arc<Call>) -> Callback {
    Callback::new(move |result| {
        let response = Arc::new(Response::from_call(&call, result));
        match &outbound {
            Some(queue) => {
                if let Err(e) = queue.send_and_flush(response) {
                    tracing::warn!("Failed to deliver deferred response for call {}: {}", call.id, e);
                }
            }
            None => {
                tracing::warn!(
                    "No outbound queue bound; dropping deferred response for call {}",
                    call.id
                );
            }
        }
    })
}
