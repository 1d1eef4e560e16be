use crate::protocol::error::{QrpcError, Result};
use crate::protocol::Response;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub type ResponseReceiver = mpsc::UnboundedReceiver<Arc<Response>>;

/// Outbound channel for finished responses.
///
/// Implementations must accept sends from any thread: deferred callbacks
/// complete on whatever thread the service chose.
pub trait SendQueue: Send + Sync {
    /// Enqueues a response. It may sit in a buffer until [`SendQueue::flush`].
    fn send(&self, response: Arc<Response>) -> Result<()>;

    /// Pushes everything buffered so far towards the consumer.
    fn flush(&self) -> Result<()>;

    fn send_and_flush(&self, response: Arc<Response>) -> Result<()> {
        self.send(response)?;
        self.flush()
    }
}

/// A [`SendQueue`] that buffers responses and hands them to a tokio channel
/// on flush.
///
/// # Example
///
/// ```
/// use qrpc_common::transport::{ChannelQueue, SendQueue};
/// use qrpc_common::{Call, Response};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let (queue, mut receiver) = ChannelQueue::new();
/// let call = Arc::new(Call::to_method("ping"));
///
/// queue.send(Arc::new(Response::success(&call, json!(1)))).unwrap();
/// assert!(receiver.try_recv().is_err());
///
/// queue.flush().unwrap();
/// assert!(receiver.try_recv().is_ok());
/// ```
pub struct ChannelQueue {
    pending: Mutex<Vec<Arc<Response>>>,
    sender: mpsc::UnboundedSender<Arc<Response>>,
}

impl ChannelQueue {
    pub fn new() -> (Self, ResponseReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let queue = Self {
            pending: Mutex::new(Vec::new()),
            sender,
        };
        (queue, receiver)
    }

    /// Number of responses sent but not yet flushed.
    pub fn pending(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl SendQueue for ChannelQueue {
    fn send(&self, response: Arc<Response>) -> Result<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| QrpcError::QueueClosed("outbound buffer poisoned".into()))?;
        pending.push(response);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let drained = {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| QrpcError::QueueClosed("outbound buffer poisoned".into()))?;
            std::mem::take(&mut *pending)
        };

        tracing::trace!("Flushing {} responses", drained.len());
        for response in drained {
            self.sender
                .send(response)
                .map_err(|_| QrpcError::QueueClosed("response receiver dropped".into()))?;
        }
        Ok(())
    }
}
