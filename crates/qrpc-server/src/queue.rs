//! Service queue actor.
//!
//! A [`ServiceQueue`] owns a [`ServiceMethodHandler`] on its own tokio task.
//! Calls arrive over a bounded channel and are dispatched one at a time, so
//! the service never sees concurrent calls. Non-void responses are sent to
//! the outbound queue and flushed once per batch.
//!
//! # Batches and hooks
//!
//! The task blocks for one call, then keeps taking calls that are already
//! waiting until the channel is empty or `batch_limit` calls were
//! dispatched. At the end of the batch it fires `queueLimit` if the limit was
//! hit and `queueEmpty` otherwise. `queueIdle` fires whenever `idle_timeout`
//! passes without a call and `queueShutdown` fires once the inbound side is
//! closed and drained.

use std::sync::Arc;

use qrpc_common::protocol::error::{QrpcError, Result};
use qrpc_common::{Call, SendQueue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::QueueConfig;
use crate::handler::ServiceMethodHandler;

pub struct ServiceQueue<S> {
    sender: mpsc::Sender<Call>,
    task: JoinHandle<ServiceMethodHandler<S>>,
}

impl<S: Send + 'static> ServiceQueue<S> {
    /// Binds `outbound` to the handler and starts its task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        mut handler: ServiceMethodHandler<S>,
        outbound: Arc<dyn SendQueue>,
        config: QueueConfig,
    ) -> Result<Self> {
        config.validate().map_err(QrpcError::InvalidConfig)?;
        handler.init_outbound(Arc::clone(&outbound));

        let (sender, inbound) = mpsc::channel(config.inbound_capacity);
        tracing::info!(
            "Starting service queue for '{}' (batch limit {}, idle timeout {:?})",
            handler.address(),
            config.batch_limit,
            config.idle_timeout
        );
        let task = tokio::spawn(run(handler, inbound, outbound, config));

        Ok(Self { sender, task })
    }

    /// Enqueues a call, waiting for room in the inbound channel.
    pub async fn send(&self, call: Call) -> Result<()> {
        self.sender
            .send(call)
            .await
            .map_err(|_| QrpcError::QueueClosed("service task stopped".into()))
    }

    /// Enqueues a call without waiting.
    pub fn try_send(&self, call: Call) -> Result<()> {
        self.sender.try_send(call).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => QrpcError::QueueClosed("inbound queue is full".into()),
            mpsc::error::TrySendError::Closed(_) => QrpcError::QueueClosed("service task stopped".into()),
        })
    }

    /// A sender for other producers. The queue only shuts down once every
    /// clone is dropped.
    pub fn sender(&self) -> mpsc::Sender<Call> {
        self.sender.clone()
    }

    /// Closes the inbound side, lets the task drain what is queued and
    /// returns the handler.
    pub async fn shutdown(self) -> Result<ServiceMethodHandler<S>> {
        drop(self.sender);
        self.task
            .await
            .map_err(|e| QrpcError::QueueClosed(format!("service task failed: {}", e)))
    }
}

async fn run<S>(
    mut handler: ServiceMethodHandler<S>,
    mut inbound: mpsc::Receiver<Call>,
    outbound: Arc<dyn SendQueue>,
    config: QueueConfig,
) -> ServiceMethodHandler<S> {
    loop {
        let first = match tokio::time::timeout(config.idle_timeout, inbound.recv()).await {
            Ok(Some(call)) => call,
            Ok(None) => break,
            Err(_) => {
                handler.notify_idle();
                continue;
            }
        };

        let mut dispatched = 0;
        let mut next = Some(first);
        while let Some(call) = next {
            let response = handler.dispatch(call);
            if !response.is_void() {
                if let Err(e) = outbound.send(response) {
                    tracing::warn!("Dropping response: {}", e);
                }
            }
            dispatched += 1;
            if dispatched >= config.batch_limit {
                break;
            }
            next = inbound.try_recv().ok();
        }

        if let Err(e) = outbound.flush() {
            tracing::warn!("Failed to flush responses: {}", e);
        }

        if dispatched >= config.batch_limit {
            tracing::debug!("Batch limit of {} reached", config.batch_limit);
            handler.notify_limit();
        } else {
            handler.notify_empty();
        }
    }

    tracing::info!("Service queue for '{}' shutting down", handler.address());
    handler.notify_shutdown();
    handler
}
