//! Notification dispatch boundary.
//!
//! The workflow hands every [`WorkflowEvent`] to a dispatcher once the
//! state change behind it has been persisted. Templating and delivery
//! live behind this trait.

use procura_core::models::notification::WorkflowEvent;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::info;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification queue is closed")]
    QueueClosed,

    #[error("notification queue is full")]
    QueueFull,
}

pub trait NotificationDispatcher: Send + Sync {
    fn dispatch(
        &self,
        event: &WorkflowEvent,
    ) -> impl Future<Output = Result<(), DispatchError>> + Send;
}

/// Dispatcher that only records events in the log.
#[derive(Debug, Clone, Default)]
pub struct LogDispatcher;

impl NotificationDispatcher for LogDispatcher {
    async fn dispatch(&self, event: &WorkflowEvent) -> Result<(), DispatchError> {
        info!(
            po_id = %event.po_id,
            po_number = %event.po_number,
            kind = event.kind.name(),
            "Notification requested"
        );
        Ok(())
    }
}

/// Dispatcher that queues events for a separate consumer task.
///
/// Never waits on the consumer: when the queue is full the event is
/// refused with [`DispatchError::QueueFull`].
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::Sender<WorkflowEvent>,
}

impl ChannelDispatcher {
    /// Create a dispatcher and the receiving end of its queue.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<WorkflowEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl NotificationDispatcher for ChannelDispatcher {
    async fn dispatch(&self, event: &WorkflowEvent) -> Result<(), DispatchError> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DispatchError::QueueFull,
            TrySendError::Closed(_) => DispatchError::QueueClosed,
        })
    }
}
