//! Fan-out of "transaction added" notifications to registered handlers.
//!
//! Handlers run on background tasks, decoupled from the admission path by a
//! bounded queue. A full queue drops the notification rather than stalling
//! admissions.

use crate::metrics::NotifierMetrics;
use parking_lot::{Mutex, RwLock};
use shardnode_primitives::TxHash;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

/// Callback invoked with the hash of every newly added transaction.
pub type AddedTxHandler = Arc<dyn Fn(&TxHash) + Send + Sync>;

const NOTIFICATION_QUEUE_CAPACITY: usize = 1024;
const NOTIFICATION_WORKERS: usize = 4;

/// Dispatches added-transaction notifications to registered handlers.
///
/// Worker tasks are spawned lazily when the first handler is registered, so
/// a pool with no handlers pays nothing on the admission path. Registration
/// must happen inside a tokio runtime.
pub(crate) struct AddedTxNotifier {
    handlers: Arc<RwLock<Vec<AddedTxHandler>>>,
    queue: Mutex<Option<mpsc::Sender<TxHash>>>,
    metrics: NotifierMetrics,
}

// === impl AddedTxNotifier ===

impl AddedTxNotifier {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
            queue: Mutex::new(None),
            metrics: NotifierMetrics::default(),
        }
    }

    /// Registers a handler, spawning the worker tasks on first registration.
    pub(crate) fn register_handler(&self, handler: AddedTxHandler) {
        self.handlers.write().push(handler);

        let mut queue = self.queue.lock();
        if queue.is_some() {
            return
        }
        let (tx, rx) = mpsc::channel::<TxHash>(NOTIFICATION_QUEUE_CAPACITY);
        *queue = Some(tx);

        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        for _ in 0..NOTIFICATION_WORKERS {
            let rx = Arc::clone(&rx);
            let handlers = Arc::clone(&self.handlers);
            tokio::spawn(async move {
                loop {
                    // hold the receiver lock only for the recv itself
                    let hash = { rx.lock().await.recv().await };
                    let Some(hash) = hash else { break };
                    let handlers = handlers.read().clone();
                    for handler in handlers {
                        handler(&hash);
                    }
                }
            });
        }
    }

    /// Queues a notification for the given hash. Dropped when no handler is
    /// registered or when the queue is full.
    pub(crate) fn notify_added(&self, hash: &TxHash) {
        let queue = self.queue.lock();
        let Some(sender) = queue.as_ref() else { return };
        match sender.try_send(hash.clone()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.metrics.dropped_notifications.increment(1);
                debug!(target: "txpool", "notification queue full, dropping notification");
            }
            // workers only stop when the notifier is dropped
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
