//! Transaction pool metrics.

use metrics::{counter, Counter};

/// Per-cache transaction pool metrics.
#[derive(Clone)]
pub(crate) struct TxCacheMetrics {
    /// Number of transactions inserted in the cache.
    pub(crate) inserted_transactions: Counter,
    /// Number of transactions removed from the cache.
    pub(crate) removed_transactions: Counter,
    /// Number of transactions evicted under memory pressure.
    pub(crate) evicted_transactions: Counter,
}

impl TxCacheMetrics {
    pub(crate) fn new(cache: &str) -> Self {
        Self {
            inserted_transactions: counter!("txpool_inserted_transactions", "cache" => cache.to_owned()),
            removed_transactions: counter!("txpool_removed_transactions", "cache" => cache.to_owned()),
            evicted_transactions: counter!("txpool_evicted_transactions", "cache" => cache.to_owned()),
        }
    }
}

/// Metrics of the add-notification fan-out.
#[derive(Clone)]
pub(crate) struct NotifierMetrics {
    /// Notifications dropped because the queue was full.
    pub(crate) dropped_notifications: Counter,
}

impl Default for NotifierMetrics {
    fn default() -> Self {
        Self { dropped_notifications: counter!("txpool_dropped_notifications") }
    }
}
