//! Bridges a [`ShardCache`] into the general [`Cacher`] interface.

use crate::{notify::AddedTxHandler, pool::ShardCache, traits::Cacher};
use shardnode_primitives::{Transaction, TxHash};
use std::{any::Any, sync::Arc};
use tracing::debug;

/// Presents a [`ShardCache`] as a general [`Cacher`].
///
/// The transaction cache is not a general cache: it understands
/// transactions, not arbitrary values, and has no notion of a replacement
/// order or a fixed capacity. The operations that do not translate are
/// deliberately inert (`put`, `has`, `has_or_add`, `remove_oldest`,
/// `register_handler`, `max_size`); callers needing real admission go
/// through the pool.
#[derive(Debug, Clone)]
pub struct CacherAdapter(Arc<ShardCache>);

// === impl CacherAdapter ===

impl CacherAdapter {
    /// Wraps the given cache.
    pub fn new(cache: Arc<ShardCache>) -> Self {
        Self(cache)
    }

    /// The wrapped cache.
    pub fn inner(&self) -> &Arc<ShardCache> {
        &self.0
    }
}

impl Cacher for CacherAdapter {
    fn put(&self, _key: &[u8], _value: Arc<dyn Any + Send + Sync>) -> bool {
        debug!(target: "txpool", cache = %self.0.name(), "put is not supported on a transaction cache");
        false
    }

    fn get(&self, key: &[u8]) -> Option<Arc<dyn Any + Send + Sync>> {
        self.0.get_by_tx_hash(key).map(|tx| tx as Arc<dyn Any + Send + Sync>)
    }

    fn has(&self, _key: &[u8]) -> bool {
        false
    }

    fn peek(&self, key: &[u8]) -> Option<Arc<dyn Any + Send + Sync>> {
        self.0.get_by_tx_hash(key).map(|tx| tx as Arc<dyn Any + Send + Sync>)
    }

    fn has_or_add(&self, _key: &[u8], _value: Arc<dyn Any + Send + Sync>) -> (bool, bool) {
        (false, false)
    }

    fn remove(&self, key: &[u8]) {
        self.0.remove(key);
    }

    fn remove_oldest(&self) {}

    fn keys(&self) -> Vec<TxHash> {
        self.0.keys()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn max_size(&self) -> usize {
        0
    }

    fn clear(&self) {
        self.0.clear();
    }

    fn register_handler(&self, _handler: AddedTxHandler) {}
}
