//! The sharded transaction pool: one [`ShardCache`] per shard pairing.

use crate::{
    config::{CacheConfig, EvictionConfig},
    notify::{AddedTxHandler, AddedTxNotifier},
    pool::ShardCache,
    ShardCacheId,
};
use parking_lot::RwLock;
use shardnode_primitives::{Transaction, TxHash};
use std::{any::Any, collections::HashMap, sync::Arc};
use tracing::debug;

/// Transaction pool of a node, split into independent per-shard caches.
///
/// Caches are keyed by a shard cache id (e.g. `"0"`, `"0_1"`) and created
/// lazily on first access; the pool itself only routes operations to the
/// right cache and fans out added-transaction notifications.
pub struct ShardedTxPool {
    backing: RwLock<HashMap<ShardCacheId, Arc<ShardCache>>>,
    notifier: AddedTxNotifier,
    cache_config: CacheConfig,
    eviction_config: EvictionConfig,
}

// === impl ShardedTxPool ===

impl ShardedTxPool {
    /// Creates an empty pool; per-cache settings are stamped from the given
    /// configs when a cache is first touched.
    pub fn new(cache_config: CacheConfig, eviction_config: EvictionConfig) -> Self {
        Self {
            backing: RwLock::new(HashMap::new()),
            notifier: AddedTxNotifier::new(),
            cache_config,
            eviction_config,
        }
    }

    /// Returns the cache of the given shard pairing, creating it on first
    /// access.
    pub fn shard_data_store(&self, cache_id: &str) -> Arc<ShardCache> {
        if let Some(cache) = self.backing.read().get(cache_id) {
            return Arc::clone(cache)
        }
        let mut backing = self.backing.write();
        // raced creations resolve to whichever cache landed first
        let cache = backing.entry(cache_id.to_owned()).or_insert_with(|| {
            let name = format!("{}/{cache_id}", self.cache_config.name);
            let config = CacheConfig { name, ..self.cache_config.clone() };
            Arc::new(ShardCache::new(config, self.eviction_config.clone()))
        });
        Arc::clone(cache)
    }

    /// Adds an untyped value to the given cache. Values that are not
    /// transactions are dropped.
    pub fn add_data(&self, key: &[u8], value: Arc<dyn Any + Send + Sync>, cache_id: &str) {
        match value.downcast::<Transaction>() {
            Ok(tx) => self.add_tx_with_key(key, tx, cache_id),
            Err(_) => {
                debug!(target: "txpool", cache_id, "dropping non-transaction value");
            }
        }
    }

    /// Adds a transaction to the given cache, notifying registered handlers
    /// when it was actually added.
    pub fn add_tx(&self, tx: Arc<Transaction>, cache_id: &str) {
        let hash = tx.hash.clone();
        self.add_tx_with_key(&hash, tx, cache_id);
    }

    fn add_tx_with_key(&self, key: &[u8], tx: Arc<Transaction>, cache_id: &str) {
        let cache = self.shard_data_store(cache_id);
        let (_, added) = cache.add_tx(bytes::Bytes::copy_from_slice(key), Arc::clone(&tx));
        if added {
            self.notifier.notify_added(&tx.hash);
        }
    }

    /// Searches all caches for the given hash, in ascending cache id order,
    /// and returns the first match.
    pub fn search_first_data(&self, key: &[u8]) -> Option<Arc<Transaction>> {
        let mut caches: Vec<_> = self
            .backing
            .read()
            .iter()
            .map(|(id, cache)| (id.clone(), Arc::clone(cache)))
            .collect();
        caches.sort_by(|(a, _), (b, _)| a.cmp(b));
        caches.into_iter().find_map(|(_, cache)| cache.get_by_tx_hash(key))
    }

    /// Removes the transaction with the given hash from the given cache.
    pub fn remove_data(&self, key: &[u8], cache_id: &str) {
        if let Some(cache) = self.existing(cache_id) {
            cache.remove(key);
        }
    }

    /// Removes a set of transactions from the given cache; unknown hashes
    /// are skipped.
    pub fn remove_set_of_data(&self, keys: &[TxHash], cache_id: &str) {
        let Some(cache) = self.existing(cache_id) else { return };
        for key in keys {
            cache.remove(key);
        }
    }

    /// Removes the transaction with the given hash from every cache.
    pub fn remove_data_from_all_shards(&self, key: &[u8]) {
        let caches: Vec<_> = self.backing.read().values().cloned().collect();
        for cache in caches {
            cache.remove(key);
        }
    }

    /// Moves all transactions of the source cache into the destination
    /// cache, then drops the source cache.
    pub fn merge_shard_stores(&self, source_cache_id: &str, dest_cache_id: &str) {
        let Some(source) = self.existing(source_cache_id) else { return };
        let dest = self.shard_data_store(dest_cache_id);

        source.for_each_transaction(|hash, tx| {
            let (_, added) = dest.add_tx(hash.clone(), Arc::clone(tx));
            if added {
                self.notifier.notify_added(&tx.hash);
            }
        });
        self.backing.write().remove(source_cache_id);
    }

    /// Moves the given transactions from the source cache to the destination
    /// cache; hashes unknown to the source are skipped.
    pub fn move_txs(&self, source_cache_id: &str, dest_cache_id: &str, hashes: &[TxHash]) {
        let Some(source) = self.existing(source_cache_id) else { return };
        let dest = self.shard_data_store(dest_cache_id);

        for hash in hashes {
            let Some(tx) = source.get_by_tx_hash(hash) else { continue };
            let (_, added) = dest.add_tx(hash.clone(), Arc::clone(&tx));
            if added {
                self.notifier.notify_added(&tx.hash);
            }
            source.remove(hash);
        }
    }

    /// Drops all caches.
    pub fn clear(&self) {
        self.backing.write().clear();
    }

    /// Drops all transactions of the given cache; the cache itself stays
    /// registered.
    pub fn clear_shard_store(&self, cache_id: &str) {
        if let Some(cache) = self.existing(cache_id) {
            cache.clear();
        }
    }

    /// Registers a handler invoked for every added transaction, across all
    /// caches. Must be called inside a tokio runtime.
    pub fn register_handler(&self, handler: AddedTxHandler) {
        self.notifier.register_handler(handler);
    }

    /// Number of currently instantiated caches.
    pub fn num_shard_stores(&self) -> usize {
        self.backing.read().len()
    }

    fn existing(&self, cache_id: &str) -> Option<Arc<ShardCache>> {
        self.backing.read().get(cache_id).cloned()
    }
}

impl std::fmt::Debug for ShardedTxPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedTxPool")
            .field("num_shard_stores", &self.num_shard_stores())
            .finish_non_exhaustive()
    }
}
