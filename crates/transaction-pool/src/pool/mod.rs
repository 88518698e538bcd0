//! A single shard's transaction cache.
//!
//! The cache keeps two views of the same transactions in lockstep: a flat
//! [hash index](hash_index::HashIndex) for lookup by hash and a
//! [sender table](sender_table::SenderTable) of per-sender, nonce-ordered
//! chains for selection and eviction. Both views are partitioned into
//! independently locked chunks; a coarse gate additionally separates
//! admissions and removals (shared) from eviction and clearing (exclusive).

use crate::{
    config::{CacheConfig, EvictionConfig},
    error::{PoolError, PoolResult},
    metrics::TxCacheMetrics,
    pool::{hash_index::HashIndex, sender_chain::ChainInsertOutcome, sender_table::SenderTable},
};
use parking_lot::RwLock;
use shardnode_primitives::{Transaction, TxHash};
use std::sync::{
    atomic::{AtomicI64, AtomicU64, Ordering},
    Arc,
};
use tracing::debug;

mod eviction;
mod hash_index;
mod selection;
mod sender_chain;
mod sender_table;

pub use selection::SELECTION_BATCH_PER_SENDER;

/// The transaction cache of one shard pairing.
///
/// Holds pending transactions indexed both by hash and by sender, admits and
/// removes transactions concurrently, evicts under memory pressure and
/// serves fee-ordered selection snapshots.
pub struct ShardCache {
    /// Cache name, used in logs and metric labels.
    name: String,
    /// All transactions by hash.
    hash_index: HashIndex,
    /// All transactions grouped per sender, ordered by nonce.
    senders: SenderTable,
    eviction_config: EvictionConfig,
    /// Coarse phase gate: admissions and removals take it shared, eviction
    /// and clearing take it exclusively.
    gate: RwLock<()>,
    /// Signed so that transient remove-before-add interleavings cannot wrap.
    tx_count: AtomicI64,
    num_bytes: AtomicU64,
    metrics: TxCacheMetrics,
}

// === impl ShardCache ===

impl ShardCache {
    /// Creates an empty cache.
    pub fn new(cache_config: CacheConfig, eviction_config: EvictionConfig) -> Self {
        let num_chunks = cache_config.num_chunks.max(1) as usize;
        let metrics = TxCacheMetrics::new(&cache_config.name);
        Self {
            name: cache_config.name,
            hash_index: HashIndex::new(num_chunks),
            senders: SenderTable::new(num_chunks),
            eviction_config,
            gate: RwLock::new(()),
            tx_count: AtomicI64::new(0),
            num_bytes: AtomicU64::new(0),
            metrics,
        }
    }

    /// The cache name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Admits a transaction into the cache.
    ///
    /// Returns `(valid, added)`: a malformed transaction (empty hash, or a
    /// hash that does not match the key it is stored under) yields
    /// `(false, false)`; a transaction already present, or one losing a
    /// same-nonce gas price contest, yields `(true, false)`. Admission is
    /// idempotent per hash.
    pub fn add_tx(&self, hash: TxHash, tx: Arc<Transaction>) -> (bool, bool) {
        if hash.is_empty() || tx.hash != hash {
            debug!(target: "txpool", cache = %self.name, "rejecting malformed transaction");
            return (false, false)
        }

        let added = {
            let _gate = self.gate.read();
            if self.hash_index.contains(&hash) {
                return (true, false)
            }

            let mut delta_count = 0i64;
            let mut delta_bytes = 0i64;
            let outcome = self.senders.insert_tx(Arc::clone(&tx), |outcome| {
                // runs under the sender chunk lock, keeping both maps in step
                match outcome {
                    ChainInsertOutcome::Inserted => {
                        self.hash_index.put(hash.clone(), Arc::clone(&tx));
                        delta_count = 1;
                        delta_bytes = tx.approximate_size() as i64;
                    }
                    ChainInsertOutcome::Replaced { evicted } => {
                        self.hash_index.remove(&evicted.hash);
                        self.hash_index.put(hash.clone(), Arc::clone(&tx));
                        delta_bytes =
                            tx.approximate_size() as i64 - evicted.approximate_size() as i64;
                    }
                    ChainInsertOutcome::DuplicateHash | ChainInsertOutcome::Underpriced => {}
                }
            });
            self.apply_deltas(delta_count, delta_bytes);

            matches!(
                outcome,
                ChainInsertOutcome::Inserted | ChainInsertOutcome::Replaced { .. }
            )
        };

        if added {
            self.metrics.inserted_transactions.increment(1);
            self.evict_if_necessary();
        }
        (true, added)
    }

    /// Removes the transaction with the given hash.
    ///
    /// Errors with [`PoolError::TxNotFound`] when the hash is unknown and
    /// with [`PoolError::MapsSyncInconsistency`] when the hash index knew the
    /// transaction but the sender table did not.
    pub fn remove_tx_by_hash(&self, hash: &[u8]) -> PoolResult<()> {
        let _gate = self.gate.read();

        // claiming the index entry first makes concurrent removals of the
        // same hash race-safe: exactly one caller gets the transaction
        let tx = self.hash_index.remove(hash).ok_or(PoolError::TxNotFound)?;
        if !self.senders.remove_tx(&tx.sender, hash) {
            return Err(PoolError::MapsSyncInconsistency)
        }

        self.apply_deltas(-1, -(tx.approximate_size() as i64));
        self.metrics.removed_transactions.increment(1);
        Ok(())
    }

    /// Removes the transaction if present, swallowing the not-found case.
    pub fn remove(&self, hash: &[u8]) {
        if let Err(err) = self.remove_tx_by_hash(hash) {
            if err == PoolError::MapsSyncInconsistency {
                debug!(target: "txpool", cache = %self.name, %err, "transaction removal failed");
            }
        }
    }

    /// Returns the transaction with the given hash.
    pub fn get_by_tx_hash(&self, hash: &[u8]) -> Option<Arc<Transaction>> {
        self.hash_index.get(hash)
    }

    /// Returns whether the hash is present.
    pub fn contains(&self, hash: &[u8]) -> bool {
        self.hash_index.contains(hash)
    }

    /// All transaction hashes currently cached, in no particular order.
    pub fn keys(&self) -> Vec<TxHash> {
        self.hash_index.keys()
    }

    /// Number of cached transactions.
    pub fn len(&self) -> usize {
        self.hash_index.len()
    }

    /// Returns whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of cached transactions per the admission counters.
    pub fn count_tx(&self) -> i64 {
        self.tx_count.load(Ordering::Relaxed)
    }

    /// Number of cached bytes per the admission counters.
    pub fn num_bytes(&self) -> u64 {
        self.num_bytes.load(Ordering::Relaxed)
    }

    /// Number of distinct senders with at least one cached transaction.
    pub fn count_senders(&self) -> usize {
        self.senders.count_senders()
    }

    /// Invokes `f` for every cached transaction over a point-in-time
    /// snapshot; no internal locks are held during the callbacks.
    pub fn for_each_transaction(&self, mut f: impl FnMut(&TxHash, &Arc<Transaction>)) {
        self.hash_index.for_each(|hash, tx| f(hash, tx));
    }

    /// Drops all transactions.
    pub fn clear(&self) {
        let _gate = self.gate.write();
        self.hash_index.clear();
        self.senders.clear();
        self.tx_count.store(0, Ordering::Relaxed);
        self.num_bytes.store(0, Ordering::Relaxed);
    }

    /// Returns whether the hash index and the sender table agree on the
    /// number of cached transactions. Diagnostic aid.
    pub fn maps_in_sync(&self) -> bool {
        let _gate = self.gate.write();
        self.hash_index.len() == self.senders.count_txs()
    }

    fn apply_deltas(&self, delta_count: i64, delta_bytes: i64) {
        if delta_count != 0 {
            self.tx_count.fetch_add(delta_count, Ordering::Relaxed);
        }
        match delta_bytes {
            0 => {}
            d if d > 0 => {
                self.num_bytes.fetch_add(d as u64, Ordering::Relaxed);
            }
            d => {
                // saturate at zero instead of wrapping on transient skew
                let _ = self.num_bytes.fetch_update(
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                    |bytes| Some(bytes.saturating_sub(d.unsigned_abs())),
                );
            }
        }
    }

    pub(crate) fn eviction_config(&self) -> &EvictionConfig {
        &self.eviction_config
    }
}

impl std::fmt::Debug for ShardCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardCache")
            .field("name", &self.name)
            .field("tx_count", &self.count_tx())
            .field("num_bytes", &self.num_bytes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{add, mk_tx, mk_tx_with_gas_price};

    fn cache() -> ShardCache {
        ShardCache::new(CacheConfig::default(), EvictionConfig::disabled())
    }

    #[test]
    fn add_is_idempotent_per_hash() {
        let cache = cache();
        let tx = mk_tx("alice", 1);

        assert_eq!(cache.add_tx(tx.hash.clone(), Arc::clone(&tx)), (true, true));
        assert_eq!(cache.add_tx(tx.hash.clone(), Arc::clone(&tx)), (true, false));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.count_tx(), 1);
        assert_eq!(cache.num_bytes(), tx.approximate_size());
    }

    #[test]
    fn add_rejects_malformed_transactions() {
        let cache = cache();
        let tx = mk_tx("alice", 1);

        // empty hash
        assert_eq!(cache.add_tx(bytes::Bytes::new(), Arc::clone(&tx)), (false, false));
        // key does not match the transaction's own hash
        assert_eq!(
            cache.add_tx(bytes::Bytes::from_static(b"other"), Arc::clone(&tx)),
            (false, false)
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn replacement_keeps_counters_consistent() {
        let cache = cache();
        let original = mk_tx_with_gas_price("alice", 7, "hash-a", 100);
        let outbidder = mk_tx_with_gas_price("alice", 7, "hash-b", 101);

        assert_eq!(add(&cache, &original), (true, true));
        assert_eq!(add(&cache, &outbidder), (true, true));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.count_tx(), 1);
        assert!(cache.get_by_tx_hash(b"hash-a").is_none());
        assert_eq!(cache.get_by_tx_hash(b"hash-b").unwrap().gas_price, 101);
        assert!(cache.maps_in_sync());
    }

    #[test]
    fn underpriced_resubmission_is_not_added() {
        let cache = cache();
        let original = mk_tx_with_gas_price("alice", 7, "hash-a", 100);
        let underbidder = mk_tx_with_gas_price("alice", 7, "hash-b", 100);

        assert_eq!(add(&cache, &original), (true, true));
        assert_eq!(add(&cache, &underbidder), (true, false));
        assert!(cache.get_by_tx_hash(b"hash-b").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn remove_unknown_hash_errors() {
        let cache = cache();
        assert_eq!(cache.remove_tx_by_hash(b"missing"), Err(PoolError::TxNotFound));
    }

    #[test]
    fn remove_roundtrip() {
        let cache = cache();
        let tx = mk_tx("alice", 1);
        add(&cache, &tx);

        assert_eq!(cache.remove_tx_by_hash(&tx.hash), Ok(()));
        assert!(cache.is_empty());
        assert_eq!(cache.count_tx(), 0);
        assert_eq!(cache.num_bytes(), 0);
        assert_eq!(cache.count_senders(), 0);
        assert_eq!(cache.remove_tx_by_hash(&tx.hash), Err(PoolError::TxNotFound));
    }

    #[test]
    fn desynced_maps_are_reported_not_repaired() {
        let cache = cache();
        let tx = mk_tx("alice", 1);
        add(&cache, &tx);

        // corrupt the sender table behind the cache's back
        cache.senders.remove_sender(b"alice");

        assert_eq!(cache.remove_tx_by_hash(&tx.hash), Err(PoolError::MapsSyncInconsistency));
    }

    #[test]
    fn clear_empties_everything() {
        let cache = cache();
        for nonce in 1..=10 {
            add(&cache, &mk_tx("alice", nonce));
        }
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.count_tx(), 0);
        assert_eq!(cache.num_bytes(), 0);
        assert!(cache.maps_in_sync());
    }

    #[test]
    fn concurrent_adds_and_removes_keep_maps_in_sync() {
        let cache = Arc::new(cache());
        std::thread::scope(|scope| {
            for worker in 0..4 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    let sender = format!("sender-{worker}");
                    for nonce in 0..200 {
                        add(&cache, &mk_tx(&sender, nonce));
                    }
                    for nonce in (0..200).step_by(2) {
                        let hash = mk_tx(&sender, nonce).hash.clone();
                        cache.remove(&hash);
                    }
                });
            }
        });
        assert!(cache.maps_in_sync());
        assert_eq!(cache.len(), 4 * 100);
        assert_eq!(cache.count_tx(), 400);
    }
}
