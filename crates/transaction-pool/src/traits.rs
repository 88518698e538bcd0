//! Trait seams of the transaction pool.

use crate::{error::PoolResult, notify::AddedTxHandler, pool::ShardCache};
use shardnode_primitives::{Transaction, TxHash};
use std::{any::Any, sync::Arc};

/// Narrow interface of a single shard's transaction store, as consumed by
/// block proposal and transaction processing.
pub trait TxDataStore: Send + Sync {
    /// Admits a transaction; returns `(valid, added)`.
    fn add_tx(&self, hash: TxHash, tx: Arc<Transaction>) -> (bool, bool);

    /// Returns the transaction with the given hash.
    fn get_by_tx_hash(&self, hash: &[u8]) -> Option<Arc<Transaction>>;

    /// Removes the transaction with the given hash.
    fn remove_tx_by_hash(&self, hash: &[u8]) -> PoolResult<()>;

    /// Selects up to `max_count` transactions for inclusion in a block.
    fn select_transactions(
        &self,
        max_count: usize,
        degree_of_parallelism: usize,
    ) -> (Vec<Arc<Transaction>>, Vec<TxHash>);

    /// Invokes `f` for every stored transaction over a point-in-time
    /// snapshot.
    fn for_each_transaction(&self, f: &mut dyn FnMut(&TxHash, &Arc<Transaction>));

    /// Number of stored transactions.
    fn len(&self) -> usize;

    /// Returns whether the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops all transactions.
    fn clear(&self);
}

impl TxDataStore for ShardCache {
    fn add_tx(&self, hash: TxHash, tx: Arc<Transaction>) -> (bool, bool) {
        Self::add_tx(self, hash, tx)
    }

    fn get_by_tx_hash(&self, hash: &[u8]) -> Option<Arc<Transaction>> {
        Self::get_by_tx_hash(self, hash)
    }

    fn remove_tx_by_hash(&self, hash: &[u8]) -> PoolResult<()> {
        Self::remove_tx_by_hash(self, hash)
    }

    fn select_transactions(
        &self,
        max_count: usize,
        degree_of_parallelism: usize,
    ) -> (Vec<Arc<Transaction>>, Vec<TxHash>) {
        Self::select_transactions(self, max_count, degree_of_parallelism)
    }

    fn for_each_transaction(&self, f: &mut dyn FnMut(&TxHash, &Arc<Transaction>)) {
        Self::for_each_transaction(self, f)
    }

    fn len(&self) -> usize {
        Self::len(self)
    }

    fn clear(&self) {
        Self::clear(self)
    }
}

/// General key-value cache interface the storage layer programs against.
///
/// The transaction caches are not general caches; see
/// [`CacherAdapter`](crate::CacherAdapter) for how they surface through this
/// interface.
pub trait Cacher: Send + Sync {
    /// Stores the value under the key; returns whether an entry was evicted
    /// to make room.
    fn put(&self, key: &[u8], value: Arc<dyn Any + Send + Sync>) -> bool;

    /// Returns the value stored under the key.
    fn get(&self, key: &[u8]) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Returns whether the key is present.
    fn has(&self, key: &[u8]) -> bool;

    /// Returns the value without affecting any replacement state.
    fn peek(&self, key: &[u8]) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Stores the value if the key is absent; returns `(found, evicted)`.
    fn has_or_add(&self, key: &[u8], value: Arc<dyn Any + Send + Sync>) -> (bool, bool);

    /// Removes the entry for the key.
    fn remove(&self, key: &[u8]);

    /// Removes the oldest entry.
    fn remove_oldest(&self);

    /// All stored keys.
    fn keys(&self) -> Vec<TxHash>;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Returns whether the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries, when bounded by count.
    fn max_size(&self) -> usize;

    /// Drops all entries.
    fn clear(&self);

    /// Registers a handler invoked for every added entry.
    fn register_handler(&self, handler: AddedTxHandler);
}
