//! Flat concurrent map from transaction hash to the stored transaction.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHasher};
use shardnode_primitives::{Transaction, TxHash};
use std::{
    hash::Hasher,
    sync::Arc,
};

/// Returns the chunk a byte key belongs to, stable for the lifetime of the
/// containing structure.
pub(crate) fn chunk_index(key: &[u8], num_chunks: usize) -> usize {
    let mut hasher = FxHasher::default();
    hasher.write(key);
    hasher.finish() as usize % num_chunks
}

/// _All_ transactions of one cache, identified by their hash.
///
/// Partitioned into independently locked chunks to reduce contention; a hash
/// lives in exactly one chunk. Pure lookup structure with no error
/// conditions, only used internally by the shard cache.
pub(crate) struct HashIndex {
    chunks: Box<[RwLock<FxHashMap<TxHash, Arc<Transaction>>>]>,
}

// === impl HashIndex ===

impl HashIndex {
    pub(crate) fn new(num_chunks: usize) -> Self {
        let num_chunks = num_chunks.max(1);
        let chunks = (0..num_chunks).map(|_| RwLock::new(FxHashMap::default())).collect();
        Self { chunks }
    }

    fn chunk_for(&self, key: &[u8]) -> &RwLock<FxHashMap<TxHash, Arc<Transaction>>> {
        &self.chunks[chunk_index(key, self.chunks.len())]
    }

    /// Returns whether the hash is present.
    pub(crate) fn contains(&self, hash: &[u8]) -> bool {
        self.chunk_for(hash).read().contains_key(hash)
    }

    /// Inserts or overwrites the entry for the given hash.
    pub(crate) fn put(&self, hash: TxHash, tx: Arc<Transaction>) {
        self.chunk_for(&hash).write().insert(hash, tx);
    }

    /// Returns the transaction stored under the given hash.
    pub(crate) fn get(&self, hash: &[u8]) -> Option<Arc<Transaction>> {
        self.chunk_for(hash).read().get(hash).cloned()
    }

    /// Removes and returns the entry for the given hash; `None` if absent.
    pub(crate) fn remove(&self, hash: &[u8]) -> Option<Arc<Transaction>> {
        self.chunk_for(hash).write().remove(hash)
    }

    /// Number of entries across all chunks.
    pub(crate) fn len(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.read().len()).sum()
    }

    /// All hashes currently stored.
    pub(crate) fn keys(&self) -> Vec<TxHash> {
        self.chunks.iter().flat_map(|chunk| chunk.read().keys().cloned().collect::<Vec<_>>()).collect()
    }

    /// Invokes `f` for every entry, operating on per-chunk snapshots so the
    /// chunk locks are not held during the callback.
    pub(crate) fn for_each(&self, mut f: impl FnMut(&TxHash, &Arc<Transaction>)) {
        for chunk in self.chunks.iter() {
            let snapshot: Vec<_> =
                chunk.read().iter().map(|(k, v)| (k.clone(), Arc::clone(v))).collect();
            for (hash, tx) in &snapshot {
                f(hash, tx);
            }
        }
    }

    /// Drops all entries.
    pub(crate) fn clear(&self) {
        for chunk in self.chunks.iter() {
            chunk.write().clear();
        }
    }
}
