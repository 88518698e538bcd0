//! Partitioned collection of all sender chains of one cache.

use crate::pool::{
    hash_index::chunk_index,
    sender_chain::{ChainInsertOutcome, SenderChain},
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use shardnode_primitives::{SenderAddress, Transaction};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

type TableChunk = FxHashMap<SenderAddress, SenderChain>;

/// A read-only copy of one sender's chain, taken under the chunk lock.
#[derive(Debug, Clone)]
pub(crate) struct ChainSnapshot {
    pub(crate) sender: SenderAddress,
    /// Ascending by nonce.
    pub(crate) txs: Vec<Arc<Transaction>>,
}

/// All sender chains, keyed by sender address.
///
/// Partitioned into N independently locked chunks by a stable hash of the
/// sender; a sender's chain lives in exactly one chunk for its lifetime.
/// Partitioning only reduces lock contention, it never changes semantics.
pub(crate) struct SenderTable {
    chunks: Box<[RwLock<TableChunk>]>,
    /// Source of "first seen" logical timestamps for new chains.
    seen_seq: AtomicU64,
}

// === impl SenderTable ===

impl SenderTable {
    pub(crate) fn new(num_chunks: usize) -> Self {
        let num_chunks = num_chunks.max(1);
        let chunks = (0..num_chunks).map(|_| RwLock::new(TableChunk::default())).collect();
        Self { chunks, seen_seq: AtomicU64::new(0) }
    }

    fn chunk_for(&self, sender: &[u8]) -> &RwLock<TableChunk> {
        &self.chunks[chunk_index(sender, self.chunks.len())]
    }

    pub(crate) fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// Inserts the transaction into its sender's chain, creating the chain on
    /// first touch. `on_applied` runs while the chunk lock is still held, so
    /// companion updates (the hash index) land in the same critical section.
    ///
    /// Exactly one chain per sender is ever created, even under concurrent
    /// calls: creation happens under the chunk's write lock.
    pub(crate) fn insert_tx(
        &self,
        tx: Arc<Transaction>,
        on_applied: impl FnOnce(&ChainInsertOutcome),
    ) -> ChainInsertOutcome {
        let mut chunk = self.chunk_for(&tx.sender).write();
        let chain = chunk.entry(tx.sender.clone()).or_insert_with(|| {
            let first_seen = self.seen_seq.fetch_add(1, Ordering::Relaxed);
            SenderChain::new(tx.sender.clone(), first_seen)
        });
        let outcome = chain.insert(tx);
        on_applied(&outcome);
        outcome
    }

    /// Removes the transaction with the given hash from its sender's chain.
    ///
    /// Returns whether the transaction was found. A chain left empty by the
    /// removal is dropped from the table, so eviction ordering only ever
    /// refers to live senders.
    pub(crate) fn remove_tx(&self, sender: &[u8], hash: &[u8]) -> bool {
        let mut chunk = self.chunk_for(sender).write();
        let Some(chain) = chunk.get_mut(sender) else { return false };
        let found = chain.remove_by_hash(hash);
        if found && chain.is_empty() {
            chunk.remove(sender);
        }
        found
    }

    /// Removes a sender's chain entirely, returning it if present.
    pub(crate) fn remove_sender(&self, sender: &[u8]) -> Option<SenderChain> {
        self.chunk_for(sender).write().remove(sender)
    }

    /// Removes the `n` highest-nonce transactions from the sender's chain.
    pub(crate) fn trim_chain(&self, sender: &[u8], n: usize) -> Vec<Arc<Transaction>> {
        let mut chunk = self.chunk_for(sender).write();
        let Some(chain) = chunk.get_mut(sender) else { return Vec::new() };
        let evicted = chain.evict_highest_nonces(n);
        if chain.is_empty() {
            chunk.remove(sender);
        }
        evicted
    }

    /// Snapshots all chains of one chunk.
    pub(crate) fn snapshot_chunk(&self, chunk: usize) -> Vec<ChainSnapshot> {
        self.chunks[chunk]
            .read()
            .values()
            .map(|chain| ChainSnapshot { sender: chain.sender().clone(), txs: chain.snapshot() })
            .collect()
    }

    /// Invokes `f` for every sender over a snapshot of the table; the chunk
    /// locks are not held during the callbacks.
    pub(crate) fn for_each_sender(&self, mut f: impl FnMut(&ChainSnapshot)) {
        for chunk in 0..self.chunks.len() {
            for snapshot in self.snapshot_chunk(chunk) {
                f(&snapshot);
            }
        }
    }

    /// All senders, oldest first by their "first seen" timestamp.
    pub(crate) fn senders_by_seen_order(&self) -> Vec<SenderAddress> {
        let mut senders: Vec<(u64, SenderAddress)> = self
            .chunks
            .iter()
            .flat_map(|chunk| {
                chunk
                    .read()
                    .values()
                    .map(|chain| (chain.first_seen(), chain.sender().clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        senders.sort_by_key(|(first_seen, _)| *first_seen);
        senders.into_iter().map(|(_, sender)| sender).collect()
    }

    /// Senders whose chains hold more than `n` transactions.
    pub(crate) fn senders_above_threshold(&self, n: usize) -> Vec<SenderAddress> {
        self.chunks
            .iter()
            .flat_map(|chunk| {
                chunk
                    .read()
                    .values()
                    .filter(|chain| chain.count() > n)
                    .map(|chain| chain.sender().clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Number of live senders.
    pub(crate) fn count_senders(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.read().len()).sum()
    }

    /// Total number of transactions across all chains.
    pub(crate) fn count_txs(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| chunk.read().values().map(SenderChain::count).sum::<usize>())
            .sum()
    }

    /// Drops all chains.
    pub(crate) fn clear(&self) {
        for chunk in self.chunks.iter() {
            chunk.write().clear();
        }
    }
}
