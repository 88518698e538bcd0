//! The ordered pending transactions of a single sender.

use shardnode_primitives::{SenderAddress, Transaction};
use std::sync::Arc;

/// Outcome of inserting a transaction into a sender's chain.
#[derive(Debug)]
pub(crate) enum ChainInsertOutcome {
    /// The transaction occupies a previously free nonce.
    Inserted,
    /// The transaction displaced an incumbent at the same nonce because it
    /// pays a strictly higher gas price.
    Replaced {
        /// The displaced transaction; its hash must be purged from the
        /// hash index by the caller.
        evicted: Arc<Transaction>,
    },
    /// A transaction with the same hash is already present.
    DuplicateHash,
    /// A different transaction occupies the nonce and the newcomer does not
    /// outbid it.
    Underpriced,
}

/// All pending transactions of one sender, sorted by ascending nonce.
///
/// No two entries ever share a nonce. The chain is mutated only while its
/// owning sender-table chunk is locked, so it needs no locking of its own.
#[derive(Debug)]
pub(crate) struct SenderChain {
    sender: SenderAddress,
    /// Logical admission timestamp of the sender (monotonic counter), used
    /// for oldest-first eviction ordering.
    first_seen: u64,
    /// Ascending by nonce.
    txs: Vec<Arc<Transaction>>,
    total_bytes: u64,
    total_gas: u64,
}

// === impl SenderChain ===

impl SenderChain {
    pub(crate) fn new(sender: SenderAddress, first_seen: u64) -> Self {
        Self { sender, first_seen, txs: Vec::new(), total_bytes: 0, total_gas: 0 }
    }

    /// Inserts the transaction preserving nonce order.
    pub(crate) fn insert(&mut self, tx: Arc<Transaction>) -> ChainInsertOutcome {
        match self.txs.binary_search_by_key(&tx.nonce, |entry| entry.nonce) {
            Ok(position) => {
                let incumbent = Arc::clone(&self.txs[position]);
                if incumbent.hash == tx.hash {
                    return ChainInsertOutcome::DuplicateHash
                }
                if tx.gas_price <= incumbent.gas_price {
                    return ChainInsertOutcome::Underpriced
                }
                self.account_removed(incumbent.as_ref());
                self.account_inserted(tx.as_ref());
                let evicted = std::mem::replace(&mut self.txs[position], tx);
                ChainInsertOutcome::Replaced { evicted }
            }
            Err(position) => {
                self.account_inserted(tx.as_ref());
                self.txs.insert(position, tx);
                ChainInsertOutcome::Inserted
            }
        }
    }

    /// Removes the transaction with the given hash; returns whether it was
    /// present.
    pub(crate) fn remove_by_hash(&mut self, hash: &[u8]) -> bool {
        match self.txs.iter().position(|tx| tx.hash == hash) {
            Some(position) => {
                let removed = self.txs.remove(position);
                self.account_removed(removed.as_ref());
                true
            }
            None => false,
        }
    }

    /// Removes and returns the `n` highest-nonce transactions.
    ///
    /// Trimming the trailing segment keeps the surviving prefix gapless, so
    /// selection over the remaining entries stays valid.
    pub(crate) fn evict_highest_nonces(&mut self, n: usize) -> Vec<Arc<Transaction>> {
        let cut = self.txs.len().saturating_sub(n);
        let evicted = self.txs.split_off(cut);
        for tx in &evicted {
            self.account_removed(tx.as_ref());
        }
        evicted
    }

    /// A read-only copy of the chain, ascending by nonce.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Transaction>> {
        self.txs.clone()
    }

    fn account_inserted(&mut self, tx: &Transaction) {
        self.total_bytes += tx.approximate_size();
        self.total_gas += tx.gas();
    }

    fn account_removed(&mut self, tx: &Transaction) {
        self.total_bytes = self.total_bytes.saturating_sub(tx.approximate_size());
        self.total_gas = self.total_gas.saturating_sub(tx.gas());
    }

    pub(crate) fn sender(&self) -> &SenderAddress {
        &self.sender
    }

    pub(crate) fn first_seen(&self) -> u64 {
        self.first_seen
    }

    pub(crate) fn count(&self) -> usize {
        self.txs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub(crate) fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    #[allow(dead_code)]
    pub(crate) fn total_gas(&self) -> u64 {
        self.total_gas
    }
}
