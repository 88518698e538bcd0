//! Helpers for constructing transactions in tests.

use crate::pool::ShardCache;
use bytes::Bytes;
use shardnode_primitives::Transaction;
use std::sync::Arc;

/// A well-formed transaction with a hash derived from sender and nonce.
pub fn mk_tx(sender: &str, nonce: u64) -> Arc<Transaction> {
    Arc::new(Transaction {
        hash: Bytes::from(format!("hash:{sender}:{nonce}")),
        sender: Bytes::from(sender.to_owned()),
        nonce,
        data: Bytes::new(),
        gas_limit: 50_000,
        gas_price: 200_000_000_000,
    })
}

/// A transaction with an explicit hash and gas price, for same-nonce
/// resubmission scenarios.
pub fn mk_tx_with_gas_price(
    sender: &str,
    nonce: u64,
    hash: &'static str,
    gas_price: u64,
) -> Arc<Transaction> {
    Arc::new(Transaction {
        hash: Bytes::from_static(hash.as_bytes()),
        sender: Bytes::from(sender.to_owned()),
        nonce,
        data: Bytes::new(),
        gas_limit: 50_000,
        gas_price,
    })
}

/// A transaction carrying `data_size` bytes of payload, for byte-threshold
/// scenarios.
pub fn mk_tx_with_data_size(sender: &str, nonce: u64, data_size: usize) -> Arc<Transaction> {
    Arc::new(Transaction {
        hash: Bytes::from(format!("hash:{sender}:{nonce}")),
        sender: Bytes::from(sender.to_owned()),
        nonce,
        data: Bytes::from(vec![0u8; data_size]),
        gas_limit: 50_000,
        gas_price: 200_000_000_000,
    })
}

/// Adds the transaction under its own hash.
pub fn add(cache: &ShardCache, tx: &Arc<Transaction>) -> (bool, bool) {
    cache.add_tx(tx.hash.clone(), Arc::clone(tx))
}

/// Populates the cache with `num_senders * txs_per_sender` transactions,
/// uniformly distributed over the senders.
pub fn add_uniformly(cache: &ShardCache, num_senders: usize, txs_per_sender: u64) {
    for sender_index in 0..num_senders {
        let sender = format!("sender-{sender_index:06}");
        for nonce in 0..txs_per_sender {
            add(cache, &mk_tx(&sender, nonce));
        }
    }
}
