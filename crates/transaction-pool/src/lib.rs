//! Sharded pending transaction pool.
//!
//! The pool keeps the transactions a node has seen but not yet executed,
//! split into one [`ShardCache`] per shard pairing. Each cache indexes its
//! transactions both by hash and per sender in nonce order, admits and
//! removes them concurrently, evicts the oldest senders under memory
//! pressure and serves nonce-ordered selection snapshots for block proposal.
//!
//! ## Layout
//!
//! The [`ShardedTxPool`] routes untyped storage-layer traffic to the right
//! cache and fans out added-transaction notifications. Consumers that work
//! on a single shard go through [`TxDataStore`]; the storage layer's generic
//! cache interface is served by [`CacherAdapter`].

#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod adapter;
mod config;
mod error;
mod metrics;
mod notify;
mod pool;
mod sharded;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapter::CacherAdapter;
pub use config::{CacheConfig, EvictionConfig, DEFAULT_NUM_CHUNKS};
pub use error::{PoolError, PoolResult};
pub use notify::AddedTxHandler;
pub use pool::{ShardCache, SELECTION_BATCH_PER_SENDER};
pub use sharded::ShardedTxPool;
pub use traits::{Cacher, TxDataStore};

/// Identifier of a shard cache, e.g. `"0"` for intra-shard traffic of shard
/// 0 or `"0_1"` for the pairing of shards 0 and 1.
pub type ShardCacheId = String;

pub use shardnode_primitives::{SenderAddress, Transaction, TxHash, TX_FIELDS_APPROX_SIZE};
