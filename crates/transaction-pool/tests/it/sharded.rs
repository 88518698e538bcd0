//! Routing, search and shard maintenance through the sharded pool.

use shardnode_transaction_pool::{
    test_utils::mk_tx, CacheConfig, EvictionConfig, ShardedTxPool, Transaction,
};
use std::sync::Arc;

fn pool() -> ShardedTxPool {
    ShardedTxPool::new(CacheConfig::default(), EvictionConfig::disabled())
}

#[test]
fn traffic_is_routed_per_cache_id() {
    let pool = pool();
    pool.add_tx(mk_tx("alice", 1), "0");
    pool.add_tx(mk_tx("alice", 2), "0_1");
    pool.add_tx(mk_tx("bob", 1), "1_0");

    assert_eq!(pool.shard_data_store("0").len(), 1);
    assert_eq!(pool.shard_data_store("0_1").len(), 1);
    assert_eq!(pool.shard_data_store("1_0").len(), 1);
    assert_eq!(pool.num_shard_stores(), 3);
}

#[test]
fn untyped_values_only_land_when_they_are_transactions() {
    let pool = pool();
    let tx = mk_tx("alice", 1);

    pool.add_data(&tx.hash.clone(), Arc::clone(&tx) as Arc<dyn std::any::Any + Send + Sync>, "0");
    pool.add_data(b"some-key", Arc::new(42u64), "0");
    pool.add_data(b"other-key", Arc::new(String::from("block body")), "0");

    let cache = pool.shard_data_store("0");
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&tx.hash));
}

#[test]
fn search_first_data_finds_a_transaction_in_any_cache() {
    let pool = pool();
    let tx = mk_tx("alice", 7);
    pool.add_tx(Arc::clone(&tx), "2_0");

    let found: Arc<Transaction> = pool.search_first_data(&tx.hash).unwrap();
    assert_eq!(found.nonce, 7);
    assert!(pool.search_first_data(b"unknown").is_none());
}

#[test]
fn removing_a_set_skips_unknown_hashes() {
    let pool = pool();
    let first = mk_tx("alice", 1);
    let second = mk_tx("alice", 2);
    pool.add_tx(Arc::clone(&first), "0");
    pool.add_tx(Arc::clone(&second), "0");

    pool.remove_set_of_data(
        &[first.hash.clone(), bytes::Bytes::from_static(b"unknown"), second.hash.clone()],
        "0",
    );
    assert!(pool.shard_data_store("0").is_empty());
}

#[test]
fn merging_preserves_every_transaction() {
    let pool = pool();
    for nonce in 0..50 {
        pool.add_tx(mk_tx("alice", nonce), "1");
    }
    for nonce in 0..30 {
        pool.add_tx(mk_tx("bob", nonce), "2");
    }

    pool.merge_shard_stores("1", "2");

    let dest = pool.shard_data_store("2");
    assert_eq!(dest.len(), 80);
    assert!(dest.maps_in_sync());
    for nonce in 0..50 {
        assert!(dest.contains(&mk_tx("alice", nonce).hash));
    }
}

#[test]
fn merging_a_missing_source_is_a_no_op() {
    let pool = pool();
    pool.add_tx(mk_tx("alice", 1), "2");
    pool.merge_shard_stores("missing", "2");
    assert_eq!(pool.shard_data_store("2").len(), 1);
}
