//! Admission and removal behavior of a single shard cache.

use proptest::prelude::*;
use shardnode_transaction_pool::{
    test_utils::{add, mk_tx},
    CacheConfig, EvictionConfig, PoolError, ShardCache,
};
use std::sync::Arc;

fn cache() -> ShardCache {
    ShardCache::new(CacheConfig::default(), EvictionConfig::disabled())
}

#[test]
fn admission_is_idempotent() {
    let cache = cache();
    let tx = mk_tx("alice", 1);

    assert_eq!(add(&cache, &tx), (true, true));
    for _ in 0..5 {
        assert_eq!(add(&cache, &tx), (true, false));
    }
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.count_tx(), 1);
}

#[test]
fn counters_track_a_mixed_workload() {
    let cache = cache();
    for sender_index in 0..10 {
        let sender = format!("sender-{sender_index}");
        for nonce in 0..20 {
            add(&cache, &mk_tx(&sender, nonce));
        }
    }
    assert_eq!(cache.len(), 200);
    assert_eq!(cache.count_senders(), 10);

    // remove one full sender and spot-check the rest
    for nonce in 0..20 {
        assert_eq!(cache.remove_tx_by_hash(&mk_tx("sender-0", nonce).hash), Ok(()));
    }
    assert_eq!(cache.len(), 180);
    assert_eq!(cache.count_senders(), 9);
    assert!(cache.maps_in_sync());
}

#[test]
fn removing_an_unknown_hash_reports_not_found() {
    let cache = cache();
    add(&cache, &mk_tx("alice", 1));
    assert_eq!(cache.remove_tx_by_hash(b"unknown"), Err(PoolError::TxNotFound));
    assert_eq!(cache.len(), 1);
}

#[test]
fn concurrent_duplicate_adds_insert_once() {
    let cache = Arc::new(cache());
    let tx = mk_tx("alice", 1);

    let added_total: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let tx = Arc::clone(&tx);
                scope.spawn(move || {
                    let mut added = 0;
                    for _ in 0..100 {
                        if add(&cache, &tx).1 {
                            added += 1;
                        }
                    }
                    added
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).sum()
    });

    assert_eq!(added_total, 1);
    assert_eq!(cache.len(), 1);
}

proptest! {
    /// Random interleavings of adds and removes must keep the hash index,
    /// the sender table and the counters in agreement.
    #[test]
    fn maps_stay_in_sync_under_random_workloads(
        ops in prop::collection::vec((0u8..2, 0usize..8, 0u64..16), 1..200)
    ) {
        let cache = cache();
        for (op, sender_index, nonce) in ops {
            let tx = mk_tx(&format!("sender-{sender_index}"), nonce);
            match op {
                0 => {
                    add(&cache, &tx);
                }
                _ => {
                    cache.remove(&tx.hash);
                }
            }
            prop_assert!(cache.maps_in_sync());
            prop_assert_eq!(cache.count_tx() as usize, cache.len());
        }
    }
}
