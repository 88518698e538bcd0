//! Added-transaction notification fan-out through the sharded pool.

use shardnode_transaction_pool::{
    test_utils::mk_tx, CacheConfig, EvictionConfig, ShardedTxPool, TxHash,
};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
    time::Duration,
};

async fn wait_for(seen: &Mutex<HashSet<TxHash>>, expected: usize) {
    for _ in 0..200 {
        if seen.lock().unwrap().len() == expected {
            return
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn handlers_fire_once_per_added_transaction() {
    let pool = ShardedTxPool::new(CacheConfig::default(), EvictionConfig::disabled());
    let seen = Arc::new(Mutex::new(HashSet::new()));

    let sink = Arc::clone(&seen);
    pool.register_handler(Arc::new(move |hash: &TxHash| {
        // a duplicate notification would leave the set short
        assert!(sink.lock().unwrap().insert(hash.clone()));
    }));

    for nonce in 0..20 {
        let tx = mk_tx("alice", nonce);
        pool.add_tx(Arc::clone(&tx), "0");
        // duplicates are not added, so they must not notify
        pool.add_tx(tx, "0");
    }

    wait_for(&seen, 20).await;
    assert_eq!(seen.lock().unwrap().len(), 20);
}

#[tokio::test(flavor = "multi_thread")]
async fn all_registered_handlers_are_invoked() {
    let pool = ShardedTxPool::new(CacheConfig::default(), EvictionConfig::disabled());
    let first = Arc::new(Mutex::new(HashSet::new()));
    let second = Arc::new(Mutex::new(HashSet::new()));

    for sink in [&first, &second] {
        let sink = Arc::clone(sink);
        pool.register_handler(Arc::new(move |hash: &TxHash| {
            sink.lock().unwrap().insert(hash.clone());
        }));
    }

    pool.add_tx(mk_tx("alice", 1), "0");

    wait_for(&first, 1).await;
    wait_for(&second, 1).await;
    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap().len(), 1);
}
