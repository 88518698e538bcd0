//! Eviction behavior under sustained load.

use shardnode_transaction_pool::{
    test_utils::{add, add_uniformly, mk_tx},
    CacheConfig, EvictionConfig, ShardCache,
};

#[test]
fn sustained_uniform_load_stays_bounded() {
    let eviction = EvictionConfig::default()
        .with_count_threshold(1000)
        .with_num_senders_to_evict_in_one_step(10);
    let cache = ShardCache::new(CacheConfig::default(), eviction);

    add_uniformly(&cache, 500, 4);

    assert!(cache.count_tx() <= 1000);
    assert!(cache.count_tx() > 0);
    assert!(cache.maps_in_sync());
    assert_eq!(cache.count_tx() as usize, cache.len());
}

#[test]
fn eviction_prefers_dropping_older_senders() {
    let eviction = EvictionConfig::default()
        .with_count_threshold(50)
        .with_num_senders_to_evict_in_one_step(5);
    let cache = ShardCache::new(CacheConfig::default(), eviction);

    for sender_index in 0..60 {
        add(&cache, &mk_tx(&format!("sender-{sender_index:03}"), 0));
    }

    // the earliest senders were evicted, the latest survived
    assert!(cache.get_by_tx_hash(&mk_tx("sender-000", 0).hash).is_none());
    assert!(cache.get_by_tx_hash(&mk_tx("sender-059", 0).hash).is_some());
}

#[test]
fn selection_still_works_after_eviction() {
    let eviction = EvictionConfig::default()
        .with_count_threshold(200)
        .with_num_senders_to_evict_in_one_step(10);
    let cache = ShardCache::new(CacheConfig::default(), eviction);

    add_uniformly(&cache, 100, 4);

    let (selected, hashes) = cache.select_transactions(100, 4);
    assert_eq!(selected.len(), 100);
    assert_eq!(hashes.len(), 100);
    for tx in &selected {
        assert!(cache.get_by_tx_hash(&tx.hash).is_some());
    }
}
