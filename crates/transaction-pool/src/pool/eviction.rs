//! Memory-pressure eviction for a shard cache.
//!
//! Runs at the end of every successful admission. Two passes: heavy senders
//! lose their highest-nonce transactions first, then whole chains of the
//! oldest senders are dropped until the cache is back under its thresholds.

use crate::pool::ShardCache;
use tracing::debug;

impl ShardCache {
    /// Evicts transactions while the cache exceeds its count or byte
    /// threshold. No-op when eviction is disabled or the cache is within
    /// bounds.
    ///
    /// Takes the gate exclusively, so eviction never interleaves with
    /// admissions or removals.
    pub(crate) fn evict_if_necessary(&self) {
        if !self.eviction_config().enabled || !self.is_capacity_exceeded() {
            return
        }

        let _gate = self.gate.write();
        // the pressure may have cleared while waiting for the gate
        if !self.is_capacity_exceeded() {
            return
        }

        let trimmed = self.evict_from_heavy_senders();
        let (evicted, steps) = self.evict_oldest_senders();

        debug!(
            target: "txpool",
            cache = %self.name,
            trimmed,
            evicted,
            steps,
            tx_count = self.count_tx(),
            num_bytes = self.num_bytes(),
            "eviction pass done"
        );
        self.metrics.evicted_transactions.increment(trimmed + evicted);
    }

    /// Returns whether the cache is over its count or byte threshold.
    pub(crate) fn is_capacity_exceeded(&self) -> bool {
        let config = self.eviction_config();
        self.count_tx() > i64::from(config.count_threshold) ||
            self.num_bytes() > config.num_bytes_threshold
    }

    /// Pass 1: trims the highest-nonce transactions of every sender whose
    /// chain exceeds the configured length. Returns the number of evicted
    /// transactions.
    fn evict_from_heavy_senders(&self) -> u64 {
        let config = self.eviction_config();
        let threshold = config.large_num_of_txs_for_a_sender as usize;
        let trim = config.num_txs_to_evict_from_a_sender as usize;

        let mut num_evicted = 0u64;
        for sender in self.senders.senders_above_threshold(threshold) {
            for tx in self.senders.trim_chain(&sender, trim) {
                self.hash_index.remove(&tx.hash);
                self.apply_deltas(-1, -(tx.approximate_size() as i64));
                num_evicted += 1;
            }
        }
        num_evicted
    }

    /// Pass 2: drops the whole chains of the oldest senders, a fixed number
    /// of senders per step, until the cache is back under its thresholds.
    /// Returns the number of evicted transactions and the number of steps.
    fn evict_oldest_senders(&self) -> (u64, u64) {
        let step_size = self.eviction_config().num_senders_to_evict_in_one_step.max(1) as usize;

        let mut num_evicted = 0u64;
        let mut steps = 0u64;
        let mut oldest_first = self.senders.senders_by_seen_order().into_iter();
        while self.is_capacity_exceeded() {
            let step: Vec<_> = oldest_first.by_ref().take(step_size).collect();
            if step.is_empty() {
                break
            }
            steps += 1;
            for sender in step {
                let Some(chain) = self.senders.remove_sender(&sender) else { continue };
                for tx in chain.snapshot() {
                    self.hash_index.remove(&tx.hash);
                    self.apply_deltas(-1, -(tx.approximate_size() as i64));
                    num_evicted += 1;
                }
            }
        }
        (num_evicted, steps)
    }
}
