//! Transaction selection for block proposal.
//!
//! Selection works on a point-in-time snapshot of the sender table, taken
//! chunk by chunk in parallel, and merges the per-sender chains round-robin
//! so no single sender can monopolize a proposal.

use crate::pool::{sender_table::ChainSnapshot, ShardCache};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use shardnode_primitives::{Transaction, TxHash};
use std::sync::Arc;

/// How many transactions one sender contributes per round-robin round.
pub const SELECTION_BATCH_PER_SENDER: usize = 100;

impl ShardCache {
    /// Selects up to `max_count` transactions for inclusion in a block.
    ///
    /// Per sender the transactions come out in ascending nonce order;
    /// across senders they are interleaved in batches of
    /// [`SELECTION_BATCH_PER_SENDER`]. The snapshot is taken with
    /// `degree_of_parallelism` worker threads working on disjoint chunk
    /// groups. Returns the transactions and their hashes, index-aligned.
    pub fn select_transactions(
        &self,
        max_count: usize,
        degree_of_parallelism: usize,
    ) -> (Vec<Arc<Transaction>>, Vec<TxHash>) {
        if max_count == 0 || self.is_empty() {
            return (Vec::new(), Vec::new())
        }

        let snapshots = self.snapshot_senders(degree_of_parallelism);
        let selected = merge_round_robin(&snapshots, max_count);
        let hashes = selected.iter().map(|tx| tx.hash.clone()).collect();
        (selected, hashes)
    }

    /// Snapshots all sender chains, splitting the chunks over
    /// `degree_of_parallelism` parallel jobs.
    fn snapshot_senders(&self, degree_of_parallelism: usize) -> Vec<ChainSnapshot> {
        let _gate = self.gate.read();

        let num_chunks = self.senders.num_chunks();
        let degree = degree_of_parallelism.clamp(1, num_chunks);
        let groups: Vec<Vec<usize>> = (0..degree)
            .map(|group| (group..num_chunks).step_by(degree).collect())
            .collect();

        groups
            .into_par_iter()
            .flat_map_iter(|group| {
                group.into_iter().flat_map(|chunk| self.senders.snapshot_chunk(chunk))
            })
            .collect()
    }
}

/// Interleaves the chains round-robin, [`SELECTION_BATCH_PER_SENDER`]
/// transactions per sender per round, until `max_count` transactions are
/// selected or the chains run dry.
fn merge_round_robin(snapshots: &[ChainSnapshot], max_count: usize) -> Vec<Arc<Transaction>> {
    let total: usize = snapshots.iter().map(|chain| chain.txs.len()).sum();
    let mut selected = Vec::with_capacity(max_count.min(total));
    let mut cursors = vec![0usize; snapshots.len()];

    'rounds: loop {
        let mut progressed = false;
        for (chain, cursor) in snapshots.iter().zip(cursors.iter_mut()) {
            let batch_end = (*cursor + SELECTION_BATCH_PER_SENDER).min(chain.txs.len());
            for tx in &chain.txs[*cursor..batch_end] {
                selected.push(Arc::clone(tx));
                if selected.len() == max_count {
                    break 'rounds
                }
            }
            if batch_end > *cursor {
                progressed = true;
                *cursor = batch_end;
            }
        }
        if !progressed {
            break
        }
    }
    selected
}
