//! Configuration for shard caches and their eviction policy.

/// Default number of independently locked chunks in a cache's internal maps.
pub const DEFAULT_NUM_CHUNKS: u32 = 16;

/// General settings of a single shard cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Name of the cache, used in logs and metric labels.
    pub name: String,
    /// Hint for the number of map chunks.
    ///
    /// Chunking only reduces lock contention; it never changes semantics.
    pub num_chunks: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { name: "txcache".to_owned(), num_chunks: DEFAULT_NUM_CHUNKS }
    }
}

impl CacheConfig {
    /// Creates a config with the given cache name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Sets the chunk hint.
    pub fn with_num_chunks(mut self, num_chunks: u32) -> Self {
        self.num_chunks = num_chunks;
        self
    }
}

/// Settings that drive the eviction policy of a shard cache.
///
/// Eviction is checked at the end of every successful admission and only
/// performs work while the configured count or byte threshold is exceeded.
#[derive(Debug, Clone)]
pub struct EvictionConfig {
    /// Whether eviction runs at all.
    pub enabled: bool,
    /// Number of cached transactions above which eviction starts.
    pub count_threshold: u32,
    /// Number of cached bytes above which eviction starts.
    pub num_bytes_threshold: u64,
    /// How many of the oldest senders lose their whole chain in one
    /// eviction step.
    pub num_senders_to_evict_in_one_step: u32,
    /// Chain length above which a sender counts as heavy and is trimmed
    /// before any whole-sender eviction happens.
    pub large_num_of_txs_for_a_sender: u32,
    /// How many highest-nonce transactions a heavy sender loses per trim.
    pub num_txs_to_evict_from_a_sender: u32,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count_threshold: 300_000,
            num_bytes_threshold: 1024 * 1024 * 1024,
            num_senders_to_evict_in_one_step: 100,
            large_num_of_txs_for_a_sender: 500,
            num_txs_to_evict_from_a_sender: 100,
        }
    }
}

impl EvictionConfig {
    /// Creates a config with eviction switched off; thresholds are ignored.
    pub fn disabled() -> Self {
        Self { enabled: false, ..Default::default() }
    }

    /// Sets the transaction count threshold.
    pub fn with_count_threshold(mut self, count_threshold: u32) -> Self {
        self.count_threshold = count_threshold;
        self
    }

    /// Sets the byte threshold.
    pub fn with_num_bytes_threshold(mut self, num_bytes_threshold: u64) -> Self {
        self.num_bytes_threshold = num_bytes_threshold;
        self
    }

    /// Sets the whole-sender eviction step size.
    pub fn with_num_senders_to_evict_in_one_step(mut self, num_senders: u32) -> Self {
        self.num_senders_to_evict_in_one_step = num_senders;
        self
    }

    /// Sets the heavy sender threshold.
    pub fn with_large_num_of_txs_for_a_sender(mut self, num_txs: u32) -> Self {
        self.large_num_of_txs_for_a_sender = num_txs;
        self
    }

    /// Sets the heavy sender trim size.
    pub fn with_num_txs_to_evict_from_a_sender(mut self, num_txs: u32) -> Self {
        self.num_txs_to_evict_from_a_sender = num_txs;
        self
    }
}
