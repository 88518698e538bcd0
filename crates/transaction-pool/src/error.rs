//! Transaction pool errors.

/// Transaction pool result type.
pub type PoolResult<T> = Result<T, PoolError>;

/// All errors the transaction pool can throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The requested transaction hash is not present in the cache.
    #[error("transaction not found in cache")]
    TxNotFound,
    /// The hash index and the sender table disagree about the presence of a
    /// transaction.
    ///
    /// This indicates a bug in the mutual-update discipline of the two maps
    /// and is surfaced instead of silently repaired.
    #[error("sync inconsistency between hash index and sender table")]
    MapsSyncInconsistency,
}
