use bytes::Bytes;

/// Hash of a transaction, as delivered by the network layer.
///
/// Kept as an opaque byte string; the pool never inspects its contents.
pub type TxHash = Bytes;

/// Address of a transaction sender.
pub type SenderAddress = Bytes;

/// Estimated size of the fixed-width transaction fields, in bytes.
///
/// Added on top of the payload length when approximating the in-memory
/// footprint of a pooled transaction.
pub const TX_FIELDS_APPROX_SIZE: u64 = 128;

/// Divisor that converts `gas_limit * gas_price` into micro currency units.
const MICRO_UNIT_DIVISOR: u128 = 1_000_000_000_000;

/// A transaction as seen by the pending pool.
///
/// Transactions are validated upstream; the pool treats them as immutable
/// records and stores them by shared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Unique hash of the transaction.
    pub hash: TxHash,
    /// Address of the sender.
    pub sender: SenderAddress,
    /// Account nonce of the sender this transaction consumes.
    pub nonce: u64,
    /// Call data / payload.
    pub data: Bytes,
    /// Maximum computation units this transaction may consume.
    pub gas_limit: u64,
    /// Price per computation unit.
    pub gas_price: u64,
}

// === impl Transaction ===

impl Transaction {
    /// Returns an approximation of the in-memory footprint of this
    /// transaction: payload length plus a fixed overhead for the
    /// bounded-size fields.
    pub fn approximate_size(&self) -> u64 {
        TX_FIELDS_APPROX_SIZE + self.data.len() as u64
    }

    /// Returns an approximation of the computation units required to
    /// process this transaction.
    pub const fn gas(&self) -> u64 {
        self.gas_limit
    }

    /// Returns an approximation of the processing cost of this transaction,
    /// in micro currency units.
    pub fn fee(&self) -> u64 {
        let fee = self.gas_limit as u128 * self.gas_price as u128 / MICRO_UNIT_DIVISOR;
        fee.try_into().unwrap_or(u64::MAX)
    }
}
