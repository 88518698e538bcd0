//! Primitive types shared by the shardnode data pools.

mod transaction;

pub use transaction::{SenderAddress, Transaction, TxHash, TX_FIELDS_APPROX_SIZE};
