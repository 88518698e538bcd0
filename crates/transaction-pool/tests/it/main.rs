//! Transaction pool integration tests.

mod admission;
mod eviction;
mod notifications;
mod sharded;
