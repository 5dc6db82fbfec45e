//! Artifact cache: idempotency-key derivation and the redis-backed record store.

pub mod key;
pub mod store;
