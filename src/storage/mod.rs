//! In-memory ledger state
//!
//! This module holds the two pieces of mutable state: the confirmed UTXO set
//! and the memory pool of pending transactions. Nothing here outlives the
//! process.

pub mod memory_pool;
pub mod utxo_set;

pub use memory_pool::{Admission, Mempool, DEFAULT_MEMPOOL_CAPACITY};
pub use utxo_set::UTXOSet;
