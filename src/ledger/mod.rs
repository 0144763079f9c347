//! Ledger state ownership
//!
//! `Ledger` owns the UTXO set, the mempool and the id generator and is the
//! entry point for callers. `SharedLedger` puts one behind a single lock.

#[allow(clippy::module_inception)]
pub mod ledger;
pub mod shared;

pub use ledger::{default_genesis, Ledger, GENESIS_TX_ID, PAYMENT_FEE};
pub use shared::SharedLedger;
