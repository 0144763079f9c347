//! # UTXO Ledger - The Settlement Core of My Blockchain
//!
//! This is the part of a blockchain node that decides what money exists and
//! who can spend it. When I come back to this code, here's what I need to remember:
//!
//! ## What I Built
//! - **Exact amounts**: satoshi-precision integers, no floating point anywhere
//! - **UTXO set**: the confirmed, spendable outputs keyed by outpoint
//! - **Validator**: five ordered rules, first failure wins
//! - **Mempool**: bounded pool with first-seen conflict tracking and fee eviction
//! - **Block assembler**: atomically confirms the best-paying transactions and
//!   pays their fees to the miner
//!
//! ## How I Organized My Code
//! - `core/`: amounts, transactions, validation, block assembly
//! - `storage/`: the UTXO set and the memory pool
//! - `ledger/`: the single owner of all state, plus a lock-guarded handle
//! - `config/`: settings from defaults, TOML and environment
//! - `error/`: typed rejections and the crate error
//! - `cli/`: the demo binary's commands and scenarios
//!
//! ## Key Design Decisions I Made
//! - No globals: the caller creates a `Ledger` and passes it around
//! - Unconfirmed outputs can't be spent; a transaction has to be mined first
//! - First-seen wins: no replace-by-fee
//! - The core returns typed results and never logs; `Ledger` does the logging

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod ledger;
pub mod storage;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    Amount, BlockAssembler, MinedBlock, Outpoint, OwnerId, TXInput, TXOutput, Transaction, TxId,
    TxIdGenerator,
};
pub use error::{LedgerError, MiningFailure, RejectionReason, Result};
pub use ledger::{default_genesis, Ledger, SharedLedger, GENESIS_TX_ID, PAYMENT_FEE};
pub use storage::{Mempool, UTXOSet};
