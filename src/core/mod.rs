//! Core ledger functionality
//!
//! This module contains the fundamental components: exact amounts, the
//! transaction model, the validator and the block assembler.

pub mod amount;
pub mod miner;
pub mod transaction;
pub mod validator;

pub use amount::{Amount, AmountParseError, AMOUNT_DECIMALS, SATOSHIS_PER_COIN};
pub use miner::{BlockAssembler, MinedBlock, DEFAULT_BLOCK_MAX_TXS};
pub use transaction::{Outpoint, OwnerId, TXInput, TXOutput, Transaction, TxId, TxIdGenerator};
pub use validator::validate;
