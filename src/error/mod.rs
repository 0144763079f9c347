//! Error handling for the ledger
//!
//! Validation rejections and mining failures are ordinary, recoverable
//! results handed back to the caller. `LedgerError` wraps them together with
//! the ambient failures (configuration, I/O, lock poisoning) of the outer layers.

use crate::core::Outpoint;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Why a transaction was refused by the validator or the mempool.
///
/// A rejected transaction never mutates any state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("output {index} has a negative amount")]
    NegativeOutput { index: usize },
    #[error("input {outpoint} is referenced more than once")]
    DuplicateInput { outpoint: Outpoint },
    #[error("UTXO {outpoint} does not exist or is already spent")]
    UnknownOrSpentOutpoint { outpoint: Outpoint },
    #[error("UTXO {outpoint} is already being spent in the mempool")]
    ConflictingPendingSpend { outpoint: Outpoint },
    #[error("insufficient funds: inputs ({inputs}) < outputs ({outputs})")]
    InsufficientFunds {
        inputs: crate::core::Amount,
        outputs: crate::core::Amount,
    },
    #[error("amount arithmetic overflowed")]
    AmountOverflow,
    #[error("transaction {tx_id} is already in the mempool")]
    DuplicateTransaction { tx_id: crate::core::TxId },
}

/// Why a block could not be assembled.
///
/// Only `EmptyMempool` is expected in normal operation; the other variants
/// mean the single-writer contract was broken and are detected before any
/// state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningFailure {
    #[error("mempool is empty, nothing to mine")]
    EmptyMempool,
    #[error("selected input {outpoint} is no longer spendable")]
    StaleInput { outpoint: Outpoint },
    #[error("fee total overflowed while assembling the block")]
    AmountOverflow,
}

/// Crate-level error type
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction rejected: {0}")]
    Rejected(#[from] RejectionReason),
    #[error("Mining error: {0}")]
    Mining(#[from] MiningFailure),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Ledger lock poisoned: {0}")]
    Lock(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Amount overflow: {0}")]
    Overflow(String),
    #[error("Payment error: {0}")]
    Payment(String),
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<crate::core::AmountParseError> for LedgerError {
    fn from(err: crate::core::AmountParseError) -> Self {
        LedgerError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Amount, TxId};

    #[test]
    fn test_rejection_messages() {
        let outpoint = Outpoint::new(TxId::from("genesis"), 0);
        let err = RejectionReason::ConflictingPendingSpend { outpoint };
        assert_eq!(
            err.to_string(),
            "UTXO genesis:0 is already being spent in the mempool"
        );

        let err = RejectionReason::InsufficientFunds {
            inputs: Amount::from_coins(30),
            outputs: Amount::from_coins(35),
        };
        assert!(err.to_string().contains("30.00000000"));
    }

    #[test]
    fn test_ledger_error_from_rejection() {
        let err: LedgerError = RejectionReason::AmountOverflow.into();
        assert!(matches!(err, LedgerError::Rejected(RejectionReason::AmountOverflow)));
        assert_eq!(
            err.to_string(),
            "Transaction rejected: amount arithmetic overflowed"
        );

        let err: LedgerError = MiningFailure::EmptyMempool.into();
        assert_eq!(err.to_string(), "Mining error: mempool is empty, nothing to mine");
    }
}
