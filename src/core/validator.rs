//! Stateless transaction validation
//!
//! The validator never mutates anything. It reads the confirmed UTXO set and
//! the mempool's provisionally spent outpoints, and either returns the fee the
//! transaction would pay or the first rule it breaks.

use crate::core::{Amount, Transaction};
use crate::error::RejectionReason;
use crate::storage::{Mempool, UTXOSet};
use std::collections::HashSet;

/// Check `tx` against the current ledger state.
///
/// Rules are applied in a fixed order and the first failure wins:
/// 1. no output may be negative
/// 2. no outpoint may appear twice among the inputs
/// 3. every input must exist in the confirmed UTXO set (unconfirmed outputs
///    are not spendable)
/// 4. no input may already be claimed by a pending transaction (first-seen)
/// 5. inputs must cover outputs
///
/// On success the fee (inputs minus outputs, possibly zero) is returned.
/// Owner labels on inputs are not checked against the outputs they spend.
pub fn validate(
    tx: &Transaction,
    utxo_set: &UTXOSet,
    mempool: &Mempool,
) -> Result<Amount, RejectionReason> {
    if let Some(index) = tx
        .get_vout()
        .iter()
        .position(|out| out.get_value().is_negative())
    {
        return Err(RejectionReason::NegativeOutput { index });
    }

    let mut seen = HashSet::with_capacity(tx.get_vin().len());
    for vin in tx.get_vin() {
        if !seen.insert(vin.get_outpoint()) {
            return Err(RejectionReason::DuplicateInput {
                outpoint: vin.get_outpoint().clone(),
            });
        }
    }

    let input_amounts = tx
        .get_vin()
        .iter()
        .map(|vin| {
            utxo_set.amount_of(vin.get_outpoint()).ok_or_else(|| {
                RejectionReason::UnknownOrSpentOutpoint {
                    outpoint: vin.get_outpoint().clone(),
                }
            })
        })
        .collect::<Result<Vec<Amount>, RejectionReason>>()?;

    if let Some(vin) = tx
        .get_vin()
        .iter()
        .find(|vin| mempool.is_spent(vin.get_outpoint()))
    {
        return Err(RejectionReason::ConflictingPendingSpend {
            outpoint: vin.get_outpoint().clone(),
        });
    }

    let input_value = Amount::checked_sum(input_amounts).ok_or(RejectionReason::AmountOverflow)?;

    let output_value = tx
        .get_output_value()
        .ok_or(RejectionReason::AmountOverflow)?;

    if input_value < output_value {
        return Err(RejectionReason::InsufficientFunds {
            inputs: input_value,
            outputs: output_value,
        });
    }

    input_value
        .checked_sub(output_value)
        .ok_or(RejectionReason::AmountOverflow)
}
