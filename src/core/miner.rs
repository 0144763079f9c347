// This is the block assembler - it turns pending transactions into confirmed state.
// There's no proof-of-work and no chain of headers here: "mining" means picking
// the best-paying transactions, applying them to the UTXO set in one go and
// paying the collected fees to the miner.

use crate::core::{Amount, Outpoint, Transaction, TxId, TxIdGenerator};
use crate::error::MiningFailure;
use crate::storage::{Mempool, UTXOSet};
use serde::Serialize;
use std::collections::HashSet;

/// Default number of transactions confirmed per block
pub const DEFAULT_BLOCK_MAX_TXS: usize = 3;

/// Result of a successful `mine` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MinedBlock {
    transactions: Vec<Transaction>, // Confirmed, in selection (fee) order
    total_fee: Amount,
    reward_tx: Transaction,
    reward_outpoint: Outpoint,
}

impl MinedBlock {
    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn confirmed_ids(&self) -> Vec<TxId> {
        self.transactions
            .iter()
            .map(|tx| tx.get_id().clone())
            .collect()
    }

    pub fn get_total_fee(&self) -> Amount {
        self.total_fee
    }

    pub fn get_reward_tx(&self) -> &Transaction {
        &self.reward_tx
    }

    pub fn get_reward_outpoint(&self) -> &Outpoint {
        &self.reward_outpoint
    }
}

pub struct BlockAssembler;

impl BlockAssembler {
    /// Confirm up to `max_txs` of the best-paying pending transactions.
    ///
    /// Spent inputs leave `utxo_set`, new outputs enter it at
    /// `(tx_id, index)`, and a coinbase paying the summed fees to `miner` is
    /// added at index 0 of a fresh id. Confirmed transactions leave the pool.
    ///
    /// Everything is checked before anything is written, so on error both
    /// `mempool` and `utxo_set` are exactly as they were.
    pub fn mine(
        miner: &str,
        mempool: &mut Mempool,
        utxo_set: &mut UTXOSet,
        ids: &mut TxIdGenerator,
        max_txs: usize,
    ) -> Result<MinedBlock, MiningFailure> {
        let selected = mempool.top_n_by_fee(max_txs, utxo_set);
        if selected.is_empty() {
            return Err(MiningFailure::EmptyMempool);
        }

        let total_fee = Self::collect_fees(&selected, utxo_set)?;

        for tx in &selected {
            for vin in tx.get_vin() {
                utxo_set.remove(vin.get_outpoint());
            }
            for (outpoint, out) in tx.output_outpoints() {
                utxo_set.add(outpoint, out.get_value(), out.get_owner());
            }
        }

        let reward_tx = Transaction::new_coinbase_tx(ids.next_coinbase_id(), miner, total_fee);
        let reward_outpoint = Outpoint::new(reward_tx.get_id().clone(), 0);
        utxo_set.add(reward_outpoint.clone(), total_fee, miner);

        for tx in &selected {
            mempool.evict(tx.get_id());
        }

        Ok(MinedBlock {
            transactions: selected,
            total_fee,
            reward_tx,
            reward_outpoint,
        })
    }

    // Dry run over the selection: every input must still be spendable and be
    // spent only once in the block, and the fee total must fit in an Amount.
    fn collect_fees(selected: &[Transaction], utxo_set: &UTXOSet) -> Result<Amount, MiningFailure> {
        let mut claimed: HashSet<&Outpoint> = HashSet::new();
        let mut total_fee = Amount::ZERO;

        for tx in selected {
            let mut input_value = Amount::ZERO;
            for vin in tx.get_vin() {
                let outpoint = vin.get_outpoint();
                let amount = utxo_set
                    .amount_of(outpoint)
                    .filter(|_| claimed.insert(outpoint))
                    .ok_or_else(|| MiningFailure::StaleInput {
                        outpoint: outpoint.clone(),
                    })?;
                input_value = input_value
                    .checked_add(amount)
                    .ok_or(MiningFailure::AmountOverflow)?;
            }

            let output_value = tx.get_output_value().ok_or(MiningFailure::AmountOverflow)?;
            let fee = input_value
                .checked_sub(output_value)
                .ok_or(MiningFailure::AmountOverflow)?;
            total_fee = total_fee
                .checked_add(fee)
                .ok_or(MiningFailure::AmountOverflow)?;
        }

        Ok(total_fee)
    }
}
