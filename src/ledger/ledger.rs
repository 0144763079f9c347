// This is the ledger facade - one owner for all mutable state.
// The caller creates a Ledger at startup and threads it through every call;
// submit, evict and mine are the only operations that change anything.

use crate::config::Config;
use crate::core::{
    Amount, BlockAssembler, MinedBlock, Outpoint, TXInput, TXOutput, Transaction, TxId,
    TxIdGenerator,
};
use crate::error::{LedgerError, Result};
use crate::storage::{Mempool, UTXOSet};
use log::{debug, info, warn};

/// Transaction id shared by all genesis outputs
pub const GENESIS_TX_ID: &str = "genesis";

/// Flat fee `build_payment` leaves for the miner (0.001 BTC)
pub const PAYMENT_FEE: Amount = Amount::from_sats(100_000);

/// The starting allocation used by the demo and the scenario tests
pub fn default_genesis() -> Vec<(&'static str, Amount)> {
    vec![
        ("Alice", Amount::from_coins(50)),
        ("Bob", Amount::from_coins(30)),
        ("Charlie", Amount::from_coins(20)),
        ("David", Amount::from_coins(10)),
        ("Eve", Amount::from_coins(5)),
    ]
}

pub struct Ledger {
    utxo_set: UTXOSet,
    mempool: Mempool,
    ids: TxIdGenerator,
    config: Config,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Ledger {
    pub fn new(config: Config) -> Ledger {
        Ledger {
            utxo_set: UTXOSet::new(),
            mempool: Mempool::new(config.mempool_capacity),
            ids: TxIdGenerator::new(config.id_namespace.clone()),
            config,
        }
    }

    /// Create `genesis:i` for each allocation, in order, and return the outpoints
    pub fn seed_genesis(&mut self, allocations: &[(&str, Amount)]) -> Vec<Outpoint> {
        let mut outpoints = Vec::with_capacity(allocations.len());
        for (idx, (owner, amount)) in allocations.iter().enumerate() {
            let outpoint = Outpoint::new(TxId::from(GENESIS_TX_ID), idx);
            self.utxo_set.add(outpoint.clone(), *amount, owner);
            outpoints.push(outpoint);
        }
        info!(
            "Seeded {} genesis outputs ({} total)",
            outpoints.len(),
            self.total_supply().unwrap_or(Amount::ZERO)
        );
        outpoints
    }

    /// Build a transaction with the next id from this ledger's generator
    pub fn new_transaction(&mut self, vin: Vec<TXInput>, vout: Vec<TXOutput>) -> Transaction {
        Transaction::new(self.ids.next_tx_id(), vin, vout)
    }

    /// Build a payment of `amount` from `sender` to `recipient`.
    ///
    /// I take the sender's first spendable output (in outpoint order) as the
    /// only input, pay `amount` to the recipient and send the rest back to the
    /// sender minus [`PAYMENT_FEE`]. The change output is always present, even
    /// when it is zero. Nothing is submitted; hand the result to `submit`.
    pub fn build_payment(
        &mut self,
        sender: &str,
        recipient: &str,
        amount: Amount,
    ) -> Result<Transaction> {
        if amount.is_negative() || amount.is_zero() {
            return Err(LedgerError::Payment(format!("invalid amount {amount}")));
        }

        // When the sender owns nothing there is no output to pick
        let (outpoint, value) = self
            .utxo_set
            .outputs_of(sender)
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::Payment(format!("{sender} has no available BTC")))?;

        let needed = amount
            .checked_add(PAYMENT_FEE)
            .ok_or_else(|| LedgerError::Overflow(format!("{amount} plus fee")))?;
        let change = match value.checked_sub(needed) {
            Some(change) if !change.is_negative() => change,
            _ => {
                return Err(LedgerError::Payment(format!(
                    "selected UTXO {outpoint} ({value} BTC) is too small for amount + fee"
                )))
            }
        };

        Ok(self.new_transaction(
            vec![TXInput::new(outpoint, sender)],
            vec![
                TXOutput::new(amount, recipient),
                TXOutput::new(change, sender),
            ],
        ))
    }

    /// Validate `tx` and queue it; returns the fee it pays
    pub fn submit(&mut self, tx: Transaction) -> Result<Amount> {
        let tx_id = tx.get_id().clone();
        match self.mempool.admit(tx, &self.utxo_set) {
            Ok(admission) => {
                if let Some(evicted) = &admission.evicted {
                    warn!(
                        "Mempool full ({}), evicted lowest-fee transaction {}",
                        self.mempool.capacity(),
                        evicted.get_id()
                    );
                }
                info!("Added {tx_id} to mempool. Fee: {}", admission.fee);
                Ok(admission.fee)
            }
            Err(reason) => {
                debug!("Rejected {tx_id}: {reason}");
                Err(reason.into())
            }
        }
    }

    pub fn evict(&mut self, tx_id: &TxId) -> Option<Transaction> {
        // Eviction by id is the caller's escape hatch; the pool's own
        // capacity eviction is logged from submit()
        let evicted = self.mempool.evict(tx_id);
        if evicted.is_some() {
            info!("Evicted {tx_id} from mempool");
        }
        evicted
    }

    pub fn mine(&mut self, miner: &str, max_txs: usize) -> Result<MinedBlock> {
        let block = BlockAssembler::mine(
            miner,
            &mut self.mempool,
            &mut self.utxo_set,
            &mut self.ids,
            max_txs,
        )?;
        info!(
            "Block mined with {} transactions! Miner {} reward: {}",
            block.get_transactions().len(),
            miner,
            block.get_total_fee()
        );
        Ok(block)
    }

    // I log after the assembler returns, so a failed mine logs nothing here
    // and the caller decides what to do with the MiningFailure

    /// Mine with the configured miner label and block size
    pub fn mine_default(&mut self) -> Result<MinedBlock> {
        let miner = self.config.miner.clone();
        self.mine(&miner, self.config.block_max_txs)
    }

    pub fn balance_of(&self, owner: &str) -> Option<Amount> {
        self.utxo_set.balance_of(owner)
    }

    pub fn outputs_of(&self, owner: &str) -> Vec<(Outpoint, Amount)> {
        self.utxo_set.outputs_of(owner)
    }

    pub fn exists(&self, outpoint: &Outpoint) -> bool {
        self.utxo_set.exists(outpoint)
    }

    pub fn pending(&self) -> &[Transaction] {
        self.mempool.transactions()
    }

    pub fn top_by_fee(&self, n: usize) -> Vec<Transaction> {
        self.mempool.top_n_by_fee(n, &self.utxo_set)
    }

    pub fn total_supply(&self) -> Option<Amount> {
        self.utxo_set.total_supply()
    }

    pub fn utxo_set(&self) -> &UTXOSet {
        &self.utxo_set
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
