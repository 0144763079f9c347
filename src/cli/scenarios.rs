//! Reference scenarios run by the `demo` command
//!
//! Each step builds a transaction against the default genesis allocation,
//! submits it and records what the ledger said. The last step mines.

use crate::core::{Amount, Outpoint, TXInput, TXOutput, TxId};
use crate::error::{LedgerError, Result};
use crate::ledger::{Ledger, GENESIS_TX_ID};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: &'static str,
    pub accepted: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub outcomes: Vec<ScenarioOutcome>,
    pub balances: Vec<(String, Amount)>,
}

fn genesis(vout: usize) -> Outpoint {
    Outpoint::new(TxId::from(GENESIS_TX_ID), vout)
}

fn coins(text: &str) -> Result<Amount> {
    Ok(text.parse::<Amount>()?)
}

fn record(name: &'static str, result: Result<Amount>) -> ScenarioOutcome {
    match result {
        Ok(fee) => ScenarioOutcome {
            name,
            accepted: true,
            detail: format!("fee {fee}"),
        },
        Err(e) => ScenarioOutcome {
            name,
            accepted: false,
            detail: e.to_string(),
        },
    }
}

/// Run every scenario against `ledger`, which must hold the default genesis.
pub fn run_demo(ledger: &mut Ledger, miner: &str) -> Result<DemoReport> {
    let mut outcomes = Vec::new();

    let tx1 = ledger.new_transaction(
        vec![TXInput::new(genesis(0), "Alice")],
        vec![
            TXOutput::new(coins("10")?, "Bob"),
            TXOutput::new(coins("39.999")?, "Alice"),
        ],
    );
    let tx1_id = tx1.get_id().clone();
    outcomes.push(record("basic transfer", ledger.submit(tx1)));

    let tx2 = ledger.new_transaction(
        vec![
            TXInput::new(genesis(3), "David"),
            TXInput::new(genesis(4), "Eve"),
        ],
        vec![
            TXOutput::new(coins("14.99")?, "Bob"),
            TXOutput::new(Amount::ZERO, "David"),
        ],
    );
    outcomes.push(record("multiple inputs", ledger.submit(tx2)));

    let tx3 = ledger.new_transaction(
        vec![TXInput::new(genesis(1), "Bob"), TXInput::new(genesis(1), "Bob")],
        vec![TXOutput::new(coins("10")?, "Eve")],
    );
    outcomes.push(record("duplicate input", ledger.submit(tx3)));

    let tx4 = ledger.new_transaction(
        vec![TXInput::new(genesis(0), "Alice")],
        vec![TXOutput::new(coins("5")?, "Charlie")],
    );
    outcomes.push(record("mempool double-spend", ledger.submit(tx4)));

    let tx5 = ledger.new_transaction(
        vec![TXInput::new(genesis(1), "Bob")],
        vec![TXOutput::new(coins("35")?, "Alice")],
    );
    outcomes.push(record("insufficient funds", ledger.submit(tx5)));

    let tx6 = ledger.new_transaction(
        vec![TXInput::new(genesis(2), "Charlie")],
        vec![TXOutput::new(coins("-5")?, "Alice")],
    );
    outcomes.push(record("negative amount", ledger.submit(tx6)));

    let tx7 = ledger.new_transaction(
        vec![TXInput::new(genesis(1), "Bob")],
        vec![TXOutput::new(coins("30")?, "Charlie")],
    );
    outcomes.push(record("zero fee", ledger.submit(tx7)));

    let tx8 = ledger.new_transaction(
        vec![TXInput::new(genesis(1), "Bob")],
        vec![TXOutput::new(coins("29")?, "Eve")],
    );
    outcomes.push(record("race attack", ledger.submit(tx8)));

    let tx9 = ledger.new_transaction(
        vec![TXInput::new(Outpoint::new(tx1_id, 0), "Bob")],
        vec![TXOutput::new(coins("9.9")?, "Charlie")],
    );
    outcomes.push(record("unconfirmed chain", ledger.submit(tx9)));

    let max_txs = ledger.config().block_max_txs;
    outcomes.push(record(
        "mining",
        ledger
            .mine(miner, max_txs)
            .map(|block| block.get_total_fee()),
    ));

    let mut balances = Vec::new();
    for owner in ["Alice", "Bob", "Charlie", "David", "Eve", miner] {
        let balance = ledger
            .balance_of(owner)
            .ok_or_else(|| LedgerError::Overflow(format!("balance of {owner}")))?;
        balances.push((owner.to_string(), balance));
    }

    Ok(DemoReport { outcomes, balances })
}
