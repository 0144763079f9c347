// This file implements the transaction model - the core of how value moves in my ledger
// I'm following Bitcoin's UTXO (Unspent Transaction Output) model
// Each transaction consumes previous outputs and creates new ones

use crate::core::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

// Labels used by TxIdGenerator to keep user and reward ids in separate namespaces
const USER_TX_KIND: &str = "tx";
const COINBASE_TX_KIND: &str = "coinbase";

/// Owner label of an output. Trusted as supplied; there is no key behind it.
pub type OwnerId = String;

/// Globally unique transaction identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> TxId {
        TxId(id.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self {
        TxId(id.to_string())
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// An outpoint names one specific output: "output #2 of transaction ABC123"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Outpoint {
    txid: TxId,
    vout: usize,
}

impl Outpoint {
    pub fn new(txid: TxId, vout: usize) -> Outpoint {
        Outpoint { txid, vout }
    }

    pub fn get_txid(&self) -> &TxId {
        &self.txid
    }

    pub fn get_vout(&self) -> usize {
        self.vout
    }
}

impl fmt::Display for Outpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

// This represents a transaction input - it references a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXInput {
    outpoint: Outpoint, // The output I want to spend
    owner: OwnerId,     // Who claims to own it (a label, not a signature)
}

impl TXInput {
    pub fn new(outpoint: Outpoint, owner: impl Into<OwnerId>) -> TXInput {
        TXInput {
            outpoint,
            owner: owner.into(),
        }
    }

    pub fn get_outpoint(&self) -> &Outpoint {
        &self.outpoint
    }

    pub fn get_owner(&self) -> &str {
        self.owner.as_str()
    }
}

// This represents a transaction output - it's like a "check" that can be cashed later
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TXOutput {
    value: Amount,  // How much this output is worth
    owner: OwnerId, // Who can spend it later
}

impl TXOutput {
    // Negative values are representable on purpose; the validator rejects them
    pub fn new(value: Amount, owner: impl Into<OwnerId>) -> TXOutput {
        TXOutput {
            value,
            owner: owner.into(),
        }
    }

    pub fn get_value(&self) -> Amount {
        self.value
    }

    pub fn get_owner(&self) -> &str {
        self.owner.as_str()
    }

    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}

// This is the main transaction structure - it represents a transfer of value.
// Once built it is never mutated: a different set of outputs means a new
// transaction with a new id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TxId,            // Assigned once at construction, never recomputed
    vin: Vec<TXInput>,   // List of inputs (what I'm spending)
    vout: Vec<TXOutput>, // List of outputs (where the money is going)
}

impl Transaction {
    pub fn new(id: TxId, vin: Vec<TXInput>, vout: Vec<TXOutput>) -> Transaction {
        Transaction { id, vin, vout }
    }

    // A coinbase has no inputs and a single output paying the miner
    pub fn new_coinbase_tx(id: TxId, miner: impl Into<OwnerId>, reward: Amount) -> Transaction {
        Transaction {
            id,
            vin: vec![],
            vout: vec![TXOutput::new(reward, miner)],
        }
    }

    pub fn is_coinbase(&self) -> bool {
        self.vin.is_empty()
    }

    pub fn get_id(&self) -> &TxId {
        &self.id
    }

    pub fn get_vin(&self) -> &[TXInput] {
        self.vin.as_slice()
    }

    pub fn get_vout(&self) -> &[TXOutput] {
        self.vout.as_slice()
    }

    /// Outpoints created by this transaction once it is confirmed
    pub fn output_outpoints(&self) -> impl Iterator<Item = (Outpoint, &TXOutput)> + '_ {
        self.vout
            .iter()
            .enumerate()
            .map(move |(idx, out)| (Outpoint::new(self.id.clone(), idx), out))
    }

    /// Sum of all output values, `None` if the sum overflows
    pub fn get_output_value(&self) -> Option<Amount> {
        Amount::checked_sum(self.vout.iter().map(TXOutput::get_value))
    }
}

/// Hands out transaction ids from a monotonically increasing counter.
///
/// Ids look like `{namespace}-tx-{seq}` or `{namespace}-coinbase-{seq}`. The
/// sequence is shared by both kinds, so two ids from one generator never
/// collide; distinct namespaces keep separate generators apart.
#[derive(Debug, Clone)]
pub struct TxIdGenerator {
    namespace: String,
    next: u64,
}

impl TxIdGenerator {
    pub fn new(namespace: impl Into<String>) -> TxIdGenerator {
        TxIdGenerator {
            namespace: namespace.into(),
            next: 0,
        }
    }

    pub fn next_tx_id(&mut self) -> TxId {
        self.next_with_kind(USER_TX_KIND)
    }

    pub fn next_coinbase_id(&mut self) -> TxId {
        self.next_with_kind(COINBASE_TX_KIND)
    }

    pub fn issued(&self) -> u64 {
        self.next
    }

    fn next_with_kind(&mut self, kind: &str) -> TxId {
        let seq = self.next;
        self.next += 1;
        TxId(format!("{}-{}-{}", self.namespace, kind, seq))
    }
}
