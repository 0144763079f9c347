use crate::core::{Amount, MinedBlock, Outpoint, Transaction, TxId};
use crate::error::{LedgerError, Result};
use crate::ledger::Ledger;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [`Ledger`] behind one lock, for callers that share it between threads.
///
/// Every method takes the lock once for the whole logical operation, so a
/// reader never sees a block half applied.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> SharedLedger {
        SharedLedger {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, Ledger>> {
        self.inner
            .read()
            .map_err(|e| LedgerError::Lock(format!("Failed to acquire read lock on ledger: {e}")))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, Ledger>> {
        self.inner
            .write()
            .map_err(|e| LedgerError::Lock(format!("Failed to acquire write lock on ledger: {e}")))
    }

    pub fn submit(&self, tx: Transaction) -> Result<Amount> {
        self.write()?.submit(tx)
    }

    pub fn evict(&self, tx_id: &TxId) -> Result<Option<Transaction>> {
        Ok(self.write()?.evict(tx_id))
    }

    pub fn mine(&self, miner: &str, max_txs: usize) -> Result<MinedBlock> {
        self.write()?.mine(miner, max_txs)
    }

    pub fn balance_of(&self, owner: &str) -> Result<Option<Amount>> {
        Ok(self.read()?.balance_of(owner))
    }

    pub fn exists(&self, outpoint: &Outpoint) -> Result<bool> {
        Ok(self.read()?.exists(outpoint))
    }

    pub fn pending(&self) -> Result<Vec<Transaction>> {
        Ok(self.read()?.pending().to_vec())
    }
}
