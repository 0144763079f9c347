use crate::core::{validator, Amount, Outpoint, Transaction, TxId};
use crate::error::RejectionReason;
use crate::storage::UTXOSet;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Default pool capacity, in transactions
pub const DEFAULT_MEMPOOL_CAPACITY: usize = 50;

/// What happened when a transaction was let into the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub fee: Amount,
    /// Resident pushed out to make room, if the pool was full
    pub evicted: Option<Transaction>,
}

/// Pending transactions in arrival order, plus the outpoints they claim.
///
/// `spent` maps every outpoint referenced by a resident to the number of
/// residents referencing it, so an outpoint is marked exactly while at least
/// one resident still spends it. The first-seen rule keeps that count at one.
#[derive(Debug, Clone)]
pub struct Mempool {
    transactions: Vec<Transaction>,
    spent: HashMap<Outpoint, usize>,
    max_size: usize,
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new(DEFAULT_MEMPOOL_CAPACITY)
    }
}

impl Mempool {
    /// A pool holding at most `max_size` transactions (at least one).
    pub fn new(max_size: usize) -> Mempool {
        Mempool {
            transactions: Vec::new(),
            spent: HashMap::new(),
            max_size: max_size.max(1),
        }
    }

    /// Validate `tx` and, if it passes, add it to the pool.
    ///
    /// Returns the fee it pays. A rejected transaction leaves the pool
    /// untouched.
    pub fn submit(&mut self, tx: Transaction, utxo_set: &UTXOSet) -> Result<Amount, RejectionReason> {
        self.admit(tx, utxo_set).map(|admission| admission.fee)
    }

    /// Like [`Mempool::submit`], but also reports the resident evicted to make
    /// room for `tx`.
    ///
    /// When the pool is full the lowest-fee resident is evicted before `tx`
    /// goes in, whatever fee `tx` pays. Among residents sharing the lowest fee
    /// the most recent arrival is the one evicted.
    ///
    /// Validation runs against the pool as it stands, before anything is
    /// evicted. A newcomer that conflicts with the would-be victim is
    /// therefore rejected under the first-seen rule and the victim stays.
    pub fn admit(
        &mut self,
        tx: Transaction,
        utxo_set: &UTXOSet,
    ) -> Result<Admission, RejectionReason> {
        // I validate first so a rejected transaction can never cost a
        // resident its place, even when the pool is full
        let fee = validator::validate(&tx, utxo_set, self)?;
        if self.contains(tx.get_id()) {
            return Err(RejectionReason::DuplicateTransaction {
                tx_id: tx.get_id().clone(),
            });
        }

        let evicted = if self.transactions.len() >= self.max_size {
            self.evict_lowest_fee(utxo_set)
        } else {
            None
        };

        // Every input gets one more claim; evict() gives it back
        for vin in tx.get_vin() {
            *self.spent.entry(vin.get_outpoint().clone()).or_insert(0) += 1;
        }
        self.transactions.push(tx);

        Ok(Admission { fee, evicted })
    }

    /// Remove a resident and release the outpoints only it was claiming.
    pub fn evict(&mut self, tx_id: &TxId) -> Option<Transaction> {
        let idx = self
            .transactions
            .iter()
            .position(|tx| tx.get_id() == tx_id)?;
        let tx = self.transactions.remove(idx);

        // I only drop the marker when the last resident spending it leaves,
        // otherwise another resident would lose its claim
        for vin in tx.get_vin() {
            if let Some(count) = self.spent.get_mut(vin.get_outpoint()) {
                *count -= 1;
                if *count == 0 {
                    self.spent.remove(vin.get_outpoint());
                }
            }
        }
        Some(tx)
    }

    /// Up to `n` residents, highest fee first, ties in arrival order.
    ///
    /// Fees are recomputed against `utxo_set` on every call.
    pub fn top_n_by_fee(&self, n: usize, utxo_set: &UTXOSet) -> Vec<Transaction> {
        self.ranked(utxo_set)
            .into_iter()
            .take(n)
            .map(|(_, tx)| tx.clone())
            .collect()
    }

    /// Fee `tx` would pay against `utxo_set`.
    ///
    /// Inputs missing from the set count as zero, so the result can be
    /// negative for a resident whose inputs vanished. `None` on overflow.
    pub fn fee_of(tx: &Transaction, utxo_set: &UTXOSet) -> Option<Amount> {
        let inputs = Amount::checked_sum(
            tx.get_vin()
                .iter()
                .filter_map(|vin| utxo_set.amount_of(vin.get_outpoint())),
        )?;
        inputs.checked_sub(tx.get_output_value()?)
    }

    pub fn get(&self, tx_id: &TxId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.get_id() == tx_id)
    }

    pub fn contains(&self, tx_id: &TxId) -> bool {
        self.get(tx_id).is_some()
    }

    /// True while some resident spends `outpoint`
    pub fn is_spent(&self, outpoint: &Outpoint) -> bool {
        self.spent.contains_key(outpoint)
    }

    pub fn spent_outpoints(&self) -> impl Iterator<Item = &Outpoint> {
        self.spent.keys()
    }

    /// Residents in arrival order
    pub fn transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn size(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.spent.clear();
    }

    // The ranking is fee-descending, so the victim is whatever sorts last
    fn evict_lowest_fee(&mut self, utxo_set: &UTXOSet) -> Option<Transaction> {
        let victim = self
            .ranked(utxo_set)
            .last()
            .map(|(_, tx)| tx.get_id().clone())?;
        self.evict(&victim)
    }

    // Residents paired with a sort key, sorted fee-descending. `sort_by` is
    // stable, so equal fees keep arrival order. Overflowing fees rank last.
    fn ranked(&self, utxo_set: &UTXOSet) -> Vec<(Option<Amount>, &Transaction)> {
        let mut ranked: Vec<_> = self
            .transactions
            .iter()
            .map(|tx| (Self::fee_of(tx, utxo_set), tx))
            .collect();
        ranked.sort_by(|(a, _), (b, _)| match (a, b) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{TXInput, TXOutput};

    fn genesis(vout: usize) -> Outpoint {
        Outpoint::new(TxId::from("genesis"), vout)
    }

    fn coins(text: &str) -> Amount {
        text.parse().unwrap()
    }

    // genesis:i holds 10 coins for each i in 0..count
    fn utxo_set_with(count: usize) -> UTXOSet {
        let mut utxo_set = UTXOSet::new();
        for i in 0..count {
            utxo_set.add(genesis(i), coins("10"), "Alice");
        }
        utxo_set
    }

    // Spends genesis:vout paying `10 - fee` to Bob
    fn paying_fee(id: &str, vout: usize, fee: &str) -> Transaction {
        let out = coins("10").checked_sub(coins(fee)).unwrap();
        Transaction::new(
            TxId::from(id),
            vec![TXInput::new(genesis(vout), "Alice")],
            vec![TXOutput::new(out, "Bob")],
        )
    }

    fn ids(txs: &[Transaction]) -> Vec<&str> {
        txs.iter().map(|tx| tx.get_id().as_str()).collect()
    }

    #[test]
    fn test_submit_marks_inputs_spent() {
        let utxo_set = utxo_set_with(2);
        let mut mempool = Mempool::new(10);

        let fee = mempool.submit(paying_fee("a", 0, "0.5"), &utxo_set).unwrap();
        assert_eq!(fee, coins("0.5"));
        assert_eq!(mempool.size(), 1);
        assert!(mempool.is_spent(&genesis(0)));
        assert!(!mempool.is_spent(&genesis(1)));
    }

    #[test]
    fn test_conflicting_submit_leaves_pool_unchanged() {
        let utxo_set = utxo_set_with(1);
        let mut mempool = Mempool::new(10);
        mempool.submit(paying_fee("a", 0, "0.5"), &utxo_set).unwrap();

        let err = mempool
            .submit(paying_fee("b", 0, "2"), &utxo_set)
            .unwrap_err();
        assert_eq!(
            err,
            RejectionReason::ConflictingPendingSpend {
                outpoint: genesis(0)
            }
        );
        assert_eq!(ids(mempool.transactions()), vec!["a"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let utxo_set = utxo_set_with(2);
        let mut mempool = Mempool::new(10);
        mempool.submit(paying_fee("a", 0, "1"), &utxo_set).unwrap();

        let err = mempool
            .submit(paying_fee("a", 1, "1"), &utxo_set)
            .unwrap_err();
        assert!(matches!(err, RejectionReason::DuplicateTransaction { .. }));
        assert!(!mempool.is_spent(&genesis(1)));
    }

    #[test]
    fn test_evict_releases_outpoints() {
        let utxo_set = utxo_set_with(2);
        let mut mempool = Mempool::new(10);
        mempool.submit(paying_fee("a", 0, "1"), &utxo_set).unwrap();
        mempool.submit(paying_fee("b", 1, "1"), &utxo_set).unwrap();

        let evicted = mempool.evict(&TxId::from("a")).unwrap();
        assert_eq!(evicted.get_id().as_str(), "a");
        assert!(!mempool.is_spent(&genesis(0)));
        assert!(mempool.is_spent(&genesis(1)));
        assert!(mempool.evict(&TxId::from("a")).is_none());

        // The released outpoint can be claimed again
        mempool.submit(paying_fee("c", 0, "1"), &utxo_set).unwrap();
        assert_eq!(ids(mempool.transactions()), vec!["b", "c"]);
    }

    #[test]
    fn test_top_n_by_fee_orders_descending_with_arrival_tiebreak() {
        let utxo_set = utxo_set_with(4);
        let mut mempool = Mempool::new(10);
        mempool.submit(paying_fee("low", 0, "0.1"), &utxo_set).unwrap();
        mempool.submit(paying_fee("tie1", 1, "1"), &utxo_set).unwrap();
        mempool.submit(paying_fee("high", 2, "2"), &utxo_set).unwrap();
        mempool.submit(paying_fee("tie2", 3, "1"), &utxo_set).unwrap();

        assert_eq!(
            ids(&mempool.top_n_by_fee(10, &utxo_set)),
            vec!["high", "tie1", "tie2", "low"]
        );
        assert_eq!(ids(&mempool.top_n_by_fee(2, &utxo_set)), vec!["high", "tie1"]);
        assert!(mempool.top_n_by_fee(0, &utxo_set).is_empty());
    }

    #[test]
    fn test_full_pool_evicts_lowest_fee() {
        let utxo_set = utxo_set_with(3);
        let mut mempool = Mempool::new(2);
        mempool.submit(paying_fee("mid", 0, "1"), &utxo_set).unwrap();
        mempool.submit(paying_fee("low", 1, "0.1"), &utxo_set).unwrap();

        let admission = mempool.admit(paying_fee("new", 2, "5"), &utxo_set).unwrap();
        assert_eq!(admission.fee, coins("5"));
        assert_eq!(
            admission.evicted.map(|tx| tx.get_id().clone()),
            Some(TxId::from("low"))
        );
        assert_eq!(mempool.size(), 2);
        assert!(!mempool.is_spent(&genesis(1)));
        assert_eq!(ids(mempool.transactions()), vec!["mid", "new"]);
    }

    #[test]
    fn test_full_pool_tie_evicts_latest_arrival() {
        let utxo_set = utxo_set_with(3);
        let mut mempool = Mempool::new(2);
        mempool.submit(paying_fee("first", 0, "1"), &utxo_set).unwrap();
        mempool.submit(paying_fee("second", 1, "1"), &utxo_set).unwrap();

        let admission = mempool.admit(paying_fee("third", 2, "1"), &utxo_set).unwrap();
        assert_eq!(
            admission.evicted.map(|tx| tx.get_id().clone()),
            Some(TxId::from("second"))
        );
        assert_eq!(ids(mempool.transactions()), vec!["first", "third"]);
    }

    #[test]
    fn test_rejected_submit_on_full_pool_evicts_nothing() {
        let utxo_set = utxo_set_with(2);
        let mut mempool = Mempool::new(1);
        mempool.submit(paying_fee("a", 0, "1"), &utxo_set).unwrap();

        let bad = paying_fee("bad", 1, "11");
        assert!(mempool.submit(bad.clone(), &utxo_set).is_err());
        assert!(mempool.submit(bad, &utxo_set).is_err());
        assert_eq!(ids(mempool.transactions()), vec!["a"]);
    }

    #[test]
    fn test_full_pool_keeps_first_seen_victim() {
        let utxo_set = utxo_set_with(1);
        let mut mempool = Mempool::new(1);
        mempool.submit(paying_fee("a", 0, "1"), &utxo_set).unwrap();

        // "b" pays more but spends the same outpoint as the only resident
        let err = mempool
            .admit(paying_fee("b", 0, "5"), &utxo_set)
            .unwrap_err();
        assert_eq!(
            err,
            RejectionReason::ConflictingPendingSpend {
                outpoint: genesis(0)
            }
        );
        assert_eq!(ids(mempool.transactions()), vec!["a"]);
        assert!(mempool.is_spent(&genesis(0)));
    }

    #[test]
    fn test_evict_keeps_outpoint_claimed_by_another_resident() {
        let utxo_set = utxo_set_with(1);
        let mut mempool = Mempool::new(10);
        mempool.submit(paying_fee("a", 0, "1"), &utxo_set).unwrap();

        // submit() never lets two residents share an input, so set it up by hand
        mempool.transactions.push(paying_fee("b", 0, "2"));
        *mempool.spent.get_mut(&genesis(0)).unwrap() += 1;

        mempool.evict(&TxId::from("a")).unwrap();
        assert!(mempool.is_spent(&genesis(0)));
        assert_eq!(mempool.spent[&genesis(0)], 1);

        mempool.evict(&TxId::from("b")).unwrap();
        assert!(!mempool.is_spent(&genesis(0)));
        assert_eq!(mempool.spent_outpoints().count(), 0);
    }

    #[test]
    fn test_fee_of_counts_missing_inputs_as_zero() {
        let mut utxo_set = utxo_set_with(1);
        let tx = paying_fee("a", 0, "1");
        assert_eq!(Mempool::fee_of(&tx, &utxo_set), Some(coins("1")));

        utxo_set.remove(&genesis(0));
        assert_eq!(Mempool::fee_of(&tx, &utxo_set), Some(coins("-9")));
    }

    #[test]
    fn test_clear() {
        let utxo_set = utxo_set_with(1);
        let mut mempool = Mempool::default();
        assert_eq!(mempool.capacity(), DEFAULT_MEMPOOL_CAPACITY);
        mempool.submit(paying_fee("a", 0, "1"), &utxo_set).unwrap();

        mempool.clear();
        assert!(mempool.is_empty());
        assert_eq!(mempool.spent_outpoints().count(), 0);
    }
}
