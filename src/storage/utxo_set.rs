use crate::core::{Amount, Outpoint, TXOutput};
use std::collections::BTreeMap;

/// The authoritative set of spendable outputs.
///
/// Records are keyed by outpoint and kept in a `BTreeMap`, so every listing
/// comes back in outpoint order and is stable between calls. Only the block
/// assembler mutates the set during normal operation; the mempool and the
/// validator read it.
#[derive(Debug, Clone, Default)]
pub struct UTXOSet {
    outputs: BTreeMap<Outpoint, TXOutput>,
}

impl UTXOSet {
    pub fn new() -> UTXOSet {
        UTXOSet::default()
    }

    /// Insert or overwrite the record at `outpoint`.
    ///
    /// Outpoint uniqueness is the caller's job; an existing record is
    /// replaced silently.
    pub fn add(&mut self, outpoint: Outpoint, amount: Amount, owner: &str) {
        self.outputs.insert(outpoint, TXOutput::new(amount, owner));
    }

    /// Remove the record at `outpoint`, returning it if it was present.
    pub fn remove(&mut self, outpoint: &Outpoint) -> Option<TXOutput> {
        self.outputs.remove(outpoint)
    }

    pub fn exists(&self, outpoint: &Outpoint) -> bool {
        self.outputs.contains_key(outpoint)
    }

    pub fn get(&self, outpoint: &Outpoint) -> Option<&TXOutput> {
        self.outputs.get(outpoint)
    }

    pub fn amount_of(&self, outpoint: &Outpoint) -> Option<Amount> {
        self.outputs.get(outpoint).map(TXOutput::get_value)
    }

    /// Sum of everything `owner` can spend; zero if they own nothing.
    /// `None` only if the sum does not fit in an [`Amount`].
    pub fn balance_of(&self, owner: &str) -> Option<Amount> {
        // I walk the whole set here; there is no per-owner index to keep in sync
        Amount::checked_sum(
            self.outputs
                .values()
                .filter(|out| out.is_owned_by(owner))
                .map(TXOutput::get_value),
        )
    }

    /// All spendable outpoints owned by `owner`, in outpoint order.
    pub fn outputs_of(&self, owner: &str) -> Vec<(Outpoint, Amount)> {
        self.outputs
            .iter()
            .filter(|(_, out)| out.is_owned_by(owner))
            .map(|(outpoint, out)| (outpoint.clone(), out.get_value()))
            .collect()
    }

    /// Sum of every record in the set, `None` on overflow.
    pub fn total_supply(&self) -> Option<Amount> {
        // When I want to check conservation across a mine, this is the number
        // that must not move
        Amount::checked_sum(self.outputs.values().map(TXOutput::get_value))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Outpoint, &TXOutput)> {
        self.outputs.iter()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TxId;

    fn outpoint(txid: &str, vout: usize) -> Outpoint {
        Outpoint::new(TxId::from(txid), vout)
    }

    #[test]
    fn test_add_exists_remove() {
        let mut utxo_set = UTXOSet::new();
        let op = outpoint("genesis", 0);
        assert!(!utxo_set.exists(&op));

        utxo_set.add(op.clone(), Amount::from_coins(50), "Alice");
        assert!(utxo_set.exists(&op));
        assert_eq!(utxo_set.amount_of(&op), Some(Amount::from_coins(50)));

        let removed = utxo_set.remove(&op).unwrap();
        assert!(removed.is_owned_by("Alice"));
        assert!(!utxo_set.exists(&op));

        // Removing again is a no-op
        assert!(utxo_set.remove(&op).is_none());
        assert!(utxo_set.is_empty());
    }

    #[test]
    fn test_add_overwrites() {
        let mut utxo_set = UTXOSet::new();
        let op = outpoint("genesis", 0);
        utxo_set.add(op.clone(), Amount::from_coins(50), "Alice");
        utxo_set.add(op.clone(), Amount::from_coins(7), "Bob");

        assert_eq!(utxo_set.len(), 1);
        assert_eq!(utxo_set.balance_of("Alice"), Some(Amount::ZERO));
        assert_eq!(utxo_set.balance_of("Bob"), Some(Amount::from_coins(7)));
    }

    #[test]
    fn test_balance_and_outputs_of_owner() {
        let mut utxo_set = UTXOSet::new();
        utxo_set.add(outpoint("genesis", 0), Amount::from_coins(50), "Alice");
        utxo_set.add(outpoint("genesis", 1), Amount::from_coins(30), "Bob");
        utxo_set.add(outpoint("tx1", 1), "39.999".parse().unwrap(), "Alice");

        assert_eq!(
            utxo_set.balance_of("Alice"),
            Some("89.999".parse().unwrap())
        );
        assert_eq!(utxo_set.balance_of("Nobody"), Some(Amount::ZERO));

        let alice = utxo_set.outputs_of("Alice");
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].0, outpoint("genesis", 0));
        assert_eq!(alice[1].0, outpoint("tx1", 1));
        assert!(utxo_set.outputs_of("Nobody").is_empty());

        assert_eq!(utxo_set.total_supply(), Some("119.999".parse().unwrap()));
    }

    #[test]
    fn test_balance_overflow_is_none() {
        let mut utxo_set = UTXOSet::new();
        utxo_set.add(outpoint("a", 0), Amount::from_sats(i64::MAX), "Alice");
        utxo_set.add(outpoint("a", 1), Amount::from_sats(1), "Alice");
        assert_eq!(utxo_set.balance_of("Alice"), None);
    }
}
