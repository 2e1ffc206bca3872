use crate::{Address, Coin, OutPoint, OutputIndex, TransactionId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// The amount and the owner of an unspent transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoEntry {
    amount: Coin,
    owner: Address,
}

impl UtxoEntry {
    pub fn new(amount: Coin, owner: Address) -> Self {
        Self { amount, owner }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }
}

impl Display for UtxoEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.amount, self.owner)
    }
}

/// A set of confirmed and unspent transaction outputs.
/// It's the only owner of the outputs, the mempool refers to them by their `OutPoint`.
#[derive(Debug, Default, Clone)]
pub struct UtxoSet {
    // Unspent transaction outputs, indexed by their transaction ID and their index in the
    // transaction. The ordered map keeps enumeration deterministic.
    utxos: BTreeMap<OutPoint, UtxoEntry>,
}

impl UtxoSet {
    pub fn new() -> Self {
        Self {
            utxos: BTreeMap::new(),
        }
    }

    /// Inserts the output, replacing and returning the entry previously stored under the same
    /// reference.
    /// Callers must not reuse a reference for outputs of two distinct transactions.
    pub fn add(&mut self, outpoint: OutPoint, amount: Coin, owner: Address) -> Option<UtxoEntry> {
        self.utxos.insert(outpoint, UtxoEntry::new(amount, owner))
    }

    /// Removes the output if it exists. Removing a missing output is a no-op.
    pub fn remove(&mut self, outpoint: &OutPoint) -> Option<UtxoEntry> {
        self.utxos.remove(outpoint)
    }

    pub fn exists(&self, outpoint: &OutPoint) -> bool {
        self.utxos.contains_key(outpoint)
    }

    pub fn get(&self, outpoint: &OutPoint) -> Option<&UtxoEntry> {
        self.utxos.get(outpoint)
    }

    pub fn balance_of(&self, owner: &Address) -> Coin {
        self.utxos
            .values()
            .filter(|entry| entry.owner == *owner)
            .fold(Coin::zero(), |balance, entry| balance.saturating_add(entry.amount))
    }

    /// All unspent outputs owned by `owner`, ordered by their reference.
    pub fn outputs_of(&self, owner: &Address) -> Vec<(OutPoint, Coin)> {
        self.utxos
            .iter()
            .filter(|(_, entry)| entry.owner == *owner)
            .map(|(outpoint, entry)| (outpoint.clone(), entry.amount))
            .collect()
    }

    /// Returns true if any output produced by the transaction is unspent.
    pub fn contains_transaction(&self, txid: &TransactionId) -> bool {
        let first = OutPoint::new(txid.clone(), OutputIndex::new(0));
        let last = OutPoint::new(txid.clone(), OutputIndex::new(u32::MAX));
        self.utxos.range(first..=last).next().is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutPoint, &UtxoEntry)> {
        self.utxos.iter()
    }

    /// Sum of all unspent outputs, clamped to the representable range.
    pub fn total(&self) -> Coin {
        self.utxos
            .values()
            .fold(Coin::zero(), |total, entry| total.saturating_add(entry.amount))
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }
}
