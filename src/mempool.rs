use crate::{
    Coin, MempoolError, OutPoint, Transaction, TransactionId, TransactionValidator, UtxoSet,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The default number of transactions the mempool holds.
pub const DEFAULT_MEMPOOL_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MempoolParams {
    // The maximum number of pending transactions, further transactions are rejected.
    pub max_size: usize,
}

impl Default for MempoolParams {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MEMPOOL_SIZE,
        }
    }
}

/// A pending transaction together with the fee computed when it was admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MempoolEntry {
    transaction: Transaction,
    fee: Coin,
}

impl MempoolEntry {
    pub fn new(transaction: Transaction, fee: Coin) -> Self {
        Self { transaction, fee }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn fee(&self) -> Coin {
        self.fee
    }
}

/// Transactions that are valid but not yet committed to the UTXO set, in admission order.
/// Note that the mempool doesn't own any outputs, it only reserves the outputs that pending
/// transactions spend, so that no other transaction can spend them.
#[derive(Debug, Clone)]
pub struct Mempool {
    entries: Vec<MempoolEntry>,
    // Outputs spent by the entries. An output is reserved iff a pending transaction spends it.
    reserved: HashSet<OutPoint>,
    params: MempoolParams,
}

impl Default for Mempool {
    fn default() -> Self {
        Self::new()
    }
}

impl Mempool {
    pub fn new() -> Self {
        Self::with_params(MempoolParams::default())
    }

    pub fn with_params(params: MempoolParams) -> Self {
        Self {
            entries: vec![],
            reserved: HashSet::new(),
            params,
        }
    }

    pub fn params(&self) -> &MempoolParams {
        &self.params
    }

    /// Validates the transaction and, if it's valid, reserves its inputs and appends it to the
    /// pool. Returns the fee of the admitted transaction.
    /// A rejected transaction leaves the pool unchanged.
    pub fn admit(
        &mut self,
        transaction: Transaction,
        utxo_set: &UtxoSet,
    ) -> Result<Coin, MempoolError> {
        let fee = TransactionValidator::validate(&transaction, utxo_set, self)?;
        if self.get(transaction.id()).is_some() || utxo_set.contains_transaction(transaction.id())
        {
            return Err(MempoolError::DuplicateTransaction(transaction.id().clone()));
        }
        if self.entries.len() >= self.params.max_size {
            return Err(MempoolError::Full {
                capacity: self.params.max_size,
            });
        }

        for outpoint in transaction.outpoints() {
            debug!("Reserving {} for transaction {}", outpoint, transaction.id());
            self.reserved.insert(outpoint);
        }
        info!("Admitted transaction {} with fee {}", transaction.id(), fee);
        self.entries.push(MempoolEntry::new(transaction, fee));
        Ok(fee)
    }

    /// Removes the transaction and releases the outputs it reserved.
    /// Evicting an unknown transaction is a no-op.
    pub fn evict(&mut self, id: &TransactionId) -> Option<MempoolEntry> {
        let position = self
            .entries
            .iter()
            .position(|entry| entry.transaction.id() == id)?;
        let entry = self.entries.remove(position);
        for outpoint in entry.transaction.outpoints() {
            self.reserved.remove(&outpoint);
        }
        debug!("Evicted transaction {}", id);
        Some(entry)
    }

    /// Returns up to `n` entries with the highest fees.
    /// Entries with equal fees keep their admission order.
    pub fn top(&self, n: usize) -> Vec<&MempoolEntry> {
        let mut entries = self.entries.iter().collect::<Vec<&MempoolEntry>>();
        // Stable sort in non-increasing fee order.
        entries.sort_by(|lhs, rhs| rhs.fee.cmp(&lhs.fee));
        entries.truncate(n);
        entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.reserved.clear();
    }

    pub fn is_reserved(&self, outpoint: &OutPoint) -> bool {
        self.reserved.contains(outpoint)
    }

    pub fn reserved_count(&self) -> usize {
        self.reserved.len()
    }

    pub fn get(&self, id: &TransactionId) -> Option<&MempoolEntry> {
        self.entries.iter().find(|entry| entry.transaction.id() == id)
    }

    /// Pending entries in admission order.
    pub fn entries(&self) -> &[MempoolEntry] {
        &self.entries
    }

    pub fn total_fees(&self) -> Coin {
        self.entries.iter().map(MempoolEntry::fee).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
