use crate::genesis::default_allocation;
use crate::{
    Address, Block, Blockchain, Coin, CoinbasePolicy, Mempool, MempoolEntry, MempoolError,
    MempoolParams, Miner, OutPoint, OutputIndex, ProposalError, Transaction, TransactionId,
    TransactionInput, TransactionOutput, UtxoEntry, UtxoSet, DEFAULT_BATCH_SIZE,
};
use chrono::Utc;
use log::{debug, info};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Fee that `propose_transaction` leaves for the miner: 0.001.
pub const DEFAULT_FEE_MARGIN: Coin = Coin::new(Decimal::from_parts(1, 0, 0, false, 3));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerParams {
    pub mempool: MempoolParams,
    // The number of transactions committed by `Ledger::commit`.
    pub batch_size: usize,
    pub coinbase_policy: CoinbasePolicy,
    // Fee that proposed transactions pay on top of the transferred amount.
    pub fee_margin: Coin,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            mempool: MempoolParams::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            coinbase_policy: CoinbasePolicy::default(),
            fee_margin: DEFAULT_FEE_MARGIN,
        }
    }
}

/// A single ledger session: the UTXO set, the transactions waiting to be committed and the
/// blocks committed so far.
/// Every mutation goes through `&mut self`, so admission and commit never interleave.
/// Use `SharedLedger` to access the same ledger from multiple threads.
#[derive(Debug, Clone)]
pub struct Ledger {
    utxo_set: UtxoSet,
    mempool: Mempool,
    blockchain: Blockchain,
    params: LedgerParams,
}

impl Ledger {
    pub fn new(params: LedgerParams) -> Self {
        Self {
            utxo_set: UtxoSet::new(),
            mempool: Mempool::with_params(params.mempool),
            blockchain: Blockchain::new(),
            params,
        }
    }

    /// Creates the ledger seeded with the default genesis allocation.
    pub fn with_default_genesis(params: LedgerParams) -> Self {
        let mut ledger = Self::new(params);
        ledger.seed_genesis(&default_allocation());
        ledger
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    /// Adds an output directly to the UTXO set, bypassing validation.
    pub fn seed(&mut self, outpoint: OutPoint, amount: Coin, owner: Address) -> Option<UtxoEntry> {
        debug!("Seeding {} with {} for {}", outpoint, amount, owner);
        self.utxo_set.add(outpoint, amount, owner)
    }

    /// Seeds the allocation as outputs of the `genesis` transaction, one output per owner in
    /// the given order.
    pub fn seed_genesis(&mut self, allocation: &[(Address, Coin)]) -> Vec<OutPoint> {
        allocation
            .iter()
            .enumerate()
            .map(|(index, (owner, amount))| {
                let outpoint =
                    OutPoint::new(TransactionId::genesis(), OutputIndex::new(index as u32));
                self.seed(outpoint.clone(), *amount, owner.clone());
                outpoint
            })
            .collect()
    }

    /// Validates the transaction and stages it in the mempool. Returns its fee.
    pub fn submit(&mut self, transaction: Transaction) -> Result<Coin, MempoolError> {
        self.mempool.admit(transaction, &self.utxo_set)
    }

    /// Builds a transaction that transfers `amount` from `sender` to `receiver` and submits it.
    ///
    /// The sender's outputs that no pending transaction spends are selected in enumeration
    /// order until they cover the amount plus the fee margin. The remainder, if any, is
    /// returned to the sender as the second output.
    pub fn propose_transaction(
        &mut self,
        sender: &Address,
        receiver: &Address,
        amount: Coin,
    ) -> Result<MempoolEntry, ProposalError> {
        if amount <= Coin::zero() {
            return Err(ProposalError::NonPositiveAmount(amount));
        }
        let target = amount.saturating_add(self.params.fee_margin);
        let mut selected = vec![];
        let mut total = Coin::zero();
        for (outpoint, value) in self.spendable_outputs_of(sender) {
            selected.push(TransactionInput::spending(outpoint, sender.clone()));
            total = total.saturating_add(value);
            if total >= target {
                break;
            }
        }
        if total < amount {
            return Err(ProposalError::InsufficientFunds {
                available: total,
                requested: amount,
            });
        }

        let mut outputs = vec![TransactionOutput::new(amount, receiver.clone())];
        let change = (total - amount - self.params.fee_margin).round_fee();
        if change > Coin::zero() {
            outputs.push(TransactionOutput::new(change, sender.clone()));
        }
        let transaction = Transaction::with_derived_id(selected, outputs)?;
        let fee = self.submit(transaction.clone())?;
        Ok(MempoolEntry::new(transaction, fee))
    }

    /// Removes a pending transaction. Unknown ids are ignored.
    pub fn evict(&mut self, id: &TransactionId) -> Option<MempoolEntry> {
        self.mempool.evict(id)
    }

    pub fn clear_mempool(&mut self) {
        self.mempool.clear();
    }

    /// Commits up to `batch_size` transactions from the parameters.
    pub fn commit(&mut self, miner: &Address) -> &Block {
        let batch_size = self.params.batch_size;
        self.commit_batch(miner, batch_size)
    }

    /// Commits up to `batch_size` pending transactions with the highest fees and records the
    /// batch as a new block.
    pub fn commit_batch(&mut self, miner: &Address, batch_size: usize) -> &Block {
        let height = self.blockchain.height() + 1;
        let coinbase = self.params.coinbase_policy.coinbase_outpoint(height);
        let report = Miner::commit_with_coinbase(
            miner,
            &mut self.mempool,
            &mut self.utxo_set,
            batch_size,
            coinbase,
        );
        let block = self.blockchain.accept(Utc::now().timestamp(), report);
        info!("Block mined successfully: {}", block);
        block
    }

    pub fn balance_of(&self, owner: &Address) -> Coin {
        self.utxo_set.balance_of(owner)
    }

    pub fn outputs_of(&self, owner: &Address) -> Vec<(OutPoint, Coin)> {
        self.utxo_set.outputs_of(owner)
    }

    /// Outputs of the owner that no pending transaction spends.
    pub fn spendable_outputs_of(&self, owner: &Address) -> Vec<(OutPoint, Coin)> {
        self.utxo_set
            .outputs_of(owner)
            .into_iter()
            .filter(|(outpoint, _)| !self.mempool.is_reserved(outpoint))
            .collect()
    }

    pub fn utxo_set(&self) -> &UtxoSet {
        &self.utxo_set
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn blockchain(&self) -> &Blockchain {
        &self.blockchain
    }
}

/// A ledger that can be shared between threads.
/// Each operation holds a single lock over the UTXO set and the mempool, so a commit batch is
/// never interleaved with an admission.
#[derive(Clone)]
pub struct SharedLedger {
    ledger: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
        }
    }

    pub fn submit(&self, transaction: Transaction) -> Result<Coin, MempoolError> {
        self.ledger.lock().submit(transaction)
    }

    pub fn propose_transaction(
        &self,
        sender: &Address,
        receiver: &Address,
        amount: Coin,
    ) -> Result<MempoolEntry, ProposalError> {
        self.ledger
            .lock()
            .propose_transaction(sender, receiver, amount)
    }

    pub fn evict(&self, id: &TransactionId) -> Option<MempoolEntry> {
        self.ledger.lock().evict(id)
    }

    pub fn commit(&self, miner: &Address) -> Block {
        self.ledger.lock().commit(miner).clone()
    }

    pub fn commit_batch(&self, miner: &Address, batch_size: usize) -> Block {
        self.ledger.lock().commit_batch(miner, batch_size).clone()
    }

    pub fn balance_of(&self, owner: &Address) -> Coin {
        self.ledger.lock().balance_of(owner)
    }

    pub fn outputs_of(&self, owner: &Address) -> Vec<(OutPoint, Coin)> {
        self.ledger.lock().outputs_of(owner)
    }

    /// Runs a read-only query while holding the lock.
    pub fn read<R>(&self, query: impl FnOnce(&Ledger) -> R) -> R {
        let ledger = self.ledger.lock();
        query(&*ledger)
    }
}
