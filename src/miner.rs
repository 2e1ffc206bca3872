use crate::{Address, Coin, Mempool, MempoolEntry, OutPoint, OutputIndex, TransactionId, UtxoSet};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The default number of transactions committed at once.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Decides which output reference receives the fee reward of a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinbasePolicy {
    // Every reward is stored at `coinbase:0`, so a commit replaces the previous reward.
    Fixed,
    // Every reward is stored at `coinbase-<height>:0`.
    PerHeight,
}

impl CoinbasePolicy {
    pub fn coinbase_outpoint(&self, height: u64) -> OutPoint {
        let txid = match self {
            CoinbasePolicy::Fixed => TransactionId::coinbase(),
            CoinbasePolicy::PerHeight => TransactionId::coinbase_at(height),
        };
        OutPoint::new(txid, OutputIndex::new(0))
    }
}

impl Default for CoinbasePolicy {
    fn default() -> Self {
        CoinbasePolicy::Fixed
    }
}

impl FromStr for CoinbasePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "per-height" => Ok(Self::PerHeight),
            unknown => Err(format!("Unknown CoinbasePolicy: {}", unknown)),
        }
    }
}

/// The outcome of committing a batch of pending transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    // Committed entries in the order they were applied.
    committed: Vec<MempoolEntry>,
    total_fees: Coin,
    miner: Address,
    // The output that holds the reward.
    coinbase: OutPoint,
}

impl CommitReport {
    pub fn committed(&self) -> &Vec<MempoolEntry> {
        &self.committed
    }

    pub fn num_transactions(&self) -> usize {
        self.committed.len()
    }

    pub fn total_fees(&self) -> Coin {
        self.total_fees
    }

    pub fn miner(&self) -> &Address {
        &self.miner
    }

    pub fn coinbase(&self) -> &OutPoint {
        &self.coinbase
    }

    pub fn transaction_ids(&self) -> Vec<&TransactionId> {
        self.committed
            .iter()
            .map(|entry| entry.transaction().id())
            .collect()
    }
}

/// Moves pending transactions into the UTXO set and rewards the miner with their fees.
pub struct Miner {}

impl Miner {
    /// Commits up to `batch_size` transactions with the highest fees and credits the fees to
    /// `miner` at `coinbase:0`.
    /// Note that the reward output is replaced by the next commit.
    pub fn commit(
        miner: &Address,
        mempool: &mut Mempool,
        utxo_set: &mut UtxoSet,
        batch_size: usize,
    ) -> CommitReport {
        let coinbase = CoinbasePolicy::Fixed.coinbase_outpoint(0);
        Self::commit_with_coinbase(miner, mempool, utxo_set, batch_size, coinbase)
    }

    /// Same as `commit`, but the reward is stored at the given output reference.
    ///
    /// Both the mempool and the UTXO set are borrowed mutably for the whole batch, so no
    /// admission can observe a partially applied transaction.
    pub fn commit_with_coinbase(
        miner: &Address,
        mempool: &mut Mempool,
        utxo_set: &mut UtxoSet,
        batch_size: usize,
        coinbase: OutPoint,
    ) -> CommitReport {
        let selected = mempool
            .top(batch_size)
            .into_iter()
            .cloned()
            .collect::<Vec<MempoolEntry>>();
        info!("Selected {} transactions from mempool.", selected.len());

        let mut total_fees = Coin::zero();
        for entry in &selected {
            let transaction = entry.transaction();
            for outpoint in transaction.outpoints() {
                if utxo_set.remove(&outpoint).is_none() {
                    // Removal is idempotent, a missing output is treated as already consumed.
                    debug!(
                        "Input {} of transaction {} is already spent",
                        outpoint,
                        transaction.id()
                    );
                }
            }
            for (index, output) in transaction.outputs().iter().enumerate() {
                let outpoint = OutPoint::new(
                    transaction.id().clone(),
                    OutputIndex::new(index as u32),
                );
                utxo_set.add(outpoint, output.amount(), output.to().clone());
            }
            mempool.evict(transaction.id());
            total_fees = total_fees.saturating_add(entry.fee());
        }

        if let Some(previous) = utxo_set.add(coinbase.clone(), total_fees, miner.clone()) {
            warn!(
                "Coinbase output {} replaced the previous reward: {}",
                coinbase, previous
            );
        }
        info!("Miner {} receives {}", miner, total_fees);

        CommitReport {
            committed: selected,
            total_fees,
            miner: miner.clone(),
            coinbase,
        }
    }
}
