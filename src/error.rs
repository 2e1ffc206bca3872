use crate::{Address, Coin, OutPoint, TransactionId};
use thiserror::Error;

/// Reasons for which a transaction is rejected when checked against the UTXO set and the
/// outputs already reserved by the mempool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Double-spend inside transaction: {0} is referenced more than once")]
    DuplicateInputInTx(OutPoint),

    #[error("UTXO {0} does not exist")]
    UnknownUtxo(OutPoint),

    #[error("UTXO {0} already spent by mempool transaction")]
    AlreadyReservedByPool(OutPoint),

    #[error("Owner mismatch for UTXO {outpoint}: claimed by {claimed}, owned by {owner}")]
    OwnerMismatch {
        outpoint: OutPoint,
        claimed: Address,
        owner: Address,
    },

    #[error("Negative output amount: {amount} at index {index}")]
    NegativeOutput { index: usize, amount: Coin },

    #[error("Insufficient funds: inputs {inputs} are less than outputs {outputs}")]
    InsufficientFunds { inputs: Coin, outputs: Coin },

    // Only reachable when the seeded outputs of a single spender exceed the decimal range.
    #[error("Input total of {0} inputs exceeds the representable amount")]
    InputTotalOverflow(usize),
}

/// Reasons for which the mempool refuses to stage a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MempoolError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Transaction {0} is already known")]
    DuplicateTransaction(TransactionId),

    #[error("Mempool is full. Capacity: {capacity}")]
    Full { capacity: usize },
}

/// Malformed transaction structure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Transaction identifier must not be empty")]
    EmptyTransactionId,

    #[error("Transaction identifier {0} is reserved for the ledger")]
    ReservedTransactionId(TransactionId),

    #[error("Address must not be empty")]
    EmptyAddress,

    #[error("Failed to encode transaction: {0}")]
    Encoding(String),
}

/// Reasons for which a transfer couldn't be turned into an admitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposalError {
    #[error("Amount must be positive, got: {0}")]
    NonPositiveAmount(Coin),

    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: Coin, requested: Coin },

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Rejected(#[from] MempoolError),
}
