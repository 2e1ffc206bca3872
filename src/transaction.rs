use crate::{Coin, Sha256, TransactionError};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

// Outputs of the initial allocation are produced by this pseudo-transaction.
const GENESIS_TRANSACTION_ID: &str = "genesis";
// Fee rewards are produced by this pseudo-transaction.
const COINBASE_TRANSACTION_ID: &str = "coinbase";

/// Identifies a transaction, and implicitly all outputs it produces.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn genesis() -> Self {
        Self::new(GENESIS_TRANSACTION_ID)
    }

    pub fn coinbase() -> Self {
        Self::new(COINBASE_TRANSACTION_ID)
    }

    /// Coinbase identifier that is unique for every block height.
    pub fn coinbase_at(height: u64) -> Self {
        Self(format!("{}-{}", COINBASE_TRANSACTION_ID, height))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true for ids of the pseudo-transactions that the ledger mints outputs for:
    /// `genesis`, `coinbase` and `coinbase-<height>`.
    pub fn is_reserved(&self) -> bool {
        self.0 == GENESIS_TRANSACTION_ID
            || self.0 == COINBASE_TRANSACTION_ID
            || self
                .0
                .starts_with(&format!("{}-", COINBASE_TRANSACTION_ID))
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

/// An owner identity. Outputs are sent to an address, inputs claim to be spent by one.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A reference to a single transaction output: the producing transaction and the output index.
/// Ordered by transaction id first, so outputs of the same transaction are adjacent.
#[derive(Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutPoint {
    txid: TransactionId,
    index: OutputIndex,
}

impl OutPoint {
    pub fn new(txid: TransactionId, index: OutputIndex) -> Self {
        Self { txid, index }
    }

    pub fn txid(&self) -> &TransactionId {
        &self.txid
    }

    pub fn index(&self) -> OutputIndex {
        self.index
    }
}

impl Display for OutPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

impl From<(&str, u32)> for OutPoint {
    fn from((txid, index): (&str, u32)) -> Self {
        Self::new(TransactionId::new(txid), OutputIndex::new(index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    // A pointer to the transaction containing the UTXO to be spent.
    utxo_id: TransactionId,
    // The number of UTXO to be spent, the first one is 0.
    output_index: OutputIndex,
    // Who claims to spend the output. It must match the owner recorded in the UTXO set.
    owner: Address,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ({})", self.utxo_id, self.output_index, self.owner)
    }
}

impl TransactionInput {
    pub fn new(utxo_id: TransactionId, output_index: OutputIndex, owner: Address) -> Self {
        Self {
            utxo_id,
            output_index,
            owner,
        }
    }

    pub fn spending(outpoint: OutPoint, owner: Address) -> Self {
        Self::new(outpoint.txid, outpoint.index, owner)
    }

    pub fn utxo_id(&self) -> &TransactionId {
        &self.utxo_id
    }

    pub fn output_index(&self) -> OutputIndex {
        self.output_index
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.utxo_id.clone(), self.output_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    amount: Coin,
    to: Address,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.amount, self.to)
    }
}

impl TransactionOutput {
    pub fn new(amount: Coin, to: Address) -> Self {
        Self { amount, to }
    }

    pub fn amount(&self) -> Coin {
        self.amount
    }

    pub fn to(&self) -> &Address {
        &self.to
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedTransaction")]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

// Deserialized form, it goes through the same checks as `Transaction::new`.
#[derive(Deserialize)]
struct UncheckedTransaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl TryFrom<UncheckedTransaction> for Transaction {
    type Error = TransactionError;

    fn try_from(value: UncheckedTransaction) -> Result<Self, Self::Error> {
        Transaction::new(value.id, value.inputs, value.outputs)
    }
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, TransactionError> {
        let transaction = Self {
            id,
            inputs,
            outputs,
        };
        transaction.validate_format()?;
        Ok(transaction)
    }

    /// Creates a transaction whose id is derived from its contents.
    /// Inputs refer to unspent outputs, which can be spent only once, so the derived ids
    /// don't collide.
    pub fn with_derived_id(
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Result<Self, TransactionError> {
        let id = Self::hash_transaction_data(&inputs, &outputs)?;
        Self::new(id, inputs, outputs)
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// References of all outputs that the transaction spends, in declaration order.
    pub fn outpoints(&self) -> impl Iterator<Item = OutPoint> + '_ {
        self.inputs.iter().map(TransactionInput::outpoint)
    }

    pub fn output_total(&self) -> Coin {
        self.outputs.iter().map(TransactionOutput::amount).sum()
    }

    fn hash_transaction_data(
        inputs: &Vec<TransactionInput>,
        outputs: &Vec<TransactionOutput>,
    ) -> Result<TransactionId, TransactionError> {
        let data = bincode::serialize(&(inputs, outputs))
            .map_err(|e| TransactionError::Encoding(e.to_string()))?;
        Ok(TransactionId(Sha256::double_digest(&data).to_hex()))
    }

    /// Checks if the format of the transaction is valid, i.e.
    ///   - The identifier is not empty
    ///   - The identifier isn't one of the ids reserved for minted outputs
    ///   - Every input owner and every output destination is a non-empty address
    /// Amounts are checked against the UTXO set by the validator.
    fn validate_format(&self) -> Result<(), TransactionError> {
        if self.id.is_empty() {
            return Err(TransactionError::EmptyTransactionId);
        }
        if self.id.is_reserved() {
            return Err(TransactionError::ReservedTransactionId(self.id.clone()));
        }
        let has_empty_address = self.inputs.iter().any(|input| input.owner.is_empty())
            || self.outputs.iter().any(|output| output.to.is_empty());
        if has_empty_address {
            Err(TransactionError::EmptyAddress)
        } else {
            Ok(())
        }
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let inputs = self
            .inputs
            .iter()
            .map(TransactionInput::to_string)
            .collect::<Vec<String>>()
            .join(", ");
        let outputs = self
            .outputs
            .iter()
            .map(TransactionOutput::to_string)
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{}: [{}] => [{}]", self.id, inputs, outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn spend_genesis(owner: &str) -> Vec<TransactionInput> {
        vec![TransactionInput::spending(
            OutPoint::from(("genesis", 0)),
            Address::from(owner),
        )]
    }

    #[test]
    fn rejects_empty_identifier() {
        let outputs = vec![TransactionOutput::new(Coin::from(10), Address::from("Bob"))];
        assert_eq!(
            Transaction::new(TransactionId::new(""), spend_genesis("Alice"), outputs),
            Err(TransactionError::EmptyTransactionId)
        );
    }

    #[test]
    fn rejects_reserved_identifiers() {
        for id in ["genesis", "coinbase", "coinbase-3"].iter() {
            let outputs = vec![TransactionOutput::new(Coin::from(10), Address::from("Bob"))];
            assert_eq!(
                Transaction::new(TransactionId::new(*id), spend_genesis("Alice"), outputs),
                Err(TransactionError::ReservedTransactionId(TransactionId::new(
                    *id
                )))
            );
        }
        assert!(!TransactionId::new("genesis-Alice").is_reserved());
        assert!(!TransactionId::new("coinbases").is_reserved());
        assert!(TransactionId::coinbase_at(1).is_reserved());
    }

    #[test]
    fn rejects_empty_addresses() {
        let outputs = vec![TransactionOutput::new(Coin::from(10), Address::from("Bob"))];
        assert_eq!(
            Transaction::new(TransactionId::new("tx1"), spend_genesis(" "), outputs),
            Err(TransactionError::EmptyAddress)
        );

        let outputs = vec![TransactionOutput::new(Coin::from(10), Address::from(""))];
        assert_eq!(
            Transaction::new(TransactionId::new("tx1"), spend_genesis("Alice"), outputs),
            Err(TransactionError::EmptyAddress)
        );
    }

    #[test]
    fn derived_id_depends_on_contents() {
        let to_bob = vec![TransactionOutput::new(Coin::from(10), Address::from("Bob"))];
        let to_charlie = vec![TransactionOutput::new(
            Coin::from(10),
            Address::from("Charlie"),
        )];
        let first = Transaction::with_derived_id(spend_genesis("Alice"), to_bob.clone()).unwrap();
        let same = Transaction::with_derived_id(spend_genesis("Alice"), to_bob).unwrap();
        let other = Transaction::with_derived_id(spend_genesis("Alice"), to_charlie).unwrap();
        assert_eq!(first.id(), same.id());
        assert_ne!(first.id(), other.id());
        assert_eq!(first.id().as_str().len(), 64);
    }

    #[test]
    fn parses_json_through_constructor() {
        let json = r#"{
            "id": "tx1",
            "inputs": [{"utxo_id": "genesis", "output_index": 0, "owner": "Alice"}],
            "outputs": [{"amount": 10, "to": "Bob"}, {"amount": "39.999", "to": "Alice"}]
        }"#;
        let transaction: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(transaction.id(), &TransactionId::new("tx1"));
        assert_eq!(
            transaction.outpoints().collect::<Vec<OutPoint>>(),
            vec![OutPoint::from(("genesis", 0))]
        );
        assert_eq!(transaction.output_total(), Coin::new(dec!(49.999)));

        let invalid = r#"{"id": "", "inputs": [], "outputs": []}"#;
        assert!(serde_json::from_str::<Transaction>(invalid).is_err());
    }

    #[test]
    fn outpoint_display() {
        assert_eq!(OutPoint::from(("genesis", 3)).to_string(), "genesis:3");
        assert_eq!(TransactionId::coinbase_at(7).to_string(), "coinbase-7");
    }
}
