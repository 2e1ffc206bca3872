use crate::{
    Address, Coin, Ledger, MempoolError, OutPoint, Transaction, TransactionError, TransactionId,
    TransactionInput, TransactionOutput,
};
use rust_decimal_macros::dec;

/// Two transactions that spend Alice's first genesis output.
/// The first one is admitted, the second one must be rejected because the output is
/// already reserved by the mempool.
pub struct DoubleSpendScenario {
    first: Transaction,
    second: Transaction,
}

/// Admission results of both transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleSpendOutcome {
    pub first: Result<Coin, MempoolError>,
    pub second: Result<Coin, MempoolError>,
}

impl DoubleSpendScenario {
    pub fn new() -> Result<Self, TransactionError> {
        Ok(Self {
            first: Self::spend_alice_genesis("tx1", "Bob")?,
            second: Self::spend_alice_genesis("tx2", "Charlie")?,
        })
    }

    pub fn run(&self, ledger: &mut Ledger) -> DoubleSpendOutcome {
        DoubleSpendOutcome {
            first: ledger.submit(self.first.clone()),
            second: ledger.submit(self.second.clone()),
        }
    }

    pub fn first(&self) -> &Transaction {
        &self.first
    }

    pub fn second(&self) -> &Transaction {
        &self.second
    }

    fn spend_alice_genesis(id: &str, receiver: &str) -> Result<Transaction, TransactionError> {
        let alice = Address::from("Alice");
        let input = TransactionInput::spending(OutPoint::from(("genesis", 0)), alice.clone());
        let outputs = vec![
            TransactionOutput::new(Coin::from(10), Address::from(receiver)),
            TransactionOutput::new(Coin::new(dec!(39.999)), alice),
        ];
        Transaction::new(TransactionId::new(id), vec![input], outputs)
    }
}
