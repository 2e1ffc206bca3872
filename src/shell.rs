use crate::{
    Address, Coin, DoubleSpendScenario, Ledger, MempoolError, Transaction, TransactionId,
};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};

/// Interactive menu over a ledger session.
/// Reads choices from `input` and renders the ledger to `output`, one command at a time.
pub struct Shell<R, W> {
    ledger: Ledger,
    // The allocation the ledger was seeded with, shown in the banner.
    genesis: Vec<(Address, Coin)>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(ledger: Ledger, genesis: Vec<(Address, Coin)>, input: R, output: W) -> Self {
        Self {
            ledger,
            genesis,
            input,
            output,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the menu until the user exits or the input is exhausted.
    pub fn run(&mut self) -> Result<(), String> {
        loop {
            self.print_menu()?;
            let choice = match self.prompt("\nEnter choice: ")? {
                None => return Ok(()),
                Some(choice) => choice,
            };
            match choice.as_str() {
                "1" => self.execute_create_transaction()?,
                "2" => self.execute_view_utxo_set()?,
                "3" => self.execute_view_mempool()?,
                "4" => self.execute_mine_block()?,
                "5" => self.execute_run_scenario()?,
                "6" => {
                    self.print("Exiting...")?;
                    return Ok(());
                }
                "7" => self.execute_evict_transaction()?,
                "8" => self.execute_view_blocks()?,
                "9" => self.execute_view_balances()?,
                "10" => self.execute_submit_raw_transaction()?,
                _ => self.print("Invalid choice!")?,
            }
        }
    }

    fn print_menu(&mut self) -> Result<(), String> {
        let mut menu = vec![
            "\n=== Bitcoin Transaction Simulator ===".to_string(),
            "Initial UTXOs (Genesis Block):".to_string(),
        ];
        for (owner, amount) in &self.genesis {
            menu.push(format!("- {} : {}", owner, amount));
        }
        menu.push("\nMain Menu:".to_string());
        menu.extend(
            [
                "1. Create new transaction",
                "2. View UTXO set",
                "3. View mempool",
                "4. Mine block",
                "5. Run test scenarios",
                "6. Exit",
                "7. Evict pending transaction",
                "8. View blocks",
                "9. View balances",
                "10. Submit raw transaction (JSON)",
            ]
            .iter()
            .map(|line| line.to_string()),
        );
        self.print(&menu.join("\n"))
    }

    fn execute_create_transaction(&mut self) -> Result<(), String> {
        let sender = match self.prompt("Enter sender: ")? {
            None => return Ok(()),
            Some(sender) => Address::new(sender),
        };
        let balance = self.ledger.balance_of(&sender);
        self.print(&format!("Available balance: {}", balance))?;
        let receiver = match self.prompt("Enter recipient: ")? {
            None => return Ok(()),
            Some(receiver) => Address::new(receiver),
        };
        let amount = match self.prompt("Enter amount: ")? {
            None => return Ok(()),
            Some(amount) => amount,
        };
        let amount = match amount.parse::<Coin>() {
            Ok(amount) => amount,
            Err(e) => return self.print(&e),
        };

        match self
            .ledger
            .propose_transaction(&sender, &receiver, amount)
        {
            Ok(entry) => self.print(&format!(
                "Transaction valid! Fee: {}\nTransaction ID: {}",
                entry.fee(),
                entry.transaction().id()
            )),
            Err(e) => self.print(&format!("Transaction rejected: {}", e)),
        }
    }

    fn execute_view_utxo_set(&mut self) -> Result<(), String> {
        let mut lines = vec!["\nUTXO Set:".to_string()];
        for (outpoint, entry) in self.ledger.utxo_set().iter() {
            lines.push(format!("{} -> {}", outpoint, entry));
        }
        self.print(&lines.join("\n"))
    }

    fn execute_view_mempool(&mut self) -> Result<(), String> {
        let mut lines = vec!["\nMempool:".to_string()];
        for entry in self.ledger.mempool().entries() {
            lines.push(format!("{} | fee: {}", entry.transaction(), entry.fee()));
        }
        self.print(&lines.join("\n"))
    }

    fn execute_mine_block(&mut self) -> Result<(), String> {
        let miner = match self.prompt("Enter miner name: ")? {
            None => return Ok(()),
            Some(miner) => Address::new(miner),
        };
        if miner.is_empty() {
            return self.print("Miner name must not be empty");
        }
        self.print("Mining block...")?;
        let block = self.ledger.commit(&miner);
        let report = block.report();
        let summary = format!(
            "Selected {} transactions from mempool.\nMiner {} receives {}\nBlock mined successfully!\n{}",
            report.num_transactions(),
            report.miner(),
            report.total_fees(),
            block
        );
        self.print(&summary)
    }

    fn execute_run_scenario(&mut self) -> Result<(), String> {
        self.print("\nRunning Test: Double Spend\n")?;
        let scenario = DoubleSpendScenario::new().map_err(|e| e.to_string())?;
        let outcome = scenario.run(&mut self.ledger);
        let first = Self::describe_admission(&outcome.first);
        let second = Self::describe_admission(&outcome.second);
        self.print(&format!("TX1: {}\nTX2: {}", first, second))
    }

    fn execute_evict_transaction(&mut self) -> Result<(), String> {
        let id = match self.prompt("Enter transaction ID: ")? {
            None => return Ok(()),
            Some(id) => TransactionId::new(id),
        };
        match self.ledger.evict(&id) {
            Some(entry) => self.print(&format!(
                "Evicted transaction {} with fee {}",
                id,
                entry.fee()
            )),
            None => self.print(&format!("No pending transaction: {}", id)),
        }
    }

    fn execute_view_blocks(&mut self) -> Result<(), String> {
        let mut lines = vec!["\nBlocks:".to_string()];
        for block in self.ledger.blockchain().blocks() {
            lines.push(block.to_string());
        }
        self.print(&lines.join("\n"))
    }

    fn execute_view_balances(&mut self) -> Result<(), String> {
        let balances = self.ledger.utxo_set().iter().fold(
            BTreeMap::<&Address, Coin>::new(),
            |mut balances, (_, entry)| {
                let balance = balances.entry(entry.owner()).or_insert_with(Coin::zero);
                *balance = balance.saturating_add(entry.amount());
                balances
            },
        );
        let mut balances = balances.into_iter().collect::<Vec<(&Address, Coin)>>();
        // Sort by amount in non-increasing order, owners with equal amounts stay sorted by name.
        balances.sort_by(|(_, lhs), (_, rhs)| rhs.cmp(lhs));
        let mut lines = vec!["\nBalances:".to_string()];
        for (owner, balance) in balances {
            lines.push(format!("{}: {}", owner, balance));
        }
        self.print(&lines.join("\n"))
    }

    fn execute_submit_raw_transaction(&mut self) -> Result<(), String> {
        let json = match self.prompt("Enter transaction JSON: ")? {
            None => return Ok(()),
            Some(json) => json,
        };
        match serde_json::from_str::<Transaction>(&json) {
            Ok(transaction) => {
                let result = self.ledger.submit(transaction);
                let description = Self::describe_admission(&result);
                self.print(&description)
            }
            Err(e) => self.print(&format!("Invalid transaction: {}", e)),
        }
    }

    fn describe_admission(result: &Result<Coin, MempoolError>) -> String {
        match result {
            Ok(fee) => format!("Transaction valid! Fee: {}", fee),
            Err(e) => format!("Transaction rejected: {}", e),
        }
    }

    /// Returns the trimmed line, or `None` if the input is exhausted.
    fn prompt(&mut self, message: &str) -> Result<Option<String>, String> {
        write!(self.output, "{}", message).map_err(|e| e.to_string())?;
        self.output.flush().map_err(|e| e.to_string())?;
        let mut line = String::new();
        let num_bytes = self
            .input
            .read_line(&mut line)
            .map_err(|e| e.to_string())?;
        if num_bytes == 0 {
            Ok(None)
        } else {
            Ok(Some(line.trim().to_string()))
        }
    }

    fn print(&mut self, message: &str) -> Result<(), String> {
        writeln!(self.output, "{}", message).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genesis::default_allocation;
    use crate::{LedgerParams, OutPoint};
    use std::io::Cursor;

    fn run_shell(input: &str) -> (Ledger, String) {
        let ledger = Ledger::with_default_genesis(LedgerParams::default());
        let mut shell = Shell::new(
            ledger,
            default_allocation(),
            Cursor::new(input.as_bytes().to_vec()),
            vec![],
        );
        shell.run().unwrap();
        let ledger = shell.ledger().clone();
        let output = String::from_utf8(shell.into_output()).unwrap();
        (ledger, output)
    }

    #[test]
    fn shows_genesis_banner_and_exits() {
        let (_, output) = run_shell("6\n");
        assert!(output.contains("=== Bitcoin Transaction Simulator ==="));
        assert!(output.contains("- Alice : 50 BTC"));
        assert!(output.contains("- Eve : 5 BTC"));
        assert!(output.contains("Exiting..."));
    }

    #[test]
    fn end_of_input_stops_the_loop() {
        let (_, output) = run_shell("");
        assert!(output.contains("Enter choice: "));
        assert!(!output.contains("Exiting..."));
    }

    #[test]
    fn invalid_choice() {
        let (_, output) = run_shell("42\n6\n");
        assert!(output.contains("Invalid choice!"));
    }

    #[test]
    fn create_transaction_and_mine() {
        let (ledger, output) = run_shell("1\nAlice\nBob\n10\n3\n4\nMiner\n9\n6\n");
        assert!(output.contains("Available balance: 50 BTC"));
        assert!(output.contains("Transaction valid! Fee: 0.001 BTC"));
        assert!(output.contains("Selected 1 transactions from mempool."));
        assert!(output.contains("Miner Miner receives 0.001 BTC"));
        assert!(output.contains("Block mined successfully!"));
        assert!(output.contains("Bob: 40 BTC"));
        assert_eq!(
            ledger.balance_of(&Address::from("Alice")),
            "39.999".parse::<Coin>().unwrap()
        );
        assert!(ledger.mempool().is_empty());
        assert_eq!(ledger.blockchain().height(), 1);
    }

    #[test]
    fn create_transaction_with_invalid_amount() {
        let (ledger, output) = run_shell("1\nAlice\nBob\nten\n6\n");
        assert!(output.contains("Invalid amount: ten"));
        assert!(ledger.mempool().is_empty());
    }

    #[test]
    fn create_transaction_with_insufficient_funds() {
        let (_, output) = run_shell("1\nEve\nBob\n6\n6\n");
        assert!(output.contains(
            "Transaction rejected: Insufficient funds: available 5 BTC, requested 6 BTC"
        ));
    }

    #[test]
    fn double_spend_scenario() {
        let (ledger, output) = run_shell("5\n3\n6\n");
        assert!(output.contains("TX1: Transaction valid! Fee: 0.001 BTC"));
        assert!(output.contains(
            "TX2: Transaction rejected: UTXO genesis:0 already spent by mempool transaction"
        ));
        assert!(output.contains("tx1: [genesis:0 (Alice)]"));
        assert_eq!(ledger.mempool().len(), 1);
    }

    #[test]
    fn evict_pending_transaction() {
        let (ledger, output) = run_shell("5\n7\ntx1\n7\ntx1\n6\n");
        assert!(output.contains("Evicted transaction tx1 with fee 0.001 BTC"));
        assert!(output.contains("No pending transaction: tx1"));
        assert!(ledger.mempool().is_empty());
        assert!(!ledger
            .mempool()
            .is_reserved(&OutPoint::from(("genesis", 0))));
    }

    #[test]
    fn submit_raw_transaction() {
        let json = r#"{"id": "raw", "inputs": [{"utxo_id": "genesis", "output_index": 1, "owner": "Bob"}], "outputs": [{"amount": "-1", "to": "Eve"}]}"#;
        let (ledger, output) = run_shell(&format!("10\n{}\n10\nnot json\n6\n", json));
        assert!(output.contains("Transaction rejected: Negative output amount: -1 BTC at index 0"));
        assert!(output.contains("Invalid transaction:"));
        assert!(ledger.mempool().is_empty());
    }

    #[test]
    fn view_balances_sorted_by_amount() {
        let (_, output) = run_shell("9\n6\n");
        let alice = output.find("Alice: 50 BTC").unwrap();
        let bob = output.find("Bob: 30 BTC").unwrap();
        let eve = output.find("Eve: 5 BTC").unwrap();
        assert!(alice < bob);
        assert!(bob < eve);
    }

    #[test]
    fn raw_transaction_with_reserved_identifier_is_refused() {
        let json = r#"{"id": "coinbase", "inputs": [{"utxo_id": "genesis", "output_index": 1, "owner": "Bob"}], "outputs": [{"amount": 29, "to": "Eve"}]}"#;
        let (ledger, output) = run_shell(&format!("10\n{}\n4\nMiner\n6\n", json));
        assert!(output
            .contains("Invalid transaction: Transaction identifier coinbase is reserved"));
        assert_eq!(ledger.utxo_set().total(), Coin::from(115));
        assert_eq!(ledger.balance_of(&Address::from("Eve")), Coin::from(5));
    }

    #[test]
    fn view_utxo_set_and_blocks() {
        let (_, output) = run_shell("4\nMiner\n2\n8\n6\n");
        assert!(output.contains("genesis:0 -> 50 BTC (Alice)"));
        assert!(output.contains("coinbase:0 -> 0 BTC (Miner)"));
        assert!(output.contains("#1 "));
    }
}
