use crate::{Address, Coin};

/// The initial allocation of the simulator, in output index order of the genesis transaction.
pub fn default_allocation() -> Vec<(Address, Coin)> {
    vec![
        (Address::from("Alice"), Coin::from(50)),
        (Address::from("Bob"), Coin::from(30)),
        (Address::from("Charlie"), Coin::from(20)),
        (Address::from("David"), Coin::from(10)),
        (Address::from("Eve"), Coin::from(5)),
    ]
}
