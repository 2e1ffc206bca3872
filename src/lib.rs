pub mod block;
pub mod chain;
pub mod coin;
pub mod commands;
pub mod error;
pub mod genesis;
pub mod hash;
pub mod ledger;
pub mod mempool;
pub mod merkle_tree;
pub mod miner;
pub mod scenarios;
pub mod shell;
pub mod transaction;
pub mod utxo_set;
pub mod validation;

pub use self::{
    block::*, chain::*, coin::*, error::*, hash::*, ledger::*, mempool::*, merkle_tree::*,
    miner::*, scenarios::*, shell::*, transaction::*, utxo_set::*, validation::*,
};

/// Initializes the logger from `RUST_LOG`, reporting warnings by default.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}
