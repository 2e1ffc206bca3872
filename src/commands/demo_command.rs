use crate::commands::shell_command::ledger_args;
use crate::{Address, DoubleSpendScenario, Ledger, LedgerParams, MempoolParams};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;

struct DemoCliOptions {
    params: LedgerParams,
    miner: Address,
}

impl DemoCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let miner = Address::new(matches.value_of("miner").unwrap_or("Miner"));
        if miner.is_empty() {
            return Err("Miner name must not be empty".into());
        }
        Ok(Self {
            params: LedgerParams {
                mempool: MempoolParams {
                    max_size: matches.value_of_t("mempool-size")?,
                },
                batch_size: matches.value_of_t("batch-size")?,
                coinbase_policy: matches.value_of_t("coinbase")?,
                fee_margin: matches.value_of_t("fee-margin")?,
            },
            miner,
        })
    }
}

pub fn demo_command() -> Command<'static> {
    ledger_args(
        Command::new("demo")
            .version("0.1")
            .about("Runs the double-spend scenario on the genesis allocation and commits a block."),
    )
    .arg(
        Arg::new("miner")
            .long("miner")
            .value_name("NAME")
            .help("Recipient of the fees of the committed block.")
            .takes_value(true)
            .default_value("Miner"),
    )
}

/// Runs the demo and returns the final ledger.
pub fn run_demo(params: LedgerParams, miner: &Address) -> Result<Ledger, Box<dyn Error>> {
    let mut ledger = Ledger::with_default_genesis(params);
    let scenario = DoubleSpendScenario::new()?;
    let outcome = scenario.run(&mut ledger);
    match &outcome.first {
        Ok(fee) => println!("TX1: Transaction valid! Fee: {}", fee),
        Err(e) => println!("TX1: Transaction rejected: {}", e),
    }
    match &outcome.second {
        Ok(fee) => println!("TX2: Transaction valid! Fee: {}", fee),
        Err(e) => println!("TX2: Transaction rejected: {}", e),
    }

    let block = ledger.commit(miner);
    println!("Block mined successfully! {}", block);
    println!("UTXO Set:");
    for (outpoint, entry) in ledger.utxo_set().iter() {
        println!("{} -> {}", outpoint, entry);
    }
    Ok(ledger)
}

pub fn run_demo_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = DemoCliOptions::parse(matches)?;
    run_demo(options.params, &options.miner)?;
    Ok(())
}
