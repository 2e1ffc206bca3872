use crate::genesis::default_allocation;
use crate::{Coin, CoinbasePolicy, Ledger, LedgerParams, MempoolParams, Shell};
use clap::{Arg, ArgMatches, Command};
use log::info;
use std::error::Error;
use std::io;

struct ShellCliOptions {
    params: LedgerParams,
    no_genesis: bool,
}

impl ShellCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let params = LedgerParams {
            mempool: MempoolParams {
                max_size: matches.value_of_t("mempool-size")?,
            },
            batch_size: matches.value_of_t("batch-size")?,
            coinbase_policy: matches.value_of_t::<CoinbasePolicy>("coinbase")?,
            fee_margin: matches.value_of_t::<Coin>("fee-margin")?,
        };
        Ok(Self {
            params,
            no_genesis: matches.is_present("no-genesis"),
        })
    }
}

/// Arguments shared by the subcommands that create a ledger.
pub(crate) fn ledger_args(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .value_name("N")
                .help("The maximum number of transactions committed by a single block.")
                .takes_value(true)
                .default_value("5"),
        )
        .arg(
            Arg::new("mempool-size")
                .long("mempool-size")
                .value_name("N")
                .help("The maximum number of pending transactions.")
                .takes_value(true)
                .default_value("50"),
        )
        .arg(
            Arg::new("coinbase")
                .long("coinbase")
                .value_name("fixed|per-height")
                .help("Where miner rewards are stored: always at coinbase:0, or at coinbase-<height>:0.")
                .takes_value(true)
                .default_value("fixed"),
        )
        .arg(
            Arg::new("fee-margin")
                .long("fee-margin")
                .value_name("AMOUNT")
                .help("Fee paid by transactions created from the menu.")
                .takes_value(true)
                .default_value("0.001"),
        )
}

pub fn shell_command() -> Command<'static> {
    ledger_args(
        Command::new("shell")
            .version("0.1")
            .about("Interactive menu to create, stage and commit transactions."),
    )
    .arg(
        Arg::new("no-genesis")
            .long("no-genesis")
            .help("Starts with an empty UTXO set.")
            .takes_value(false),
    )
}

pub fn run_shell_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = ShellCliOptions::parse(matches)?;
    info!("Starting the shell with: {:?}", options.params);
    let (ledger, genesis) = if options.no_genesis {
        (Ledger::new(options.params), vec![])
    } else {
        let genesis = default_allocation();
        let mut ledger = Ledger::new(options.params);
        ledger.seed_genesis(&genesis);
        (ledger, genesis)
    };
    let stdin = io::stdin();
    let mut shell = Shell::new(ledger, genesis, stdin.lock(), io::stdout());
    shell.run()?;
    Ok(())
}
