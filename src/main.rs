use clap::Command;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    utxosim_lib::init_logger();
    let matches = Command::new("utxosim")
        .about("UTXO ledger simulator with a mempool and a block committer.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(utxosim_lib::commands::shell_command())
        .subcommand(utxosim_lib::commands::demo_command())
        .get_matches();

    if let Some(matches) = matches.subcommand_matches("shell") {
        utxosim_lib::commands::run_shell_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("demo") {
        utxosim_lib::commands::run_demo_command(matches)
    } else {
        Err("Should report help.".into())
    }
}
