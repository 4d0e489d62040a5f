use clap::Parser;

use crate::command::FsTxnCommand;

#[derive(Parser)]
#[command(name = "fs-txn", version, about)]
pub struct FsTxnCli {
    #[command(subcommand)]
    pub command: FsTxnCommand,
}
