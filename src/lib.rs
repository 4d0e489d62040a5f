#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod error;
pub mod fs;
pub mod txn;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;
    use command::FsTxnCommand;

    let cli = cli::FsTxnCli::parse();
    match cli.command {
        FsTxnCommand::Apply(args) => command::apply::execute(args),
    }
}
