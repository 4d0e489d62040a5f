pub mod apply;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum FsTxnCommand {
    /// Apply file operations as one all-or-nothing transaction.
    ///
    /// Operations are enlisted grouped by kind, not in command-line order:
    /// creates, writes, replaces, copies, then deletes.
    #[command(verbatim_doc_comment)]
    Apply(apply::ApplyArgs),
}
