use crate::error::{Result, TxnError};
use crate::fs::FileManager;
use crate::txn::Transaction;

use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[clap(verbatim_doc_comment)]
pub struct ApplyArgs {
    /// Create an empty file
    #[arg(long, value_name = "PATH")]
    pub create: Vec<PathBuf>,

    /// Create a file with the given text
    ///
    /// Example:
    ///   --write notes.txt=hello
    #[arg(long, value_name = "PATH=TEXT", value_parser = parse_assignment, verbatim_doc_comment)]
    pub write: Vec<(PathBuf, String)>,

    /// Replace the content of an existing file
    #[arg(long, value_name = "PATH=TEXT", value_parser = parse_assignment)]
    pub replace: Vec<(PathBuf, String)>,

    /// Copy a file
    ///
    /// Example:
    ///   --copy report.txt=backup/report.txt
    #[arg(long, value_name = "SRC=DST", value_parser = parse_copy, verbatim_doc_comment)]
    pub copy: Vec<(PathBuf, PathBuf)>,

    /// Delete an existing file
    #[arg(long, value_name = "PATH")]
    pub delete: Vec<PathBuf>,

    /// Allow created and copied files to replace existing ones
    #[arg(long)]
    pub overwrite: bool,

    /// Show what would change without applying any modifications
    #[arg(long, short = 'n')]
    pub dry_run: bool,
}

impl ApplyArgs {
    /// Total number of requested operations.
    pub fn len(&self) -> usize {
        self.create.len()
            + self.write.len()
            + self.replace.len()
            + self.copy.len()
            + self.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn split_assignment(value: &str) -> std::result::Result<(&str, &str), String> {
    value
        .split_once('=')
        .filter(|(left, _)| !left.is_empty())
        .ok_or_else(|| format!("expected LEFT=RIGHT, got '{}'", value))
}

fn parse_assignment(value: &str) -> std::result::Result<(PathBuf, String), String> {
    let (path, text) = split_assignment(value)?;
    Ok((PathBuf::from(path), text.to_string()))
}

fn parse_copy(value: &str) -> std::result::Result<(PathBuf, PathBuf), String> {
    let (source, dest) = split_assignment(value)?;
    if dest.is_empty() {
        return Err(format!("missing destination in '{}'", value));
    }
    Ok((PathBuf::from(source), PathBuf::from(dest)))
}

pub fn execute(args: ApplyArgs) -> Result<()> {
    if args.is_empty() {
        return Err(TxnError::Other(anyhow::anyhow!(
            "No operations given; see --help"
        )));
    }

    let cwd = std::env::current_dir()?;

    let mut creates = args
        .create
        .iter()
        .map(|path| FileManager::create(path, args.overwrite))
        .collect::<Result<Vec<_>>>()?;
    let mut writes = args
        .write
        .iter()
        .map(|(path, text)| FileManager::create_with_content(path, args.overwrite, text.as_str()))
        .collect::<Result<Vec<_>>>()?;
    let mut replaces = args
        .replace
        .iter()
        .map(|(path, text)| FileManager::replace(path, text.as_str()))
        .collect::<Result<Vec<_>>>()?;
    let mut copies = args
        .copy
        .iter()
        .map(|(source, dest)| FileManager::copy(source, dest, args.overwrite))
        .collect::<Result<Vec<_>>>()?;
    let mut deletes = args
        .delete
        .iter()
        .map(|path| FileManager::delete(path))
        .collect::<Result<Vec<_>>>()?;

    let (plan, result) = {
        let mut txn = Transaction::new();

        for manager in creates.iter_mut() {
            manager.enlist(&mut txn)?;
        }
        for manager in writes.iter_mut() {
            manager.enlist(&mut txn)?;
        }
        for manager in replaces.iter_mut() {
            manager.enlist(&mut txn)?;
        }
        for manager in copies.iter_mut() {
            manager.enlist(&mut txn)?;
        }
        for manager in deletes.iter_mut() {
            manager.enlist(&mut txn)?;
        }

        let plan = txn.preview();
        if args.dry_run {
            txn.abort();
            (plan, Ok(()))
        } else {
            let result = txn.complete();
            (plan, result)
        }
    };

    let states: Vec<String> = creates
        .iter()
        .map(|m| m.state().to_string())
        .chain(writes.iter().map(|m| m.state().to_string()))
        .chain(replaces.iter().map(|m| m.state().to_string()))
        .chain(copies.iter().map(|m| m.state().to_string()))
        .chain(deletes.iter().map(|m| m.state().to_string()))
        .collect();

    // Dispose every manager before reporting
    drop((creates, writes, replaces, copies, deletes));

    print_summary(&plan, &states, args.dry_run, &result, &cwd);
    result
}

/// Prints the outcome of each enlisted operation.
///
/// Paths are relative to `base` with forward slashes.
pub fn print_summary(
    plan: &[String],
    states: &[String],
    dry_run: bool,
    result: &Result<()>,
    base: &Path,
) {
    let display_entry = |entry: &str| -> String {
        match entry.split_once(": ") {
            Some((kind, path)) => {
                let relative = pathdiff::diff_paths(path, base)
                    .unwrap_or_else(|| PathBuf::from(path));
                format!("{}: {}", kind, relative.to_string_lossy().replace('\\', "/"))
            }
            None => entry.to_string(),
        }
    };

    if dry_run {
        println!("\n{}", "DRY RUN - No changes will be made".yellow().bold());
        for entry in plan {
            println!("   • {}", display_entry(entry).dimmed());
        }
        println!(
            "\n{} {} planned. Run without {} to apply.",
            plan.len().to_string().cyan().bold(),
            if plan.len() == 1 {
                "operation"
            } else {
                "operations"
            },
            "--dry-run".cyan()
        );
        return;
    }

    match result {
        Ok(()) => {
            println!("\n{}", "Changes applied:".green().bold());
            for entry in plan {
                println!("   {} {}", "✓".green(), display_entry(entry).dimmed());
            }
            println!(
                "\n{} Successfully completed {} operations",
                "✓".green().bold(),
                plan.len()
            );
        }
        Err(e) => {
            eprintln!("\n{} {}", "Transaction failed:".red().bold(), e);
            if let Some(cause) = e.abort_cause() {
                eprintln!("   {} {}", "Cause:".red(), cause);
            }
            for (entry, state) in plan.iter().zip(states) {
                eprintln!("   {} {} ({})", "✗".red(), display_entry(entry), state);
            }
        }
    }
}
