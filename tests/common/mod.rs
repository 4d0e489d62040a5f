//! Shared helpers for the integration tests.
//!
//! Tests build real files in a `TempDir` and drive managers through a
//! `Transaction`, asserting on the bytes left on disk.

use assert_cmd::cargo::cargo_bin_cmd;
use fs_txn::TxnError;
use fs_txn::fs::{FileManager, FileStrategy};
use std::cell::Cell;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const EXISTING: &[u8] = b"existing-file";

/// Strategy that prepares by opening the file but cannot undo anything.
#[allow(unused)]
pub struct BrokenRollback;

impl FileStrategy for BrokenRollback {
    fn kind(&self) -> &'static str {
        "BrokenRollback"
    }

    fn acquire_handle(&mut self, path: &Path) -> fs_txn::Result<File> {
        Ok(File::open(path)?)
    }

    fn on_commit(&mut self, _path: &Path, _handle: Option<&mut File>) -> fs_txn::Result<()> {
        Ok(())
    }

    fn on_rollback(&mut self, _path: &Path, _handle: Option<&mut File>) -> fs_txn::Result<()> {
        Err(TxnError::Other(anyhow::anyhow!("rollback broke")))
    }
}

/// Strategy that always refuses to prepare, forcing an abort.
#[allow(unused)]
#[derive(Default)]
pub struct VoteRollback {
    pub rollbacks: Rc<Cell<usize>>,
}

impl FileStrategy for VoteRollback {
    fn kind(&self) -> &'static str {
        "VoteRollback"
    }

    fn acquire_handle(&mut self, _path: &Path) -> fs_txn::Result<File> {
        Err(TxnError::Other(anyhow::anyhow!("Voting for a rollback.")))
    }

    fn on_commit(&mut self, _path: &Path, _handle: Option<&mut File>) -> fs_txn::Result<()> {
        panic!("a manager that never prepared was asked to commit");
    }

    fn on_rollback(&mut self, _path: &Path, _handle: Option<&mut File>) -> fs_txn::Result<()> {
        self.rollbacks.set(self.rollbacks.get() + 1);
        Ok(())
    }
}

/// Manager that forces the transaction it joins to abort.
#[allow(unused)]
pub fn forcing_rollback(dir: &Path) -> FileManager<VoteRollback> {
    FileManager::new(dir.join("forcing-rollback.txt"), VoteRollback::default()).unwrap()
}

/// Writes `content` to `dir/name` and returns the path.
#[allow(unused)]
pub fn existing_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Holds an exclusive advisory lock on `path` until dropped.
#[allow(unused)]
pub fn lock_file(path: &Path) -> File {
    let file = File::open(path).unwrap();
    fs2::FileExt::try_lock_exclusive(&file).unwrap();
    file
}

/// Asserts the error is an abort whose cause matches `expected`.
#[allow(unused)]
pub fn assert_aborted_with(err: &TxnError, expected: &str) {
    assert_eq!(err.to_string(), "The transaction has aborted.");
    let cause = err.abort_cause().expect("abort carries its cause");
    assert!(
        cause.to_string().contains(expected),
        "Expected cause containing '{}', got '{}'",
        expected,
        cause
    );
}

/// Helper to run an `apply` command in `dir`
#[allow(unused)]
pub fn run_apply(dir: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = cargo_bin_cmd!("fs-txn");
    cmd.arg("apply").args(args).current_dir(dir);

    cmd.assert()
}
