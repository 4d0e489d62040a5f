mod common;

use std::fs;

use common::*;
use fs_txn::fs::{FileManager, ManagerState};
use fs_txn::TxnError;
use fs_txn::txn::{Enlistment, Transaction};
use tempfile::TempDir;

#[test]
fn test_commit_deletes_file() {
    let temp = TempDir::new().unwrap();
    let path = existing_file(temp.path(), "doomed.txt", EXISTING);

    let mut manager = FileManager::delete(&path).unwrap();

    {
        let mut txn = Transaction::new();
        manager.enlist(&mut txn).unwrap();
        txn.complete().unwrap();
    }

    assert_eq!(manager.state(), ManagerState::Committed);
    assert!(!path.exists());
}

#[test]
fn test_forced_abort_keeps_file() {
    let temp = TempDir::new().unwrap();
    let path = existing_file(temp.path(), "kept.txt", EXISTING);

    let mut manager = FileManager::delete(&path).unwrap();
    let mut forcing = forcing_rollback(temp.path());

    let result = {
        let mut txn = Transaction::new();
        manager.enlist(&mut txn).unwrap();
        forcing.enlist(&mut txn).unwrap();
        txn.complete()
    };

    assert_aborted_with(&result.unwrap_err(), "Voting for a rollback.");
    assert_eq!(fs::read(&path).unwrap(), EXISTING);
}

#[test]
fn test_missing_file_aborts() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.txt");

    let mut manager = FileManager::delete(&path).unwrap();

    let result = {
        let mut txn = Transaction::new();
        manager.enlist(&mut txn).unwrap();
        txn.complete()
    };

    assert!(result.unwrap_err().abort_cause().unwrap().is_not_found());
    assert!(!path.exists());
}

#[test]
fn test_locked_file_aborts() {
    let temp = TempDir::new().unwrap();
    let path = existing_file(temp.path(), "locked.txt", EXISTING);
    let held = lock_file(&path);

    let mut manager = FileManager::delete(&path).unwrap();

    let result = {
        let mut txn = Transaction::new();
        manager.enlist(&mut txn).unwrap();
        txn.complete()
    };

    assert!(result.is_err());
    drop(held);
    assert!(path.exists());
}

#[test]
fn test_dispose_after_commit() {
    let temp = TempDir::new().unwrap();
    let path = existing_file(temp.path(), "doomed.txt", EXISTING);

    let mut manager = FileManager::delete(&path).unwrap();

    {
        let mut txn = Transaction::new();
        manager.enlist(&mut txn).unwrap();
        txn.complete().unwrap();
    }

    manager.dispose();
    manager.dispose();
    assert!(manager.is_disposed());
}

#[test]
fn test_disposed_manager_never_deletes() {
    let temp = TempDir::new().unwrap();
    let path = existing_file(temp.path(), "kept.txt", EXISTING);

    let mut manager = FileManager::delete(&path).unwrap();
    manager.dispose();

    {
        let mut txn = Transaction::new();
        let err = manager.enlist(&mut txn).unwrap_err();
        assert!(matches!(err, TxnError::Disposed(_)));
        txn.complete().unwrap();
    }

    assert!(matches!(manager.commit(), Err(TxnError::Disposed(_))));
    assert!(manager.is_disposed());
    assert_eq!(manager.state(), ManagerState::Disposed);
    assert_eq!(fs::read(&path).unwrap(), EXISTING);
}
