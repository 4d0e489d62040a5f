//! Error types for fs-txn.
//!
//! All operations return `Result<T>` which aliases `Result<T, TxnError>`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from file managers and the transaction coordinator.
#[derive(Debug, Error)]
pub enum TxnError {
    /// A required path was empty at construction.
    #[error("Value cannot be empty: {name}")]
    EmptyPath { name: &'static str },

    /// Enlistment attempted outside an active transaction.
    #[error("Cannot enlist resource {path}: no ambient transaction detected.")]
    NoActiveTransaction { path: String },

    /// Managed file exists and the manager may not overwrite it.
    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),

    /// Managed file is required but missing.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Handle accessed after the manager was disposed.
    ///
    /// A programming error, never a transaction outcome.
    #[error("Cannot access a disposed object: {0}")]
    Disposed(String),

    /// A participant voted to roll back during preparation.
    #[error("The transaction has aborted.")]
    TransactionAborted {
        #[source]
        source: Box<TxnError>,
    },

    /// One or more participants failed while committing.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// The transaction aborted and one or more prepared participants
    /// failed to roll back. `source` is the error that forced the abort.
    #[error("The transaction has aborted; rollback failed: {errors}")]
    RollbackFailed {
        errors: String,
        #[source]
        source: Box<TxnError>,
    },

    /// File system operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Error raised by a caller-defined strategy.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TxnError {
    /// Returns true for a missing file, whether detected up front or by the OS.
    pub fn is_not_found(&self) -> bool {
        match self {
            TxnError::NotFound(_) => true,
            TxnError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns the error that forced an abort, if this is one.
    pub fn abort_cause(&self) -> Option<&TxnError> {
        match self {
            TxnError::TransactionAborted { source } | TxnError::RollbackFailed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// Result type alias for fs-txn operations.
pub type Result<T> = std::result::Result<T, TxnError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_is_not_found() {
        assert!(TxnError::NotFound(PathBuf::from("a.txt")).is_not_found());
        assert!(TxnError::Io(io::Error::from(io::ErrorKind::NotFound)).is_not_found());
        assert!(!TxnError::AlreadyExists(PathBuf::from("a.txt")).is_not_found());
    }

    #[test]
    fn test_abort_cause_and_message() {
        let err = TxnError::TransactionAborted {
            source: Box::new(TxnError::AlreadyExists(PathBuf::from("a.txt"))),
        };
        assert_eq!(err.to_string(), "The transaction has aborted.");
        assert!(matches!(err.abort_cause(), Some(TxnError::AlreadyExists(_))));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_rollback_failure_keeps_abort_cause() {
        let err = TxnError::RollbackFailed {
            errors: "Create: a.txt: denied".to_string(),
            source: Box::new(TxnError::NotFound(PathBuf::from("b.txt"))),
        };
        assert_eq!(
            err.to_string(),
            "The transaction has aborted; rollback failed: Create: a.txt: denied"
        );
        assert!(err.abort_cause().unwrap().is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_no_active_transaction_message() {
        let err = TxnError::NoActiveTransaction {
            path: "data/file.txt".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot enlist resource data/file.txt: no ambient transaction detected."
        );
    }
}
