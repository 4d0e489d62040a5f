//! Volatile two-phase commit coordinator.
//!
//! Holds borrowed participants for the lifetime of the transaction and
//! drives them through the protocol when completed.
//!
//! ## Phases
//!
//! 1. **Enlist**: Register participants via `enlist_volatile()`
//! 2. **Prepare**: Ask each participant for its vote, stopping at the first
//!    forced rollback
//! 3. **Commit** (unanimous): Notify every participant
//! 4. **Rollback** (on abort): Notify only participants that voted `Prepared`
//!
//! Nothing is persisted: a process crash between phases leaves the file
//! system as the participants last touched it.
//!
//! ## Example
//!
//! ```no_run
//! # use fs_txn::fs::FileManager;
//! # use fs_txn::txn::Transaction;
//! # fn example() -> fs_txn::error::Result<()> {
//! let mut copy = FileManager::copy("report.txt", "backup/report.txt", true)?;
//! let mut delete = FileManager::delete("report.tmp")?;
//!
//! let mut txn = Transaction::new();
//! copy.enlist(&mut txn)?;
//! delete.enlist(&mut txn)?;
//!
//! txn.complete()?; // Both applied, or neither
//! drop(txn);
//! # Ok(())
//! # }
//! ```

use super::enlistment::{Enlistment, Vote};
use crate::error::{Result, TxnError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Accepting enlistments.
    Active,
    /// All participants prepared and were told to commit.
    Committed,
    /// Completion was refused or a participant forced a rollback.
    Aborted,
}

/// Transaction coordinating enlisted participants.
///
/// Must be explicitly completed. If dropped while active, logs a warning
/// but notifies no participant, since none was prepared. Once completed or
/// aborted, further enlistments fail with `NoActiveTransaction`.
#[must_use = "Transaction must be completed or aborted"]
pub struct Transaction<'a> {
    participants: Vec<&'a mut dyn Enlistment>,
    state: TransactionState,
}

impl Default for Transaction<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Transaction<'a> {
    pub fn new() -> Self {
        Self {
            participants: Vec::new(),
            state: TransactionState::Active,
        }
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Returns true while enlistments are accepted.
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Registers a participant for the remainder of the transaction.
    pub fn enlist_volatile(&mut self, participant: &'a mut dyn Enlistment) -> Result<()> {
        if !self.is_active() {
            return Err(TxnError::NoActiveTransaction {
                path: participant.describe(),
            });
        }

        log::debug!("Enlisted: {}", participant.describe());
        self.participants.push(participant);
        Ok(())
    }

    /// Returns a human-readable preview of the enlisted participants.
    pub fn preview(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.describe()).collect()
    }

    /// Runs both phases of the protocol.
    ///
    /// Returns `TransactionAborted` carrying the cause when a participant
    /// votes to roll back, or `RollbackFailed` carrying the same cause when
    /// a prepared participant then fails to roll back. Errors raised by
    /// participants during phase two are collected and reported, not retried.
    ///
    /// Takes `&mut self` so the outcome stays observable through `state()`;
    /// participants stay borrowed until the transaction is dropped.
    pub fn complete(&mut self) -> Result<()> {
        if self.state != TransactionState::Active {
            return Err(TxnError::Other(anyhow::anyhow!(
                "Transaction already completed"
            )));
        }

        let mut participants = std::mem::take(&mut self.participants);

        log::debug!("Preparing {} participants", participants.len());

        let mut prepared = 0;
        let mut abort_cause = None;

        for participant in participants.iter_mut() {
            match participant.prepare() {
                Vote::Prepared => prepared += 1,
                Vote::ForceRollback(cause) => {
                    log::warn!("{} forced a rollback: {}", participant.describe(), cause);
                    abort_cause = Some(cause);
                    break;
                }
            }
        }

        if let Some(cause) = abort_cause {
            self.state = TransactionState::Aborted;
            let source = Box::new(cause);
            return Err(match Self::rollback_prepared(&mut participants[..prepared]) {
                Ok(()) => TxnError::TransactionAborted { source },
                Err(errors) => TxnError::RollbackFailed { errors, source },
            });
        }

        self.state = TransactionState::Committed;

        let mut errors = Vec::new();
        for participant in participants.iter_mut() {
            if let Err(e) = participant.commit() {
                errors.push(format!("{}: {}", participant.describe(), e));
            }
        }

        if errors.is_empty() {
            log::info!("Transaction committed ({} participants)", participants.len());
            Ok(())
        } else {
            Err(TxnError::CommitFailed(errors.join("; ")))
        }
    }

    /// Abandons the transaction before preparation.
    ///
    /// No participant has prepared, so none is notified.
    pub fn abort(&mut self) {
        if self.state != TransactionState::Active {
            return;
        }

        log::info!(
            "Transaction aborted before preparation ({} participants)",
            self.participants.len()
        );
        self.participants.clear();
        self.state = TransactionState::Aborted;
    }

    /// Rolls back every prepared participant, returning the joined failures.
    fn rollback_prepared(
        prepared: &mut [&'a mut dyn Enlistment],
    ) -> std::result::Result<(), String> {
        let mut errors = Vec::new();

        for participant in prepared.iter_mut() {
            if let Err(e) = participant.rollback() {
                errors.push(format!("{}: {}", participant.describe(), e));
            }
        }

        if errors.is_empty() {
            log::info!("Rollback completed");
            Ok(())
        } else {
            Err(errors.join("; "))
        }
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.state == TransactionState::Active && !self.participants.is_empty() {
            log::warn!("Transaction dropped without completion");
        }
    }
}
