//! Shared participant driver for file managers.
//!
//! `FileManager` owns the managed path, the open handle and the lifecycle
//! state, and answers the coordinator's notifications. What a manager
//! actually does to the file is decided by its [`FileStrategy`].
//!
//! ## Lifecycle
//!
//! ```text
//! Constructed → Enlisted → Preparing → Prepared → Committed | RolledBack
//!                                    ↘ PrepareFailed
//! any state → Disposed (idempotent, terminal)
//! ```
//!
//! A disposed manager refuses every further notification with `Disposed`.
//!
//! A manager whose preparation fails runs its own rollback reaction before
//! voting, because the coordinator never sends `rollback` to a participant
//! that did not prepare.

use crate::error::{Result, TxnError};
use crate::txn::{Enlistment, Transaction, Vote};

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The file-system work behind a manager.
///
/// Implementations decide how a path is opened and what happens to it on
/// each outcome. The driver stores the handle returned by
/// `acquire_handle` and passes it back to the reactions.
pub trait FileStrategy {
    /// Short label used in logs and previews.
    fn kind(&self) -> &'static str;

    /// Validates preconditions and opens `path`.
    ///
    /// Any error forces the whole transaction to abort.
    fn acquire_handle(&mut self, path: &Path) -> Result<File>;

    /// Applies the mutation of a successful transaction.
    fn on_commit(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()>;

    /// Compensates for an aborted transaction.
    ///
    /// Also runs after a failed `acquire_handle`, in which case `handle`
    /// is `None`.
    fn on_rollback(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()>;

    /// Hook for an undetermined outcome.
    fn on_in_doubt(&mut self, _path: &Path) {}
}

/// Returns the handle a reaction needs, or an error naming the path.
pub fn require_handle<'h>(handle: Option<&'h mut File>, path: &Path) -> Result<&'h mut File> {
    handle.ok_or_else(|| {
        TxnError::Other(anyhow::anyhow!(
            "No handle held for {}",
            path.display()
        ))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    Constructed,
    Enlisted,
    Preparing,
    Prepared,
    PrepareFailed,
    Committed,
    RolledBack,
    Disposed,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManagerState::Constructed => write!(f, "constructed"),
            ManagerState::Enlisted => write!(f, "enlisted"),
            ManagerState::Preparing => write!(f, "preparing"),
            ManagerState::Prepared => write!(f, "prepared"),
            ManagerState::PrepareFailed => write!(f, "prepare-failed"),
            ManagerState::Committed => write!(f, "committed"),
            ManagerState::RolledBack => write!(f, "rolled-back"),
            ManagerState::Disposed => write!(f, "disposed"),
        }
    }
}

/// A file participant in a two-phase commit.
///
/// Dropping the manager disposes it.
pub struct FileManager<S> {
    managed_path: PathBuf,
    handle: Option<File>,
    state: ManagerState,
    strategy: S,
}

/// Rejects an empty path, the only way a path can be missing here.
pub(crate) fn require_path(path: PathBuf, name: &'static str) -> Result<PathBuf> {
    if path.as_os_str().is_empty() {
        return Err(TxnError::EmptyPath { name });
    }
    Ok(path)
}

impl<S> FileManager<S> {
    pub fn managed_path(&self) -> &Path {
        &self.managed_path
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn is_disposed(&self) -> bool {
        self.state == ManagerState::Disposed
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Returns the open handle, if preparation obtained one.
    ///
    /// Fails with `Disposed` once the manager has been disposed.
    pub fn handle(&self) -> Result<Option<&File>> {
        self.ensure_not_disposed()?;
        Ok(self.handle.as_ref())
    }

    pub fn handle_mut(&mut self) -> Result<Option<&mut File>> {
        self.ensure_not_disposed()?;
        Ok(self.handle.as_mut())
    }

    /// Releases the handle if held. Safe to call any number of times.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }

        self.release_handle();
        self.state = ManagerState::Disposed;
        log::debug!("Disposed: {}", self.managed_path.display());
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.is_disposed() {
            return Err(TxnError::Disposed(self.managed_path.display().to_string()));
        }
        Ok(())
    }

    fn release_handle(&mut self) {
        // Closing the file also drops its advisory lock
        self.handle = None;
    }
}

impl<S: FileStrategy> FileManager<S> {
    /// Creates a manager for `managed_path`.
    ///
    /// Fails with `EmptyPath` if the path is empty.
    pub fn new(managed_path: impl Into<PathBuf>, strategy: S) -> Result<Self> {
        let managed_path = require_path(managed_path.into(), "managed_path")?;

        Ok(Self {
            managed_path,
            handle: None,
            state: ManagerState::Constructed,
            strategy,
        })
    }

    /// Registers this manager with `txn`.
    ///
    /// Fails with `Disposed` on a disposed manager, and with
    /// `NoActiveTransaction` if `txn` already completed or aborted.
    /// The manager stays borrowed until the transaction is dropped.
    pub fn enlist<'a>(&'a mut self, txn: &mut Transaction<'a>) -> Result<()>
    where
        S: 'a,
    {
        self.ensure_not_disposed()?;

        if !txn.is_active() {
            return Err(TxnError::NoActiveTransaction {
                path: self.managed_path.display().to_string(),
            });
        }

        self.state = ManagerState::Enlisted;
        txn.enlist_volatile(self)
    }
}

impl<S: FileStrategy> Enlistment for FileManager<S> {
    fn prepare(&mut self) -> Vote {
        log::debug!(
            "{}.prepare - {}",
            self.strategy.kind(),
            self.managed_path.display()
        );

        if let Err(e) = self.ensure_not_disposed() {
            self.state = ManagerState::PrepareFailed;
            return Vote::ForceRollback(e);
        }

        self.state = ManagerState::Preparing;

        match self.strategy.acquire_handle(&self.managed_path) {
            Ok(file) => {
                self.handle = Some(file);
                self.state = ManagerState::Prepared;
                Vote::Prepared
            }
            Err(e) => {
                log::warn!(
                    "{}.prepare failed - {}: {}",
                    self.strategy.kind(),
                    self.managed_path.display(),
                    e
                );

                // No rollback notification follows a failed vote
                if let Err(rollback_err) = self
                    .strategy
                    .on_rollback(&self.managed_path, self.handle.as_mut())
                {
                    log::error!(
                        "Compensation failed for {}: {}",
                        self.managed_path.display(),
                        rollback_err
                    );
                }

                self.state = ManagerState::PrepareFailed;
                Vote::ForceRollback(e)
            }
        }
    }

    fn commit(&mut self) -> Result<()> {
        log::debug!(
            "{}.commit - {}",
            self.strategy.kind(),
            self.managed_path.display()
        );
        self.ensure_not_disposed()?;

        let result = self
            .strategy
            .on_commit(&self.managed_path, self.handle.as_mut());
        self.release_handle();
        self.state = ManagerState::Committed;
        result
    }

    fn rollback(&mut self) -> Result<()> {
        log::debug!(
            "{}.rollback - {}",
            self.strategy.kind(),
            self.managed_path.display()
        );
        self.ensure_not_disposed()?;

        let result = self
            .strategy
            .on_rollback(&self.managed_path, self.handle.as_mut());
        self.release_handle();
        self.state = ManagerState::RolledBack;
        result
    }

    fn in_doubt(&mut self) -> Result<()> {
        log::debug!(
            "{}.in_doubt - {}",
            self.strategy.kind(),
            self.managed_path.display()
        );
        self.ensure_not_disposed()?;

        self.strategy.on_in_doubt(&self.managed_path);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}: {}", self.strategy.kind(), self.managed_path.display())
    }
}

impl<S> Drop for FileManager<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
