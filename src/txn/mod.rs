//! In-process coordinator for volatile two-phase commit.
//!
//! Participants implement [`Enlistment`] and are registered with a
//! [`Transaction`], which drives the prepare and commit/rollback phases.

pub mod enlistment;
pub mod transaction;

pub use enlistment::{Enlistment, Vote};
pub use transaction::{Transaction, TransactionState};
