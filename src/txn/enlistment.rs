use crate::error::{Result, TxnError};

/// Outcome of a participant's preparation.
#[derive(Debug)]
pub enum Vote {
    /// Ready to commit; the participant holds whatever it needs to finish.
    Prepared,
    /// Preparation failed; the whole transaction must abort.
    ///
    /// The participant has already compensated its own partial work and
    /// will not receive `rollback`.
    ForceRollback(TxnError),
}

impl Vote {
    pub fn is_prepared(&self) -> bool {
        matches!(self, Vote::Prepared)
    }
}

/// Notifications a coordinator sends to an enlisted participant.
pub trait Enlistment {
    /// Phase one. Called once per transaction.
    fn prepare(&mut self) -> Vote;

    /// Phase two after a unanimous `Prepared`.
    fn commit(&mut self) -> Result<()>;

    /// Phase two after an abort, only for participants that voted `Prepared`.
    fn rollback(&mut self) -> Result<()>;

    /// The final outcome could not be determined.
    fn in_doubt(&mut self) -> Result<()>;

    /// Short human-readable description, used for previews.
    fn describe(&self) -> String {
        String::from("participant")
    }
}
