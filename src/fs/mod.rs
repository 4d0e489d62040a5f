//! File resource managers with two-phase commit support.
//!
//! Each manager owns one path and joins a [`Transaction`](crate::txn::Transaction)
//! as a participant. The shared [`FileManager`] driver runs the protocol and
//! delegates the file-system work to a [`FileStrategy`].

pub mod copy;
pub mod create;
pub mod delete;
pub mod edit;
pub mod manager;
mod open;

pub use copy::CopyFile;
pub use create::CreateFile;
pub use delete::DeleteFile;
pub use edit::{EditAction, EditFile};
pub use manager::{FileManager, FileStrategy, ManagerState, require_handle};
pub use open::ShareMode;

/// Manager producing a file, optionally over an existing one.
pub type CreateManager = FileManager<CreateFile>;
/// Manager mutating an existing file under an exclusive lock.
pub type EditManager = FileManager<EditFile>;
/// Manager removing an existing file at commit.
pub type DeleteManager = FileManager<DeleteFile>;
/// Manager copying a source file over its managed path.
pub type CopyManager = FileManager<CopyFile>;
