//! Opening primitives shared by the strategies.
//!
//! Every handle is opened with a share mode and then takes a non-blocking
//! exclusive advisory lock, so two managers can never hold the same path.

use crate::error::{Result, TxnError};

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

/// Access granted to other handles while a manager holds a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    /// No other access at all.
    None,
    /// Others may delete the path, nothing else.
    ///
    /// Needed wherever the manager itself removes the file it holds.
    Delete,
}

impl ShareMode {
    #[cfg(windows)]
    fn bits(self) -> u32 {
        const FILE_SHARE_DELETE: u32 = 0x0000_0004;
        match self {
            ShareMode::None => 0,
            ShareMode::Delete => FILE_SHARE_DELETE,
        }
    }
}

/// Opens an existing file for read/write, failing if absent or locked.
pub(crate) fn open_existing(path: &Path, share: ShareMode) -> Result<File> {
    open_locked(path, OpenOptions::new().read(true).write(true), share).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            TxnError::NotFound(path.to_path_buf())
        } else {
            TxnError::Io(e)
        }
    })
}

/// Creates a file that must not exist yet.
///
/// Losing a creation race surfaces as `AlreadyExists`. If the lock cannot be
/// taken the new file is removed again.
pub(crate) fn create_new(path: &Path, share: ShareMode) -> Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true).create_new(true);
    apply_share(&mut options, share);

    let file = options.open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            TxnError::AlreadyExists(path.to_path_buf())
        } else {
            TxnError::Io(e)
        }
    })?;

    if let Err(e) = lock(&file, path) {
        drop(file);
        if let Err(remove_err) = fs::remove_file(path) {
            log::error!("Failed to remove {}: {}", path.display(), remove_err);
        }
        return Err(TxnError::Io(e));
    }

    Ok(file)
}

fn open_locked(path: &Path, options: &mut OpenOptions, share: ShareMode) -> io::Result<File> {
    apply_share(options, share);
    let file = options.open(path)?;
    lock(&file, path)?;
    Ok(file)
}

fn lock(file: &File, path: &Path) -> io::Result<()> {
    fs2::FileExt::try_lock_exclusive(file).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!(
                "The process cannot access the file '{}' because it is being used by another process.",
                path.display()
            ),
        )
    })
}

#[cfg(windows)]
fn apply_share(options: &mut OpenOptions, share: ShareMode) {
    use std::os::windows::fs::OpenOptionsExt;
    options.share_mode(share.bits());
}

#[cfg(not(windows))]
fn apply_share(_options: &mut OpenOptions, _share: ShareMode) {}
