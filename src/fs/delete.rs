//! Strategy removing an existing file at commit.

use super::manager::{FileManager, FileStrategy};
use super::open::{self, ShareMode};
use crate::error::{Result, TxnError};

use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteFile;

impl FileStrategy for DeleteFile {
    fn kind(&self) -> &'static str {
        "Delete"
    }

    fn acquire_handle(&mut self, path: &Path) -> Result<File> {
        // The handle must allow deletion: commit removes the file while holding it
        open::open_existing(path, ShareMode::Delete)
    }

    fn on_commit(&mut self, path: &Path, _handle: Option<&mut File>) -> Result<()> {
        fs::remove_file(path).map_err(|e| {
            TxnError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to delete {}: {}", path.display(), e),
            ))
        })?;

        log::info!("Deleted: {}", path.display());
        Ok(())
    }

    fn on_rollback(&mut self, _path: &Path, _handle: Option<&mut File>) -> Result<()> {
        Ok(())
    }
}

impl FileManager<DeleteFile> {
    /// Manager deleting `managed_path` at commit.
    pub fn delete(managed_path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(managed_path, DeleteFile)
    }
}
