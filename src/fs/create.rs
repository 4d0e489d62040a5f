//! Strategy producing a file at the managed path.
//!
//! An existing file is only replaced when overwriting is allowed. Its bytes
//! are snapshotted before truncation so a rollback can put them back.
//! The snapshot lives in memory, so restoring very large files costs as
//! much memory as the file itself.

use super::manager::{FileManager, FileStrategy, require_handle};
use super::open::{self, ShareMode};
use crate::error::{Result, TxnError};

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct CreateFile {
    can_overwrite: bool,
    file_already_existed: bool,
    original_content: Option<Vec<u8>>,
    content: Option<Vec<u8>>,
}

impl CreateFile {
    /// Creates an empty file on commit.
    pub fn new(can_overwrite: bool) -> Self {
        Self {
            can_overwrite,
            ..Self::default()
        }
    }

    /// Writes `content` through the handle on commit.
    pub fn with_content(can_overwrite: bool, content: impl Into<Vec<u8>>) -> Self {
        Self {
            can_overwrite,
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn can_overwrite(&self) -> bool {
        self.can_overwrite
    }

    /// Whether the managed file existed when preparation started.
    pub fn file_already_existed(&self) -> bool {
        self.file_already_existed
    }

    /// Bytes of the replaced file, kept only when it existed and may be overwritten.
    pub fn original_content(&self) -> Option<&[u8]> {
        self.original_content.as_deref()
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// Writes `bytes` as the full content of `file`.
    pub(crate) fn write_all_content(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(())
    }
}

impl FileStrategy for CreateFile {
    fn kind(&self) -> &'static str {
        "Create"
    }

    fn acquire_handle(&mut self, path: &Path) -> Result<File> {
        self.file_already_existed = path.exists();
        self.original_content = None;

        if !self.file_already_existed {
            return open::create_new(path, ShareMode::Delete);
        }

        if !self.can_overwrite {
            return Err(TxnError::AlreadyExists(path.to_path_buf()));
        }

        let mut file = open::open_existing(path, ShareMode::Delete)?;

        // Snapshot under the lock, then truncate
        let mut original = Vec::new();
        file.read_to_end(&mut original)?;
        log::debug!(
            "Saved {} bytes of {} for rollback",
            original.len(),
            path.display()
        );
        self.original_content = Some(original);

        // Truncate last so any failure above leaves the file intact
        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        Ok(file)
    }

    fn on_commit(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()> {
        if let Some(content) = &self.content {
            let file = require_handle(handle, path)?;
            Self::write_all_content(file, content)?;
        }

        log::info!("Created: {}", path.display());
        Ok(())
    }

    fn on_rollback(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()> {
        let Some(file) = handle else {
            return Ok(());
        };

        if !self.file_already_existed {
            fs::remove_file(path).map_err(|e| {
                TxnError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to remove {}: {}", path.display(), e),
                ))
            })?;
            log::info!("Removed: {}", path.display());
        } else if let Some(original) = &self.original_content {
            Self::write_all_content(file, original)?;
            log::info!("Restored: {}", path.display());
        }

        Ok(())
    }
}

impl FileManager<CreateFile> {
    /// Manager creating an empty file at `managed_path`.
    pub fn create(managed_path: impl Into<PathBuf>, can_overwrite: bool) -> Result<Self> {
        Self::new(managed_path, CreateFile::new(can_overwrite))
    }

    /// Manager creating `managed_path` with `content`.
    pub fn create_with_content(
        managed_path: impl Into<PathBuf>,
        can_overwrite: bool,
        content: impl Into<Vec<u8>>,
    ) -> Result<Self> {
        Self::new(managed_path, CreateFile::with_content(can_overwrite, content))
    }
}
