//! Strategy mutating an existing file under an exclusive lock.
//!
//! The new content is produced by a caller-supplied action that runs at
//! commit. Nothing is snapshotted beforehand, so an action that fails
//! halfway leaves the file as it stopped.

use super::create::CreateFile;
use super::manager::{FileManager, FileStrategy, require_handle};
use super::open::{self, ShareMode};
use crate::error::Result;

use std::fmt;
use std::fs::File;
use std::io::{self, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Commit-time edit applied through the manager's handle.
pub type EditAction = Box<dyn FnMut(&mut File) -> io::Result<()>>;

pub struct EditFile {
    action: EditAction,
}

impl fmt::Debug for EditFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditFile").finish_non_exhaustive()
    }
}

impl EditFile {
    /// Runs `action` on the handle, positioned at the start, at commit.
    pub fn new(action: impl FnMut(&mut File) -> io::Result<()> + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }

    /// Replaces the whole content with `content` at commit.
    pub fn replace_with(content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self::new(move |file| CreateFile::write_all_content(file, &content))
    }
}

impl FileStrategy for EditFile {
    fn kind(&self) -> &'static str {
        "Edit"
    }

    fn acquire_handle(&mut self, path: &Path) -> Result<File> {
        open::open_existing(path, ShareMode::None)
    }

    fn on_commit(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()> {
        let file = require_handle(handle, path)?;
        file.seek(SeekFrom::Start(0))?;
        (self.action)(file)?;

        log::info!("Edited: {}", path.display());
        Ok(())
    }

    fn on_rollback(&mut self, _path: &Path, _handle: Option<&mut File>) -> Result<()> {
        // Nothing was touched before commit
        Ok(())
    }
}

impl FileManager<EditFile> {
    /// Manager applying `action` to `managed_path` at commit.
    pub fn edit(
        managed_path: impl Into<PathBuf>,
        action: impl FnMut(&mut File) -> io::Result<()> + 'static,
    ) -> Result<Self> {
        Self::new(managed_path, EditFile::new(action))
    }

    /// Manager replacing the content of `managed_path` at commit.
    pub fn replace(managed_path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Result<Self> {
        Self::new(managed_path, EditFile::replace_with(content))
    }
}
