//! Strategy copying a source file over the managed path.
//!
//! The source is read whole during preparation; destination handling and
//! rollback are those of [`CreateFile`].

use super::create::CreateFile;
use super::manager::{FileManager, FileStrategy, require_handle, require_path};
use crate::error::Result;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CopyFile {
    source_path: PathBuf,
    source_content: Option<Vec<u8>>,
    create: CreateFile,
}

impl CopyFile {
    /// Fails with `EmptyPath` if `source_path` is empty.
    pub fn new(source_path: impl Into<PathBuf>, can_overwrite: bool) -> Result<Self> {
        Ok(Self {
            source_path: require_path(source_path.into(), "source_path")?,
            source_content: None,
            create: CreateFile::new(can_overwrite),
        })
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Source bytes as read during preparation.
    pub fn source_content(&self) -> Option<&[u8]> {
        self.source_content.as_deref()
    }

    /// Destination-side state shared with plain creation.
    pub fn destination(&self) -> &CreateFile {
        &self.create
    }
}

impl FileStrategy for CopyFile {
    fn kind(&self) -> &'static str {
        "Copy"
    }

    fn acquire_handle(&mut self, path: &Path) -> Result<File> {
        let content = fs::read(&self.source_path)?;
        log::debug!(
            "Read {} bytes from {}",
            content.len(),
            self.source_path.display()
        );
        self.source_content = Some(content);

        self.create.acquire_handle(path)
    }

    fn on_commit(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()> {
        let file = require_handle(handle, path)?;
        let content = self.source_content.as_deref().unwrap_or_default();
        CreateFile::write_all_content(file, content)?;

        log::info!(
            "Copied: {} → {}",
            self.source_path.display(),
            path.display()
        );
        Ok(())
    }

    fn on_rollback(&mut self, path: &Path, handle: Option<&mut File>) -> Result<()> {
        self.create.on_rollback(path, handle)
    }
}

impl FileManager<CopyFile> {
    /// Manager copying `source_path` to `managed_path`.
    pub fn copy(
        source_path: impl Into<PathBuf>,
        managed_path: impl Into<PathBuf>,
        can_overwrite: bool,
    ) -> Result<Self> {
        let managed_path = require_path(managed_path.into(), "managed_path")?;
        Self::new(managed_path, CopyFile::new(source_path, can_overwrite)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxnError;
    use crate::txn::Enlistment;
    use tempfile::TempDir;

    #[test]
    fn test_empty_source_path_fails() {
        let result = FileManager::copy("", "dest.txt", true);
        assert!(matches!(
            result,
            Err(TxnError::EmptyPath {
                name: "source_path"
            })
        ));
    }

    #[test]
    fn test_empty_managed_path_checked_first() {
        let result = FileManager::copy("", "", true);
        assert!(matches!(
            result,
            Err(TxnError::EmptyPath {
                name: "managed_path"
            })
        ));
    }

    #[test]
    fn test_prepare_reads_source() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.bin");
        let dest = temp.path().join("dest.bin");
        fs::write(&source, [0u8, 1, 2, 255]).unwrap();

        let mut manager = FileManager::copy(&source, &dest, false).unwrap();
        assert!(manager.prepare().is_prepared());

        assert_eq!(
            manager.strategy().source_content(),
            Some(&[0u8, 1, 2, 255][..])
        );
        assert!(!manager.strategy().destination().file_already_existed());
    }

    #[test]
    fn test_missing_source_votes_rollback_without_creating_dest() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("missing.bin");
        let dest = temp.path().join("dest.bin");

        let mut manager = FileManager::copy(&source, &dest, true).unwrap();
        let vote = manager.prepare();

        assert!(!vote.is_prepared());
        assert!(!dest.exists());
    }

    #[test]
    fn test_commit_replaces_longer_destination() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source.txt");
        let dest = temp.path().join("dest.txt");
        fs::write(&source, "short").unwrap();
        fs::write(&dest, "a much longer destination body").unwrap();

        let mut manager = FileManager::copy(&source, &dest, true).unwrap();
        manager.prepare();
        manager.commit().unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"short");
    }
}
