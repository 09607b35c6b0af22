//! This module provides the `CheckpointStore` struct, responsible for naming, loading and
//! atomically replacing checkpoint files in a directory.

use crate::batch::Batch;
use crate::types::BeaverError;
use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The extension of checkpoint files.
pub const CHECKPOINT_EXTENSION: &str = "txt";
/// The suffix appended to a checkpoint file name while it is being written.
pub const STAGING_SUFFIX: char = '~';

/// A batch written to its staging file but not yet visible under its checkpoint name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedBatch {
    /// The fully written staging file.
    pub staging: PathBuf,
    /// The checkpoint file the staging file replaces on commit.
    pub target: PathBuf,
}

/// `CheckpointStore` reads and writes the checkpoint files of one directory.
///
/// The batch at cursor `c` lives in `<c>.txt`. A new version is first written in full to
/// a staging file `<n>.txt~`, where `n` is the cursor the loop continues with, and then
/// renamed over `<c>.txt`. Readers therefore only ever observe a complete batch.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    directory: PathBuf,
}

impl CheckpointStore {
    /// Creates a store over `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Returns the directory holding the checkpoint files.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the checkpoint file of the batch at `cursor`.
    pub fn path(&self, cursor: u64) -> PathBuf {
        self.directory.join(format!("{}.{}", cursor, CHECKPOINT_EXTENSION))
    }

    /// Returns the staging file used while the loop moves on to `next_cursor`.
    pub fn staging_path(&self, next_cursor: u64) -> PathBuf {
        self.directory.join(format!(
            "{}.{}{}",
            next_cursor, CHECKPOINT_EXTENSION, STAGING_SUFFIX
        ))
    }

    /// Loads the batch at `cursor`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Batch))` if the checkpoint file exists and holds `size` valid machines.
    /// * `Ok(None)` if there is no checkpoint file yet.
    /// * `Err(BeaverError::Checkpoint)` if the file is truncated or holds a malformed line.
    /// * `Err(BeaverError::FileError)` if the file exists but cannot be read.
    pub fn load(&self, cursor: u64, size: usize) -> Result<Option<Batch>, BeaverError> {
        let path = self.path(cursor);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no checkpoint file");
                return Ok(None);
            }
            Err(e) => {
                return Err(BeaverError::FileError(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let batch = Batch::decode(cursor, &content, size).map_err(|e| BeaverError::Checkpoint {
            path: path.clone(),
            source: Box::new(e),
        })?;

        debug!(path = %path.display(), machines = batch.len(), "loaded checkpoint");
        Ok(Some(batch))
    }

    /// Writes `batch` to its staging file and flushes it to disk.
    ///
    /// The checkpoint file of the batch is left untouched until [`CheckpointStore::commit`].
    pub fn stage(&self, batch: &Batch, next_cursor: u64) -> Result<StagedBatch, BeaverError> {
        let staging = self.staging_path(next_cursor);
        let target = self.path(batch.cursor());

        write_staged(&staging, |file| file.write_all(batch.encode().as_bytes())).map_err(|e| {
            BeaverError::FileError(format!(
                "Failed to write file {}: {}",
                staging.display(),
                e
            ))
        })?;

        debug!(staging = %staging.display(), "staged checkpoint");
        Ok(StagedBatch { staging, target })
    }

    /// Replaces the checkpoint file with its staging file in a single rename.
    ///
    /// # Returns
    ///
    /// * The path of the checkpoint file now holding the new batch.
    pub fn commit(&self, staged: StagedBatch) -> Result<PathBuf, BeaverError> {
        fs::rename(&staged.staging, &staged.target).map_err(|e| {
            BeaverError::FileError(format!(
                "Failed to rename {} to {}: {}",
                staged.staging.display(),
                staged.target.display(),
                e
            ))
        })?;

        debug!(path = %staged.target.display(), "committed checkpoint");
        Ok(staged.target)
    }

    /// Stages and commits `batch`.
    pub fn persist(&self, batch: &Batch, next_cursor: u64) -> Result<PathBuf, BeaverError> {
        let staged = self.stage(batch, next_cursor)?;
        self.commit(staged)
    }
}

/// Creates `path`, fills it with `write` and syncs it to disk.
///
/// On failure the partially written file is removed so no stale staging file remains.
fn write_staged<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let result = File::create(path).and_then(|mut file| {
        write(&mut file)?;
        file.sync_all()
    });

    if result.is_err() {
        if let Err(e) = fs::remove_file(path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "failed to remove staging file");
            }
        }
    }

    result
}
