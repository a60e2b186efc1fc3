//! File-backed record persistence.
//!
//! RULE: Only store.rs touches the filesystem.
//! The sync engine calls RecordStore methods; nothing else reads or
//! writes save records directly.
//!
//! There is no caching layer: every read and write round-trips through
//! disk, so the temp record always matches what the next process launch
//! will see.

use crate::error::{SaveError, SaveResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Names one persisted save record. Each key maps to at most one file
/// under the store root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKey {
    /// Data the player explicitly committed with a real save.
    Permanent,
    /// Data carried scene to scene since the last real save.
    Temp,
}

impl RecordKey {
    /// On-disk file name for this record.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Permanent => "PermaSaveData.dat",
            Self::Temp      => "TempSaveData.dat",
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permanent => write!(f, "permanent"),
            Self::Temp      => write!(f, "temp"),
        }
    }
}

pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> SaveResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Where this store keeps its records.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn record_path(&self, key: RecordKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Whether a record is present on disk right now.
    pub fn exists(&self, key: RecordKey) -> bool {
        self.record_path(key).exists()
    }

    /// Allocate an empty record. Fails if one is already present.
    pub fn create(&self, key: RecordKey) -> SaveResult<()> {
        let path = self.record_path(key);
        if path.exists() {
            return Err(SaveError::AlreadyExists(key));
        }
        fs::File::create(&path)?;
        log::debug!("created record '{key}' at {}", path.display());
        Ok(())
    }

    /// Read a record's full contents. Fails if absent.
    pub fn read(&self, key: RecordKey) -> SaveResult<Vec<u8>> {
        let path = self.record_path(key);
        if !path.exists() {
            return Err(SaveError::NotFound(key));
        }
        Ok(fs::read(&path)?)
    }

    /// Overwrite a record's contents. Fails if the record was never created.
    pub fn write(&self, key: RecordKey, bytes: &[u8]) -> SaveResult<()> {
        let path = self.record_path(key);
        if !path.exists() {
            return Err(SaveError::NotFound(key));
        }
        fs::write(&path, bytes)?;
        log::debug!("wrote {} bytes to record '{key}'", bytes.len());
        Ok(())
    }

    /// Remove a record. Succeeds even when none is present.
    pub fn delete(&self, key: RecordKey) -> SaveResult<()> {
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => {
                log::debug!("deleted record '{key}'");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
