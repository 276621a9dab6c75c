//! Directory-backed `LocalStore` for desktop and CLI hosts.
//!
//! Each key maps to `<dir>/<hex(key)>.json`. Writes go through a temp file in
//! the same directory and are renamed into place, so readers never observe a
//! half-written record.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::error::StorageError;
use crate::domain::ports::LocalStore;

/// Browser local storage allows roughly 5 MiB per origin.
pub const DEFAULT_VALUE_QUOTA: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    value_quota: usize,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            value_quota: DEFAULT_VALUE_QUOTA,
        }
    }

    #[must_use]
    pub fn with_value_quota(mut self, bytes: usize) -> Self {
        self.value_quota = bytes;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", hex::encode(key)))
    }
}

impl LocalStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if value.len() > self.value_quota {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                limit: self.value_quota,
            });
        }
        if self.dir.is_file() {
            return Err(StorageError::unavailable(format!(
                "{} is not a directory",
                self.dir.display()
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.flush()?;
        tmp.persist(self.path_for(key))
            .map_err(|e| StorageError::Io(e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
