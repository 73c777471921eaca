//! # File Store
//!
//! Both storage contracts as two files in one directory. Writes go to a
//! temporary sibling first and are renamed into place, so a crash never
//! leaves a half-written credentials file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{keys, CredentialsStore, SignatureStore};
use crate::error::{Error, Result};
use crate::identity::SignatureRecord;

/// Directory-backed storage
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::StorageWrite(format!("Cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    /// The backing directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn read_file(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageRead(format!("{}: {}", name, e))),
        }
    }

    fn write_file(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let target = self.path(name);
        let tmp = self.path(&format!("{}.tmp", name));

        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(bytes)?;
            file.sync_all()?;
            fs::rename(&tmp, &target)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::StorageWrite(format!("{}: {}", name, e))
        })?;

        tracing::debug!(file = %target.display(), len = bytes.len(), "Wrote store file");
        Ok(())
    }

    fn remove_file(&self, name: &str) -> Result<bool> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::StorageWrite(format!("{}: {}", name, e))),
        }
    }

    fn file_exists(&self, name: &str) -> Result<bool> {
        self.path(name)
            .try_exists()
            .map_err(|e| Error::StorageRead(format!("{}: {}", name, e)))
    }
}

impl CredentialsStore for FileStore {
    fn read_credentials(&self) -> Result<Option<Vec<u8>>> {
        self.read_file(keys::CREDENTIALS)
    }

    fn write_credentials(&self, blob: &[u8]) -> Result<()> {
        self.write_file(keys::CREDENTIALS, blob)
    }

    fn delete_credentials(&self) -> Result<bool> {
        self.remove_file(keys::CREDENTIALS)
    }

    fn credentials_exist(&self) -> Result<bool> {
        self.file_exists(keys::CREDENTIALS)
    }
}

impl SignatureStore for FileStore {
    fn write_signature(&self, record: &SignatureRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        self.write_file(keys::SIGNATURE, &json)
    }

    fn read_signature(&self) -> Result<Option<SignatureRecord>> {
        match self.read_file(keys::SIGNATURE)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn signature_exists(&self) -> Result<bool> {
        self.file_exists(keys::SIGNATURE)
    }
}
