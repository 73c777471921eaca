//! # In-Memory Store
//!
//! Both storage contracts over a `RwLock<HashMap>`. Nothing survives the
//! process; meant for tests and hosts that persist elsewhere.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{keys, CredentialsStore, SignatureStore};
use crate::error::Result;
use crate::identity::SignatureRecord;

/// Process-local storage for the credentials blob and signature record
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<&'static str, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn store_raw(&self, key: &'static str, value: &[u8]) {
        self.entries.write().insert(key, value.to_vec());
    }

    fn retrieve_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().get(key).cloned()
    }

    fn delete_raw(&self, key: &str) -> bool {
        self.entries.write().remove(key).is_some()
    }

    fn exists_raw(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl CredentialsStore for MemoryStore {
    fn read_credentials(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.retrieve_raw(keys::CREDENTIALS))
    }

    fn write_credentials(&self, blob: &[u8]) -> Result<()> {
        self.store_raw(keys::CREDENTIALS, blob);
        Ok(())
    }

    fn delete_credentials(&self) -> Result<bool> {
        Ok(self.delete_raw(keys::CREDENTIALS))
    }

    fn credentials_exist(&self) -> Result<bool> {
        Ok(self.exists_raw(keys::CREDENTIALS))
    }
}

impl SignatureStore for MemoryStore {
    fn write_signature(&self, record: &SignatureRecord) -> Result<()> {
        self.store_raw(keys::SIGNATURE, &serde_json::to_vec(record)?);
        Ok(())
    }

    fn read_signature(&self) -> Result<Option<SignatureRecord>> {
        match self.retrieve_raw(keys::SIGNATURE) {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn signature_exists(&self) -> Result<bool> {
        Ok(self.exists_raw(keys::SIGNATURE))
    }
}

// ============================================================================
// TESTS
// ============================================================================
