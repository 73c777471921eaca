//! # Storage Module
//!
//! Collaborator contracts for persisting the two artifacts this crate
//! produces, and two implementations of them.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE CONTRACTS                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  CredentialsStore                                               │   │
//! │  │  • One opaque encrypted blob ("the credentials file")          │   │
//! │  │  • read / write / delete / exists                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SignatureStore                                                 │   │
//! │  │  • The public signature record (no secrets)                    │   │
//! │  │  • read / write / exists                                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Implementations:                                                       │
//! │                                                                         │
//! │  ┌───────────────────────┐      ┌───────────────────────────────┐      │
//! │  │  MemoryStore          │      │  FileStore                    │      │
//! │  │  RwLock<HashMap>      │      │  <dir>/credentials.bin        │      │
//! │  │  tests, ephemeral use │      │  <dir>/signature.json         │      │
//! │  └───────────────────────┘      └───────────────────────────────┘      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stores never see plaintext: the blob is already encrypted by the vault,
//! and the signature record is public.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::identity::SignatureRecord;

/// Key names shared by the store implementations
pub mod keys {
    /// The encrypted credentials blob
    pub const CREDENTIALS: &str = "credentials.bin";

    /// The public signature record
    pub const SIGNATURE: &str = "signature.json";
}

/// Persistence for the single encrypted credentials blob
pub trait CredentialsStore: Send + Sync {
    /// Read the blob, `None` when nothing has been written
    fn read_credentials(&self) -> Result<Option<Vec<u8>>>;

    /// Replace the blob
    fn write_credentials(&self, blob: &[u8]) -> Result<()>;

    /// Remove the blob; returns whether one existed
    fn delete_credentials(&self) -> Result<bool>;

    /// Whether a blob is present
    fn credentials_exist(&self) -> Result<bool>;
}

/// Persistence for the public signature record
pub trait SignatureStore: Send + Sync {
    /// Replace the record
    fn write_signature(&self, record: &SignatureRecord) -> Result<()>;

    /// Read the record, `None` when nothing has been written
    fn read_signature(&self) -> Result<Option<SignatureRecord>>;

    /// Whether a record is present
    fn signature_exists(&self) -> Result<bool>;
}
