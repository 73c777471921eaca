//! # Local Vault
//!
//! Purpose-scoped encryption of local data under keys derived from the
//! user's credentials.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           LOCAL VAULT                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  encrypt(plaintext, username, password, purpose, aad?)                 │
//! │                                                                         │
//! │    master_seed(username, password, app_id)        (slow)               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │    purpose_key(seed, purpose)                     (fast)               │
//! │          │                                                              │
//! │          ▼                                                              │
//! │    AES-256-GCM(key, plaintext, aad)                                    │
//! │          │                                                              │
//! │          ▼                                                              │
//! │    IV(12) ‖ Ciphertext ‖ Tag(16)                                       │
//! │                                                                         │
//! │  The *_with_session variants start from an existing Session and skip   │
//! │  the stretch. The text variants base64 the packed bytes and never use  │
//! │  AAD, matching blobs written before AAD was introduced.                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The vault performs no I/O and caches nothing; callers own persistence.

mod blob;
mod purpose;

pub use blob::looks_legacy;
pub use purpose::{CustomTag, Purpose, MAX_CUSTOM_TAG_LEN};

pub(crate) use blob::{from_text, open_canonical, to_text};

use crate::config::VaultConfig;
use crate::crypto::kdf::{self, MasterSeed};
use crate::error::Result;
use crate::identity::Session;

/// Stateless vault bound to one application configuration
#[derive(Debug, Clone)]
pub struct LocalVault {
    config: VaultConfig,
}

impl LocalVault {
    /// Create a vault, validating the configuration
    pub fn new(config: VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    fn master_seed(&self, username: &str, password: &str) -> Result<MasterSeed> {
        kdf::master_seed(
            username,
            password,
            &self.config.app_id,
            &self.config.stretch,
        )
    }

    /// Encrypt under the purpose key derived from the credentials
    ///
    /// Returns the packed `IV ‖ Ciphertext ‖ Tag` bytes.
    pub fn encrypt(
        &self,
        plaintext: &[u8],
        username: &str,
        password: &str,
        purpose: &Purpose,
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let seed = self.master_seed(username, password)?;
        let key = kdf::purpose_key(&seed, purpose)?;
        blob::seal(&key, plaintext, aad.unwrap_or_default())
    }

    /// Inverse of [`LocalVault::encrypt`]
    ///
    /// [`crate::Error::Format`] if the blob is shorter than IV plus tag,
    /// [`crate::Error::AuthenticationFailed`] for a wrong password, wrong
    /// AAD or any modification.
    pub fn decrypt(
        &self,
        blob: &[u8],
        username: &str,
        password: &str,
        purpose: &Purpose,
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        // Reject truncated input before paying for the stretch
        crate::crypto::EncryptedBlob::from_bytes(blob)?;

        let seed = self.master_seed(username, password)?;
        let key = kdf::purpose_key(&seed, purpose)?;
        blob::open(&key, blob, aad.unwrap_or_default())
    }

    /// Printable variant of [`LocalVault::encrypt`]: base64, no AAD
    pub fn encrypt_text(
        &self,
        plaintext: &[u8],
        username: &str,
        password: &str,
        purpose: &Purpose,
    ) -> Result<String> {
        let packed = self.encrypt(plaintext, username, password, purpose, None)?;
        Ok(to_text(&packed))
    }

    /// Inverse of [`LocalVault::encrypt_text`]
    pub fn decrypt_text(
        &self,
        text: &str,
        username: &str,
        password: &str,
        purpose: &Purpose,
    ) -> Result<Vec<u8>> {
        let packed = from_text(text)?;
        self.decrypt(&packed, username, password, purpose, None)
    }

    /// Encrypt with the purpose key of an existing session
    pub fn encrypt_with_session(
        session: &Session,
        plaintext: &[u8],
        purpose: &Purpose,
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let key = session.purpose_key(purpose)?;
        blob::seal(&key, plaintext, aad.unwrap_or_default())
    }

    /// Decrypt with the purpose key of an existing session
    pub fn decrypt_with_session(
        session: &Session,
        blob: &[u8],
        purpose: &Purpose,
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let key = session.purpose_key(purpose)?;
        blob::open(&key, blob, aad.unwrap_or_default())
    }

    /// Encrypt one text field for the field-level codec
    ///
    /// Output is printable. The username is bound as AAD so a field copied
    /// into another user's records fails to open.
    pub fn encrypt_field(session: &Session, purpose: &Purpose, value: &str) -> Result<String> {
        let packed = Self::encrypt_with_session(
            session,
            value.as_bytes(),
            purpose,
            Some(session.username().as_bytes()),
        )?;
        Ok(to_text(&packed))
    }

    /// Inverse of [`LocalVault::encrypt_field`]
    pub fn decrypt_field(session: &Session, purpose: &Purpose, text: &str) -> Result<String> {
        let packed = from_text(text)?;
        let plaintext = Self::decrypt_with_session(
            session,
            &packed,
            purpose,
            Some(session.username().as_bytes()),
        )?;
        String::from_utf8(plaintext)
            .map_err(|_| crate::error::Error::Format("Field value is not UTF-8".into()))
    }
}
