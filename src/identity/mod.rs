//! # Identity Module
//!
//! A user's asymmetric identity, derived from credentials, plus the manager
//! that caches it for the length of a sign-in.
//!
//! ## Identity Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         IDENTITY SYSTEM                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  (username, password, app_id)                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │  Session                                                      │     │
//! │  │  ───────                                                      │     │
//! │  │                                                               │     │
//! │  │  MasterSeed ──┬──► id:sign ──► ┌─────────────────┐            │     │
//! │  │               │                │ Signing KeyPair │            │     │
//! │  │               │                │ (Ed25519)       │            │     │
//! │  │               │                └─────────────────┘            │     │
//! │  │               ├──► id:kex  ──► ┌─────────────────┐            │     │
//! │  │               │                │ Kex KeyPair     │            │     │
//! │  │               │                │ (X25519)        │            │     │
//! │  │               │                └─────────────────┘            │     │
//! │  │               └──► local:<purpose>, session:<nonce>           │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌───────────────────────────────────────────────────────────────┐     │
//! │  │  Persisted (public only)                                      │     │
//! │  │                                                               │     │
//! │  │  SignatureRecord { username, email, signPublicKeyB64,        │     │
//! │  │                    kexPublicKeyB64, timestampUtc, appId }     │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Private keys are never written anywhere. Signing in again with the same
//! credentials reproduces them bit for bit.

mod manager;
mod records;
mod session;

pub use manager::IdentityManager;
pub use records::{
    CredentialsRecord, SignatureRecord, CREDENTIALS_VERSION, LEGACY_CREDENTIALS_VERSION,
};
pub use session::Session;

use crate::crypto::kdf::{self, MasterSeed};
use crate::crypto::{EncryptionKeyPair, KeyPair, SigningKeyPair};
use crate::error::Result;

/// Ed25519 keypair from a 32-byte seed
pub fn signer_from_seed(seed: &[u8; 32]) -> SigningKeyPair {
    SigningKeyPair::from_seed(seed)
}

/// X25519 keypair from a 32-byte seed (scalar clamped on use)
pub fn kex_from_seed(seed: &[u8; 32]) -> EncryptionKeyPair {
    EncryptionKeyPair::from_seed(seed)
}

/// Both identity keypairs for a master seed
pub fn derive_identity(seed: &MasterSeed) -> Result<KeyPair> {
    let sign_seed = kdf::id_sign_seed(seed)?;
    let kex_seed = kdf::id_kex_seed(seed)?;
    let signer = signer_from_seed(&sign_seed);
    let kex = kex_from_seed(&kex_seed);
    Ok(KeyPair {
        signing: signer,
        encryption: kex,
    })
}

// ============================================================================
// TESTS
// ============================================================================
