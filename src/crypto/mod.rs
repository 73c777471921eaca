//! # Cryptography Module
//!
//! Every primitive the vault and identity layers are built on.
//!
//! ## Security Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    CRYPTOGRAPHIC ARCHITECTURE                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  (username, password, app_id)                                           │
//! │                │                                                        │
//! │                ▼  Argon2id                                  [kdf]       │
//! │  ┌─────────────────────────────┐                                        │
//! │  │     MasterSeed (32 bytes)   │                                        │
//! │  └──────────────┬──────────────┘                                        │
//! │                 │  HKDF-SHA256-Expand                                   │
//! │     ┌───────────┼──────────────┬────────────────┐                       │
//! │     ▼           ▼              ▼                ▼                       │
//! │  local:<p>   id:sign        id:kex        session:<nonce>               │
//! │     │           │              │                │                       │
//! │     ▼           ▼              ▼                ▼                       │
//! │  AES key    Ed25519         X25519        short-lived X25519            │
//! │  [encryption] [keys/signing] [keys/sealed]  [sealed]                    │
//! │                                                                         │
//! │  AEAD: AES-256-GCM, 96-bit random IV, detached 128-bit tag              │
//! │  Sealed box: raw X25519 shared secret as the AEAD key                   │
//! │  Signatures: Ed25519, deterministic, 64 bytes                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! | Property | Mechanism |
//! |----------|-----------|
//! | Confidentiality | AES-256-GCM |
//! | Integrity | GCM tag, AAD binding |
//! | Authenticity | Ed25519 signatures |
//! | Key separation | Distinct HKDF labels |
//! | Memory hygiene | `zeroize` on every secret type |
//!
//! ## Secure Memory Handling
//!
//! Master seeds, purpose keys and private scalars are zeroized when dropped.
//! None of them implements `Serialize`, and their `Debug` output is redacted.

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod sealed;
pub mod signing;

pub use encryption::{decrypt, encrypt, EncryptedBlob, EncryptionKey, Nonce};
pub use kdf::MasterSeed;
pub use keys::{
    compute_key_fingerprint, EncryptionKeyPair, KeyPair, PublicKey, SigningKeyPair,
};
pub use sealed::{open, seal, seal_ephemeral, seal_from_seed, SealedBox};
pub use signing::{sign, verify, Signature};
