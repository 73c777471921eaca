//! # Vault Core
//!
//! Deterministic cryptographic identity and local vault for applications
//! that authenticate with a username and password.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           VAULT CORE                                    │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    IdentityManager (façade)                     │   │
//! │  │  initialize · sign · credentials record · peer encryption      │   │
//! │  └───────┬──────────────────────┬──────────────────────┬──────────┘   │
//! │          │                      │                      │              │
//! │          ▼                      ▼                      ▼              │
//! │  ┌───────────────┐     ┌────────────────┐     ┌────────────────┐      │
//! │  │  LocalVault   │     │  Session       │     │  Sealed Box    │      │
//! │  │  purpose keys │     │  seed+identity │     │  X25519 + AEAD │      │
//! │  └───────┬───────┘     └───────┬────────┘     └───────┬────────┘      │
//! │          │                     │                      │               │
//! │          └──────────┬──────────┴──────────┬───────────┘               │
//! │                     ▼                     ▼                           │
//! │            ┌────────────────┐    ┌─────────────────┐                  │
//! │            │  Key Derivation│    │  AEAD Primitive │                  │
//! │            │  Argon2id+HKDF │    │  AES-256-GCM    │                  │
//! │            └────────────────┘    └─────────────────┘                  │
//! │                                                                         │
//! │  Collaborators (storage): CredentialsStore, SignatureStore             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Application id and stretch cost
//! - [`crypto`] - Primitives (AEAD, derivation, keys, signatures, sealed boxes)
//! - [`vault`] - Purpose-scoped local encryption
//! - [`identity`] - Sessions, records and the identity manager
//! - [`storage`] - Persistence contracts and implementations
//!
//! ## Example
//!
//! ```ignore
//! use vault_core::{IdentityManager, VaultConfig, CredentialsRecord, storage::MemoryStore};
//!
//! let manager = IdentityManager::new(VaultConfig::new("app.example"))?;
//! manager.initialize_keys_with_user("alice", "Sup3r$ecret!")?;
//!
//! let store = MemoryStore::new();
//! let record = CredentialsRecord::new("alice@example.com", "alice", "seed", "token");
//! manager.persist_credentials(&store, "alice", "Sup3r$ecret!", &record)?;
//! manager.save_signature(&store, "alice", "alice@example.com", "Sup3r$ecret!")?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod storage;
/// Wall-clock helpers for record timestamps.
pub mod time;
pub mod vault;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::{StretchParams, VaultConfig};
pub use crypto::{KeyPair, PublicKey, SealedBox, Signature};
pub use error::{Error, Result};
pub use identity::{CredentialsRecord, IdentityManager, Session, SignatureRecord};
pub use vault::{LocalVault, Purpose};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
