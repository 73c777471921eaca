//! # Error Handling
//!
//! Error types for the identity and vault core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                     │
//! │  │                                                                      │
//! │  ├── Lifecycle Errors                                                  │
//! │  │   └── NotInitialized          - Identity not derived yet            │
//! │  │                                                                      │
//! │  ├── Crypto Errors                                                     │
//! │  │   ├── AuthenticationFailed    - Tag mismatch / wrong key / wrong AAD│
//! │  │   ├── EncryptionFailed        - Cipher refused the input            │
//! │  │   ├── KeyDerivationFailed     - Stretch or expand failed            │
//! │  │   ├── KeyExchangeFailed       - Non-contributory X25519 agreement   │
//! │  │   ├── InvalidKey              - Malformed key bytes                 │
//! │  │   └── UnknownPurpose          - Purpose tag outside the namespace   │
//! │  │                                                                      │
//! │  ├── Format Errors                                                     │
//! │  │   ├── Format                  - Truncated blob / malformed record   │
//! │  │   └── UnsupportedLegacyFormat - Blob needs the legacy decode path   │
//! │  │                                                                      │
//! │  ├── Storage Errors                                                    │
//! │  │   ├── StorageRead / StorageWrite                                    │
//! │  │   └── StorageNotFound                                               │
//! │  │                                                                      │
//! │  └── Internal Errors                                                   │
//! │      ├── InvalidConfig                                                 │
//! │      └── Serialization                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wrong passwords and corrupted ciphertexts both surface as
//! [`Error::AuthenticationFailed`]. Callers cannot tell them apart, and
//! neither can an attacker probing the API.

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the vault core
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Lifecycle Errors (100-199)
    // ========================================================================

    /// An identity-dependent call was made before `initialize_keys_with_user`
    #[error("No identity initialized. Call initialize_keys_with_user() first.")]
    NotInitialized,

    // ========================================================================
    // Crypto Errors (300-399)
    // ========================================================================

    /// AEAD tag mismatch: tampered data, wrong key or wrong AAD
    #[error("Authentication failed: ciphertext could not be verified")]
    AuthenticationFailed,

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Key derivation failed
    #[error("Failed to derive keys: {0}")]
    KeyDerivationFailed(String),

    /// Key agreement produced a non-contributory shared secret
    #[error("Key exchange failed: {0}")]
    KeyExchangeFailed(String),

    /// Invalid key format or length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Purpose tag is not a known or valid purpose
    #[error("Unknown purpose tag: {0}")]
    UnknownPurpose(String),

    // ========================================================================
    // Format Errors (400-449)
    // ========================================================================

    /// Blob is truncated, or a record is malformed after decryption
    #[error("Malformed data: {0}")]
    Format(String),

    /// Blob was written by the pre-derivation scheme
    #[error("Blob uses the legacy credentials format; decode it with the legacy path")]
    UnsupportedLegacyFormat,

    // ========================================================================
    // Storage Errors (450-499)
    // ========================================================================

    /// Failed to read from a store
    #[error("Failed to read from storage: {0}")]
    StorageRead(String),

    /// Failed to write to a store
    #[error("Failed to write to storage: {0}")]
    StorageWrite(String),

    /// Nothing stored under the requested slot
    #[error("Item not found: {0}")]
    StorageNotFound(String),

    // ========================================================================
    // Internal Errors (900-999)
    // ========================================================================

    /// Configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Numeric error code, grouped by category:
    /// - 100-199: Lifecycle
    /// - 300-399: Crypto
    /// - 400-449: Format
    /// - 450-499: Storage
    /// - 900-999: Internal
    pub fn code(&self) -> i32 {
        match self {
            Error::NotInitialized => 100,

            Error::AuthenticationFailed => 300,
            Error::EncryptionFailed(_) => 301,
            Error::KeyDerivationFailed(_) => 302,
            Error::KeyExchangeFailed(_) => 303,
            Error::InvalidKey(_) => 304,
            Error::UnknownPurpose(_) => 305,

            Error::Format(_) => 400,
            Error::UnsupportedLegacyFormat => 401,

            Error::StorageRead(_) => 450,
            Error::StorageWrite(_) => 451,
            Error::StorageNotFound(_) => 452,

            Error::InvalidConfig(_) => 900,
            Error::Serialization(_) => 901,
        }
    }

    /// Whether retrying could succeed.
    ///
    /// Cryptographic failures are deterministic; only store I/O is transient.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::StorageRead(_) | Error::StorageWrite(_))
    }

    /// Check if this error requires user action
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Error::AuthenticationFailed | Error::NotInitialized | Error::UnsupportedLegacyFormat
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Serialization(err.to_string())
        } else {
            Error::Format(format!("Malformed record: {}", err))
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Format(format!("Invalid base64: {}", err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StorageRead(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
