//! # Digital Signatures Module
//!
//! Detached Ed25519 signatures.
//!
//! ```text
//! sign(message, SigningKeyPair)            → Signature (64 bytes)
//! verify(message, signature, public [32])  → bool
//! ```
//!
//! Signing is deterministic: the same key and message always give the same
//! signature. Verification never errors. Malformed keys, malformed
//! signatures and mismatches all answer `false`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{Signature as Ed25519Signature, Signer, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::crypto::SigningKeyPair;
use crate::error::{Error, Result};

/// Size of an Ed25519 signature in bytes
pub const SIGNATURE_SIZE: usize = 64;

/// An Ed25519 detached signature
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "signature_b64")] pub [u8; SIGNATURE_SIZE]);

impl Signature {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; SIGNATURE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice (must be exactly 64 bytes)
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; SIGNATURE_SIZE] = slice.try_into().map_err(|_| {
            Error::InvalidKey(format!(
                "Signature must be {} bytes, got {}",
                SIGNATURE_SIZE,
                slice.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_SIZE] {
        &self.0
    }

    /// Encode as base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decode from base64
    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = STANDARD.decode(text)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Sign a message using Ed25519
pub fn sign(keypair: &SigningKeyPair, message: &[u8]) -> Signature {
    let sig = keypair.signing_key().sign(message);
    Signature(sig.to_bytes())
}

/// Verify a detached Ed25519 signature
///
/// Returns `false` for any malformed input instead of an error.
pub fn verify(public_key: &[u8; 32], message: &[u8], signature: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let Ok(sig) = Ed25519Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify(message, &sig).is_ok()
}

mod signature_b64 {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 64], serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<[u8; 64], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| serde::de::Error::custom("Invalid signature length"))
    }
}

// ============================================================================
// TESTS
// ============================================================================
