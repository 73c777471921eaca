//! # Key Management
//!
//! Ed25519 and X25519 keypairs, always reproducible from a 32-byte seed.
//!
//! ## Key Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KEY TYPES                                      │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  SigningKeyPair (Ed25519)           seed = Expand(ms, "id:sign")│   │
//! │  │  • Detached signatures over challenges and records              │   │
//! │  │  • Public key: 32 bytes (persisted in the signature record)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  EncryptionKeyPair (X25519)         seed = Expand(ms, "id:kex") │   │
//! │  │  • Key agreement for sealed boxes                               │   │
//! │  │  • Scalar is the clamped seed                                   │   │
//! │  │  • Public key: 32 bytes (persisted in the signature record)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  Private halves are never serialized. They are rebuilt from the        │
//! │  password whenever needed.                                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::ZeroizeOnDrop;

use crate::crypto::kdf::{id_kex_seed, id_sign_seed, MasterSeed};
use crate::error::{Error, Result};

/// Combined keypair: the cryptographic half of an identity
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    /// Ed25519 keypair for signing
    pub signing: SigningKeyPair,
    /// X25519 keypair for key agreement
    pub encryption: EncryptionKeyPair,
}

impl KeyPair {
    /// Derive both keypairs from a master seed
    ///
    /// ```text
    /// MasterSeed
    ///       │
    ///       ├──► Expand("id:sign") → Ed25519 seed → SigningKeyPair
    ///       │
    ///       └──► Expand("id:kex")  → X25519 seed  → EncryptionKeyPair
    /// ```
    pub fn from_master_seed(seed: &MasterSeed) -> Result<Self> {
        let sign_seed = id_sign_seed(seed)?;
        let kex_seed = id_kex_seed(seed)?;

        Ok(Self {
            signing: SigningKeyPair::from_seed(&sign_seed),
            encryption: EncryptionKeyPair::from_seed(&kex_seed),
        })
    }

    /// Get the public keys for sharing with others
    pub fn public_keys(&self) -> PublicKey {
        PublicKey {
            signing: self.signing.public_bytes(),
            encryption: self.encryption.public_bytes(),
        }
    }
}

/// Ed25519 signing keypair
#[derive(ZeroizeOnDrop)]
pub struct SigningKeyPair {
    #[zeroize(skip)] // ed25519_dalek::SigningKey zeroizes itself
    secret: SigningKey,
}

impl SigningKeyPair {
    /// Generate a random signing keypair (tests, throwaway identities)
    pub fn generate() -> Self {
        Self {
            secret: SigningKey::generate(&mut OsRng),
        }
    }

    /// Expand a 32-byte seed into a keypair (RFC 8032 seed expansion)
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            secret: SigningKey::from_bytes(seed),
        }
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.secret.verifying_key().to_bytes()
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> VerifyingKey {
        self.secret.verifying_key()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.secret
    }
}

/// X25519 keypair for key agreement
#[derive(ZeroizeOnDrop)]
pub struct EncryptionKeyPair {
    #[zeroize(skip)] // x25519_dalek handles its own zeroization
    secret: StaticSecret,
    #[zeroize(skip)]
    public: X25519PublicKey,
}

impl EncryptionKeyPair {
    /// Generate a random keypair (ephemeral senders)
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Build from a 32-byte seed; the scalar is clamped on use
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let secret = StaticSecret::from(*seed);
        let public = X25519PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Get the public key bytes
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public.to_bytes()
    }

    /// Perform Diffie-Hellman key exchange
    ///
    /// Both sides reach the same value:
    /// - Alice: alice_secret × bob_public
    /// - Bob: bob_secret × alice_public
    ///
    /// Rejects low-order peer keys, which would force an all-zero secret.
    pub fn diffie_hellman(&self, their_public: &[u8; 32]) -> Result<[u8; 32]> {
        let their_public = X25519PublicKey::from(*their_public);
        let shared = self.secret.diffie_hellman(&their_public);
        if !shared.was_contributory() {
            return Err(Error::KeyExchangeFailed(
                "peer public key is a low-order point".into(),
            ));
        }
        Ok(shared.to_bytes())
    }
}

/// Public keys that can be safely shared with others
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicKey {
    /// Ed25519 public key for signature verification (32 bytes)
    #[serde(with = "b64_bytes")]
    pub signing: [u8; 32],

    /// X25519 public key for key agreement (32 bytes)
    #[serde(with = "b64_bytes")]
    pub encryption: [u8; 32],
}

impl PublicKey {
    /// Create a PublicKey from raw bytes
    pub fn from_bytes(signing: [u8; 32], encryption: [u8; 32]) -> Self {
        Self {
            signing,
            encryption,
        }
    }

    /// Get the verifying key for signature verification
    pub fn verifying_key(&self) -> Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.signing)
            .map_err(|e| Error::InvalidKey(format!("Invalid signing public key: {}", e)))
    }

    /// Short fingerprint of both keys, for logs and display
    pub fn fingerprint(&self) -> String {
        let mut combined = [0u8; 64];
        combined[..32].copy_from_slice(&self.signing);
        combined[32..].copy_from_slice(&self.encryption);
        compute_key_fingerprint(&combined)
    }
}

/// First 8 bytes of SHA-256 over a public key, hex encoded
pub fn compute_key_fingerprint(public_key: &[u8]) -> String {
    let digest = Sha256::digest(public_key);
    hex::encode(&digest[..8])
}

/// Decode a base64 string into a 32-byte public key
pub fn decode_public_key(text: &str) -> Result<[u8; 32]> {
    let bytes = STANDARD
        .decode(text)
        .map_err(|e| Error::InvalidKey(format!("Invalid base64 key: {}", e)))?;
    bytes
        .try_into()
        .map_err(|_| Error::InvalidKey("Public key must be 32 bytes".into()))
}

/// Serde helper for 32-byte keys as base64 strings
pub(crate) mod b64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 32], D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::decode_public_key(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// TESTS
// ============================================================================
