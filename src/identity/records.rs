//! Persisted record shapes: the encrypted credentials record and the public
//! signature record.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::Session;
use crate::crypto::keys::decode_public_key;
use crate::crypto::{self, PublicKey};
use crate::error::{Error, Result};

/// Version written by [`CredentialsRecord::new`]
pub const CREDENTIALS_VERSION: u32 = 2;

/// Version of records written before purpose-scoped derivation existed
pub const LEGACY_CREDENTIALS_VERSION: u32 = 1;

/// The credentials record kept encrypted on disk
///
/// Serialized field names are fixed by the on-disk format.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsRecord {
    /// Account email
    #[serde(rename = "user_email")]
    pub email: String,

    /// Account username
    #[serde(rename = "user_username")]
    pub username: String,

    /// Password-derived material the host app uses to re-authenticate
    #[serde(rename = "user_safe_password")]
    pub safe_password_seed: String,

    /// Server validation token
    #[serde(rename = "user_validation_token")]
    pub auth_token: String,

    /// Record format version
    pub version: u32,

    /// Unix seconds when the record was written
    #[serde(rename = "ts")]
    pub timestamp: i64,
}

impl CredentialsRecord {
    /// Create a current-version record stamped with the current time
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        safe_password_seed: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            safe_password_seed: safe_password_seed.into(),
            auth_token: auth_token.into(),
            version: CREDENTIALS_VERSION,
            timestamp: crate::time::now_timestamp(),
        }
    }

    /// Serialize to JSON bytes
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse JSON bytes
    ///
    /// Malformed JSON after a successful decryption is a [`Error::Format`].
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Format(format!("Malformed credentials record: {}", e)))
    }

    /// Whether this record predates purpose-scoped derivation
    pub fn is_legacy(&self) -> bool {
        self.version < CREDENTIALS_VERSION
    }
}

impl fmt::Debug for CredentialsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRecord")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("safe_password_seed", &"<redacted>")
            .field("auth_token", &"<redacted>")
            .field("version", &self.version)
            .field("timestamp", &self.timestamp)
            .finish()
    }
}

/// The public signature record
///
/// Contains only public keys and metadata. Optionally self-signed with the
/// Ed25519 key it advertises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Account username
    pub username: String,

    /// Account email
    pub email: String,

    /// Base64 Ed25519 public key
    #[serde(rename = "signPublicKeyB64")]
    pub sign_public_key_b64: String,

    /// Base64 X25519 public key
    #[serde(rename = "kexPublicKeyB64")]
    pub kex_public_key_b64: String,

    /// RFC 3339 UTC timestamp
    #[serde(rename = "timestampUtc")]
    pub timestamp_utc: String,

    /// Application id the keys were derived under
    #[serde(rename = "appId")]
    pub app_id: String,

    /// Base64 Ed25519 signature over [`SignatureRecord::signed_bytes`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SignatureRecord {
    /// Build and self-sign a record for the session's identity
    pub fn for_session(session: &Session, email: impl Into<String>) -> Result<Self> {
        let public = session.public_keys();
        let mut record = Self {
            username: session.username().to_string(),
            email: email.into(),
            sign_public_key_b64: STANDARD.encode(public.signing),
            kex_public_key_b64: STANDARD.encode(public.encryption),
            timestamp_utc: crate::time::now_utc_string(),
            app_id: session.app_id().to_string(),
            signature: None,
        };
        let signature = session.sign(&record.signed_bytes()?);
        record.signature = Some(signature.to_base64());
        Ok(record)
    }

    /// Canonical bytes covered by the self-signature: the JSON form with the
    /// `signature` field omitted
    pub fn signed_bytes(&self) -> Result<Vec<u8>> {
        let unsigned = Self {
            signature: None,
            ..self.clone()
        };
        Ok(serde_json::to_vec(&unsigned)?)
    }

    /// Decode the advertised public keys
    pub fn public_keys(&self) -> Result<PublicKey> {
        Ok(PublicKey::from_bytes(
            decode_public_key(&self.sign_public_key_b64)?,
            decode_public_key(&self.kex_public_key_b64)?,
        ))
    }

    /// When the record was written
    pub fn timestamp(&self) -> Result<chrono::DateTime<chrono::Utc>> {
        crate::time::parse_utc(&self.timestamp_utc)
    }

    /// Check the self-signature
    ///
    /// `false` when unsigned, malformed or tampered.
    pub fn verify(&self) -> bool {
        let Some(signature) = &self.signature else {
            return false;
        };
        let (Ok(public), Ok(signature), Ok(message)) = (
            decode_public_key(&self.sign_public_key_b64),
            STANDARD.decode(signature),
            self.signed_bytes(),
        ) else {
            return false;
        };
        crypto::verify(&public, &message, &signature)
    }

    /// Verify a detached signature made by the advertised signing key
    pub fn verify_detached(&self, message: &[u8], signature: &[u8]) -> bool {
        match decode_public_key(&self.sign_public_key_b64) {
            Ok(public) => crypto::verify(&public, message, signature),
            Err(_) => false,
        }
    }

    /// Whether the record advertises exactly this session's identity
    pub fn matches_session(&self, session: &Session) -> bool {
        self.username == session.username()
            && self.app_id == session.app_id()
            && self
                .public_keys()
                .map(|keys| keys == session.public_keys())
                .unwrap_or(false)
    }
}
