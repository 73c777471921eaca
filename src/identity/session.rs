//! An authenticated session: one user's master seed and identity, held in
//! memory until sign-out.

use std::fmt;

use zeroize::Zeroizing;

use crate::config::VaultConfig;
use crate::crypto::kdf::{self, MasterSeed};
use crate::crypto::{self, EncryptionKey, KeyPair, PublicKey, SealedBox, Signature};
use crate::error::Result;
use crate::vault::Purpose;

/// Immutable snapshot of an initialized identity
///
/// Produced once per sign-in by the password stretch. Everything downstream
/// (purpose keys, signatures, sealed boxes) is derived from it without
/// touching the password again. Secrets are zeroized when the last handle
/// is dropped.
pub struct Session {
    username: String,
    app_id: String,
    master_seed: MasterSeed,
    keys: KeyPair,
    credential_check: Zeroizing<[u8; 32]>,
    created_at: i64,
}

impl Session {
    /// Run the stretch and derive the full identity
    pub fn derive(username: &str, password: &str, config: &VaultConfig) -> Result<Self> {
        let master_seed = kdf::master_seed(username, password, &config.app_id, &config.stretch)?;
        Self::from_master_seed(username, password, &config.app_id, master_seed)
    }

    pub(crate) fn from_master_seed(
        username: &str,
        password: &str,
        app_id: &str,
        master_seed: MasterSeed,
    ) -> Result<Self> {
        let keys = KeyPair::from_master_seed(&master_seed)?;
        let credential_check = kdf::credential_check(&master_seed, password)?;
        Ok(Self {
            username: username.to_string(),
            app_id: app_id.to_string(),
            credential_check,
            master_seed,
            keys,
            created_at: crate::time::now_timestamp(),
        })
    }

    /// Username this session was derived for
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Application id folded into the derivation
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// When the session was derived (Unix seconds)
    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Public halves of the identity
    pub fn public_keys(&self) -> PublicKey {
        self.keys.public_keys()
    }

    /// The identity keypairs
    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    /// Symmetric key for one vault purpose
    pub fn purpose_key(&self, purpose: &Purpose) -> Result<EncryptionKey> {
        kdf::purpose_key(&self.master_seed, purpose)
    }

    /// Per-nonce scalar for short-lived key agreement
    pub fn session_seed(&self, nonce: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
        kdf::session_seed(&self.master_seed, nonce)
    }

    /// Detached Ed25519 signature with the identity key
    pub fn sign(&self, message: &[u8]) -> Signature {
        crypto::sign(&self.keys.signing, message)
    }

    /// Seal to a peer under the session scalar for `nonce`
    ///
    /// The box carries the scalar's public half, so the receiver needs
    /// nothing but its own Kex key to open it.
    pub fn seal_to(
        &self,
        nonce: &[u8],
        plaintext: &[u8],
        peer_public: &[u8; 32],
        aad: &[u8],
    ) -> Result<SealedBox> {
        let scalar = self.session_seed(nonce)?;
        crypto::seal_from_seed(plaintext, &scalar, peer_public, aad)
    }

    /// Open a box addressed to this identity's Kex key
    pub fn open(
        &self,
        sealed: &SealedBox,
        peer_public: Option<&[u8; 32]>,
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        crypto::open(sealed, &self.keys.encryption, peer_public, aad)
    }

    /// Whether this session was derived from exactly these credentials
    pub(crate) fn matches(&self, username: &str, password: &str, app_id: &str) -> bool {
        self.username == username
            && self.app_id == app_id
            && kdf::credential_check(&self.master_seed, password)
                .map(|check| *check == *self.credential_check)
                .unwrap_or(false)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("app_id", &self.app_id)
            .field("fingerprint", &self.public_keys().fingerprint())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}
