//! # Identity Manager
//!
//! The façade the authentication layer and field codec call into.
//!
//! ## Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      IDENTITY MANAGER LIFECYCLE                         │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   ┌───────────────┐  initialize_keys_with_user   ┌──────────────────┐  │
//! │   │ Uninitialized │ ───────────────────────────► │ Initialized      │  │
//! │   │               │                              │ (Arc<Session>)   │  │
//! │   └───────────────┘ ◄─────────────────────────── └──────────────────┘  │
//! │           ▲               sign_out                   │      ▲          │
//! │           │                                          │      │          │
//! │           │                                          └──────┘          │
//! │           │                         same user + password: cached       │
//! │           │                         other credentials: re-derived      │
//! │                                                                         │
//! │   Identity-dependent calls in Uninitialized fail with NotInitialized.  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Initializations are serialized by a mutex; the stretch runs while holding
//! it, so two threads initializing the same user pay for it once. Readers
//! take the `RwLock` only long enough to clone the `Arc<Session>` and then
//! work on an immutable snapshot.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use zeroize::Zeroizing;

use super::records::{CredentialsRecord, SignatureRecord, CREDENTIALS_VERSION};
use super::Session;
use crate::config::VaultConfig;
use crate::crypto::{self, compute_key_fingerprint, kdf, SealedBox, Signature};
use crate::error::{Error, Result};
use crate::storage::{CredentialsStore, SignatureStore};
use crate::vault::{self, LocalVault, Purpose};

/// Caches the active identity and exposes every identity-bound operation
pub struct IdentityManager {
    config: VaultConfig,
    current: RwLock<Option<Arc<Session>>>,
    init_lock: Mutex<()>,
}

impl IdentityManager {
    /// Create a manager with no identity loaded
    pub fn new(config: VaultConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: RwLock::new(None),
            init_lock: Mutex::new(()),
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Derive (or reuse) the identity for these credentials
    ///
    /// Idempotent for the same username and password. Different credentials
    /// replace the cached session.
    pub fn initialize_keys_with_user(&self, username: &str, password: &str) -> Result<Arc<Session>> {
        let _guard = self.init_lock.lock();

        if let Some(existing) = self.current.read().as_ref() {
            if existing.matches(username, password, &self.config.app_id) {
                tracing::debug!(username, "Reusing cached identity");
                return Ok(Arc::clone(existing));
            }
        }

        let session = Arc::new(Session::derive(username, password, &self.config)?);
        let previous = self.current.write().replace(Arc::clone(&session));

        tracing::info!(
            username,
            fingerprint = %session.public_keys().fingerprint(),
            replaced = previous.is_some(),
            "Identity initialized"
        );
        Ok(session)
    }

    /// Run [`IdentityManager::initialize_keys_with_user`] on the blocking pool
    pub async fn initialize_in_background(
        self: &Arc<Self>,
        username: String,
        password: Zeroizing<String>,
    ) -> Result<Arc<Session>> {
        let manager = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            manager.initialize_keys_with_user(&username, &password)
        })
        .await
        .map_err(|e| Error::KeyDerivationFailed(format!("Initialization task failed: {}", e)))?
    }

    /// Drop the cached identity; secrets are zeroized once the last
    /// outstanding `Arc<Session>` goes away
    pub fn sign_out(&self) {
        let _guard = self.init_lock.lock();
        if let Some(session) = self.current.write().take() {
            tracing::info!(username = session.username(), "Signed out");
        }
    }

    /// Snapshot of the active session
    pub fn session(&self) -> Result<Arc<Session>> {
        self.current.read().clone().ok_or(Error::NotInitialized)
    }

    /// Whether an identity is loaded
    pub fn is_initialized(&self) -> bool {
        self.current.read().is_some()
    }

    /// Username of the active session
    pub fn current_username(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|s| s.username().to_string())
    }

    /// The cached session, provided it was derived from these credentials
    ///
    /// Never derives: another user is [`Error::NotInitialized`] and a wrong
    /// password for the cached user is [`Error::AuthenticationFailed`].
    fn session_for(&self, username: &str, password: &str) -> Result<Arc<Session>> {
        let session = self.session()?;
        if session.username() != username || session.app_id() != self.config.app_id {
            return Err(Error::NotInitialized);
        }
        if !session.matches(username, password, &self.config.app_id) {
            return Err(Error::AuthenticationFailed);
        }
        Ok(session)
    }

    // ========================================================================
    // PUBLIC KEYS & SIGNATURES
    // ========================================================================

    /// Ed25519 public key of the active identity
    pub fn get_sign_public(&self) -> Result<[u8; 32]> {
        Ok(self.session()?.public_keys().signing)
    }

    /// X25519 public key of the active identity
    pub fn get_kex_public(&self) -> Result<[u8; 32]> {
        Ok(self.session()?.public_keys().encryption)
    }

    /// Sign a challenge with the active identity
    pub fn sign_detached(&self, message: &[u8]) -> Result<Signature> {
        Ok(self.session()?.sign(message))
    }

    /// Verify a detached signature; never errors
    pub fn verify_detached(&self, message: &[u8], signature: &[u8], public_key: &[u8; 32]) -> bool {
        crypto::verify(public_key, message, signature)
    }

    /// Build the self-signed public record for the active identity
    pub fn signature_record(&self, email: &str) -> Result<SignatureRecord> {
        let session = self.session()?;
        SignatureRecord::for_session(&session, email)
    }

    /// Initialize if needed, then build the public record and hand it to
    /// the store
    ///
    /// The record holds public keys and metadata only.
    pub fn save_signature(
        &self,
        store: &dyn SignatureStore,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignatureRecord> {
        let session = self.initialize_keys_with_user(username, password)?;
        let record = SignatureRecord::for_session(&session, email)?;
        self.persist_signature(store, &record)?;
        Ok(record)
    }

    /// Write a record, refusing one that does not describe the active identity
    pub fn persist_signature(&self, store: &dyn SignatureStore, record: &SignatureRecord) -> Result<()> {
        let session = self.session()?;
        if !record.matches_session(&session) {
            return Err(Error::InvalidKey(
                "Signature record does not match the active identity".into(),
            ));
        }
        store.write_signature(record)?;
        tracing::debug!(
            username = session.username(),
            sign_key = %compute_key_fingerprint(&session.public_keys().signing),
            "Saved signature record"
        );
        Ok(())
    }

    /// Read the stored public record
    pub fn load_signature(&self, store: &dyn SignatureStore) -> Result<Option<SignatureRecord>> {
        store.read_signature()
    }

    /// Whether the stored record is validly self-signed and describes the
    /// active identity
    ///
    /// A wrong password at sign-in shows up here as `false`: the derived
    /// keys no longer match the ones on record.
    pub fn check_stored_signature(&self, store: &dyn SignatureStore) -> Result<bool> {
        let session = self.session()?;
        let record = store
            .read_signature()?
            .ok_or_else(|| Error::StorageNotFound(crate::storage::keys::SIGNATURE.into()))?;
        Ok(record.verify() && record.matches_session(&session))
    }

    /// Deterministic one-way hash, independent of the key derivation tree
    ///
    /// Not a usable key. Feeds the record's safe-password token.
    pub fn hash_password(&self, password: &str, salt: &[u8]) -> [u8; 32] {
        kdf::hash_password(password, salt)
    }

    /// Hex safe-password token salted with the username and application id
    pub fn safe_password_token(&self, username: &str, password: &str) -> String {
        let salt = kdf::derive_salt(username, &self.config.app_id);
        hex::encode(self.hash_password(password, &salt))
    }

    // ========================================================================
    // CREDENTIALS RECORD
    // ========================================================================

    /// Encrypt the credentials record under `purpose` (canonical path)
    ///
    /// Requires [`IdentityManager::initialize_keys_with_user`] for the same
    /// credentials. AAD defaults to the UTF-8 username.
    pub fn encrypt_credentials_by_derivation(
        &self,
        username: &str,
        password: &str,
        purpose: &Purpose,
        record: &CredentialsRecord,
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let session = self.session_for(username, password)?;
        let json = Zeroizing::new(record.to_json()?);
        LocalVault::encrypt_with_session(
            &session,
            &json,
            purpose,
            Some(aad.unwrap_or(username.as_bytes())),
        )
    }

    /// Inverse of [`IdentityManager::encrypt_credentials_by_derivation`]
    ///
    /// A blob in the legacy text layout yields
    /// [`Error::UnsupportedLegacyFormat`].
    pub fn decrypt_credentials_by_derivation(
        &self,
        username: &str,
        password: &str,
        purpose: &Purpose,
        blob: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<CredentialsRecord> {
        crate::crypto::EncryptedBlob::from_bytes(blob)?;

        let session = self.session_for(username, password)?;
        let key = session.purpose_key(purpose)?;
        let json = Zeroizing::new(vault::open_canonical(
            &key,
            blob,
            aad.unwrap_or(username.as_bytes()),
        )?);
        CredentialsRecord::from_json(&json)
    }

    /// Legacy writer: base64 text, credentials purpose, no AAD
    ///
    /// Kept so older clients can still be served; new data should use
    /// [`IdentityManager::encrypt_credentials_by_derivation`].
    pub fn encrypt_credentials_json(
        &self,
        username: &str,
        password: &str,
        record: &CredentialsRecord,
    ) -> Result<String> {
        let session = self.session_for(username, password)?;
        let json = Zeroizing::new(record.to_json()?);
        let packed =
            LocalVault::encrypt_with_session(&session, &json, &Purpose::Credentials, None)?;
        Ok(vault::to_text(&packed))
    }

    /// Legacy reader for text produced by
    /// [`IdentityManager::encrypt_credentials_json`]
    pub fn decrypt_credentials_json(
        &self,
        username: &str,
        password: &str,
        text: &str,
    ) -> Result<CredentialsRecord> {
        let packed = vault::from_text(text)?;
        crate::crypto::EncryptedBlob::from_bytes(&packed)?;

        let session = self.session_for(username, password)?;
        let json = Zeroizing::new(LocalVault::decrypt_with_session(
            &session,
            &packed,
            &Purpose::Credentials,
            None,
        )?);
        CredentialsRecord::from_json(&json)
    }

    /// Encrypt and store the credentials record in the canonical format
    pub fn persist_credentials(
        &self,
        store: &dyn CredentialsStore,
        username: &str,
        password: &str,
        record: &CredentialsRecord,
    ) -> Result<()> {
        let blob = self.encrypt_credentials_by_derivation(
            username,
            password,
            &Purpose::Credentials,
            record,
            None,
        )?;
        store.write_credentials(&blob)?;
        tracing::debug!(username, len = blob.len(), "Persisted credentials");
        Ok(())
    }

    /// Load and decrypt the stored credentials record
    ///
    /// Falls back to the legacy reader when the stored blob is in the old
    /// text layout. `None` when nothing is stored.
    pub fn load_credentials(
        &self,
        store: &dyn CredentialsStore,
        username: &str,
        password: &str,
    ) -> Result<Option<CredentialsRecord>> {
        let Some(blob) = store.read_credentials()? else {
            return Ok(None);
        };

        match self.decrypt_credentials_by_derivation(
            username,
            password,
            &Purpose::Credentials,
            &blob,
            None,
        ) {
            Err(Error::UnsupportedLegacyFormat) => {
                tracing::warn!(username, "Stored credentials use the legacy format");
                let text = std::str::from_utf8(&blob)
                    .map_err(|_| Error::Format("Legacy credentials are not text".into()))?;
                self.decrypt_credentials_json(username, password, text)
                    .map(Some)
            }
            other => other.map(Some),
        }
    }

    /// Re-encrypt legacy stored credentials into the canonical format
    ///
    /// Returns `true` when a migration happened, `false` when the store was
    /// empty or already canonical.
    pub fn migrate_legacy_credentials(
        &self,
        store: &dyn CredentialsStore,
        username: &str,
        password: &str,
    ) -> Result<bool> {
        let Some(blob) = store.read_credentials()? else {
            return Ok(false);
        };
        if !vault::looks_legacy(&blob) {
            return Ok(false);
        }

        let text = std::str::from_utf8(&blob)
            .map_err(|_| Error::Format("Legacy credentials are not text".into()))?;
        let mut record = self.decrypt_credentials_json(username, password, text)?;
        record.version = CREDENTIALS_VERSION;

        self.persist_credentials(store, username, password, &record)?;
        tracing::info!(username, "Migrated legacy credentials");
        Ok(true)
    }

    // ========================================================================
    // PEER ENCRYPTION
    // ========================================================================

    /// Static sealed box with the long-lived Kex key
    ///
    /// No forward secrecy: compromise of either identity key exposes every
    /// message sealed this way. Use [`IdentityManager::seal_with_session`]
    /// when per-message keys can be tracked.
    pub fn encrypt_with_peer_public(
        &self,
        plaintext: &[u8],
        peer_public: &[u8; 32],
        aad: &[u8],
    ) -> Result<SealedBox> {
        let session = self.session()?;
        crypto::seal(plaintext, &session.keys().encryption, peer_public, aad)
    }

    /// Open a box from [`IdentityManager::encrypt_with_peer_public`] or any
    /// box carrying its sender key
    pub fn decrypt_from_peer_public(
        &self,
        sealed: &SealedBox,
        peer_public: &[u8; 32],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        self.session()?.open(sealed, Some(peer_public), aad)
    }

    /// Seal under the session scalar for `nonce`
    pub fn seal_with_session(
        &self,
        nonce: &[u8],
        plaintext: &[u8],
        peer_public: &[u8; 32],
        aad: &[u8],
    ) -> Result<SealedBox> {
        self.session()?.seal_to(nonce, plaintext, peer_public, aad)
    }

    /// Open a box that carries its sender key
    pub fn open_sealed(&self, sealed: &SealedBox, aad: &[u8]) -> Result<Vec<u8>> {
        self.session()?.open(sealed, None, aad)
    }
}

impl std::fmt::Debug for IdentityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityManager")
            .field("app_id", &self.config.app_id)
            .field("current", &self.current_username())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StretchParams;
    use crate::storage::MemoryStore;

    fn manager() -> IdentityManager {
        IdentityManager::new(VaultConfig::new("app.x").with_stretch(StretchParams::testing()))
            .unwrap()
    }

    fn record() -> CredentialsRecord {
        CredentialsRecord::new("bob@example.com", "bob", "safe-seed", "token-1")
    }

    #[test]
    fn test_calls_before_init_fail() {
        let m = manager();

        assert!(matches!(m.get_sign_public(), Err(Error::NotInitialized)));
        assert!(matches!(m.get_kex_public(), Err(Error::NotInitialized)));
        assert!(matches!(m.sign_detached(b"x"), Err(Error::NotInitialized)));
        assert!(matches!(
            m.encrypt_with_peer_public(b"x", &[1u8; 32], b""),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            m.encrypt_credentials_by_derivation("bob", "hunter2", &Purpose::Credentials, &record(), None),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            m.encrypt_credentials_json("bob", "hunter2", &record()),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            m.persist_credentials(&MemoryStore::new(), "bob", "hunter2", &record()),
            Err(Error::NotInitialized)
        ));
        assert!(!m.is_initialized());
    }

    #[test]
    fn test_save_signature_initializes() {
        let m = manager();
        let store = MemoryStore::new();

        let record = m
            .save_signature(&store, "bob", "bob@example.com", "hunter2")
            .unwrap();
        assert!(m.is_initialized());

        let public = record.public_keys().unwrap();
        assert_eq!(public.signing, m.get_sign_public().unwrap());
        assert_eq!(public.encryption, m.get_kex_public().unwrap());
        assert_eq!(record.username, "bob");
        assert_eq!(record.app_id, "app.x");
        assert_eq!(m.load_signature(&store).unwrap(), Some(record));
    }

    #[test]
    fn test_credentials_need_matching_session() {
        let m = manager();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();
        let blob = m
            .encrypt_credentials_by_derivation("bob", "hunter2", &Purpose::Credentials, &record(), None)
            .unwrap();

        assert!(matches!(
            m.encrypt_credentials_by_derivation("eve", "hunter2", &Purpose::Credentials, &record(), None),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            m.decrypt_credentials_by_derivation("bob", "wrong", &Purpose::Credentials, &blob, None),
            Err(Error::AuthenticationFailed)
        ));
        // A failed attempt leaves the cached identity alone
        assert!(m.session().unwrap().matches("bob", "hunter2", "app.x"));
    }

    #[test]
    fn test_initialize_is_idempotent_for_same_credentials() {
        let m = manager();

        let a = m.initialize_keys_with_user("bob", "hunter2").unwrap();
        let b = m.initialize_keys_with_user("bob", "hunter2").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let c = m.initialize_keys_with_user("bob", "other").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_ne!(a.public_keys(), c.public_keys());
        assert_eq!(m.get_sign_public().unwrap(), c.public_keys().signing);
    }

    #[test]
    fn test_switching_users_replaces_session() {
        let m = manager();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();
        m.initialize_keys_with_user("carol", "pw").unwrap();

        assert_eq!(m.current_username().as_deref(), Some("carol"));
    }

    #[test]
    fn test_concurrent_initialization_yields_one_session() {
        let m = Arc::new(manager());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&m);
                std::thread::spawn(move || m.initialize_keys_with_user("bob", "hunter2").unwrap())
            })
            .collect();

        let sessions: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for s in &sessions[1..] {
            assert!(Arc::ptr_eq(&sessions[0], s));
        }
    }

    #[test]
    fn test_sign_out() {
        let m = manager();
        let session = m.initialize_keys_with_user("bob", "hunter2").unwrap();
        m.sign_out();

        assert!(!m.is_initialized());
        assert!(matches!(m.session(), Err(Error::NotInitialized)));
        // Outstanding snapshots stay usable
        assert_eq!(session.username(), "bob");
    }

    #[test]
    fn test_sign_and_verify_detached() {
        let m = manager();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();

        let sig = m.sign_detached(b"challenge").unwrap();
        let public = m.get_sign_public().unwrap();
        assert!(m.verify_detached(b"challenge", sig.as_ref(), &public));
        assert!(!m.verify_detached(b"challengE", sig.as_ref(), &public));
    }

    #[test]
    fn test_credentials_by_derivation_aad_binding() {
        let m = manager();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();
        let blob = m
            .encrypt_credentials_by_derivation("bob", "hunter2", &Purpose::Credentials, &record(), None)
            .unwrap();

        let back = m
            .decrypt_credentials_by_derivation("bob", "hunter2", &Purpose::Credentials, &blob, Some(b"bob"))
            .unwrap();
        assert_eq!(back, record());

        assert!(matches!(
            m.decrypt_credentials_by_derivation("bob", "hunter2", &Purpose::Credentials, &blob, Some(b"eve")),
            Err(Error::AuthenticationFailed)
        ));
        assert!(matches!(
            m.decrypt_credentials_by_derivation("bob", "wrong", &Purpose::Credentials, &blob, None),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_legacy_roundtrip_and_detection() {
        let m = manager();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();
        let text = m.encrypt_credentials_json("bob", "hunter2", &record()).unwrap();

        assert_eq!(
            m.decrypt_credentials_json("bob", "hunter2", &text).unwrap(),
            record()
        );
        assert!(matches!(
            m.decrypt_credentials_by_derivation(
                "bob",
                "hunter2",
                &Purpose::Credentials,
                text.as_bytes(),
                None
            ),
            Err(Error::UnsupportedLegacyFormat)
        ));
    }

    #[test]
    fn test_persist_load_and_migrate() {
        let m = manager();
        let store = MemoryStore::new();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();

        assert!(m.load_credentials(&store, "bob", "hunter2").unwrap().is_none());
        assert!(!m.migrate_legacy_credentials(&store, "bob", "hunter2").unwrap());

        let mut legacy = record();
        legacy.version = crate::identity::LEGACY_CREDENTIALS_VERSION;
        let text = m.encrypt_credentials_json("bob", "hunter2", &legacy).unwrap();
        store.write_credentials(text.as_bytes()).unwrap();

        let loaded = m.load_credentials(&store, "bob", "hunter2").unwrap().unwrap();
        assert!(loaded.is_legacy());

        assert!(m.migrate_legacy_credentials(&store, "bob", "hunter2").unwrap());
        assert!(!vault::looks_legacy(&store.read_credentials().unwrap().unwrap()));

        let migrated = m.load_credentials(&store, "bob", "hunter2").unwrap().unwrap();
        assert_eq!(migrated.version, CREDENTIALS_VERSION);
        assert_eq!(migrated.auth_token, "token-1");
        assert!(!m.migrate_legacy_credentials(&store, "bob", "hunter2").unwrap());
    }

    #[test]
    fn test_save_and_load_signature() {
        let m = manager();
        let store = MemoryStore::new();
        m.initialize_keys_with_user("bob", "hunter2").unwrap();
        assert!(matches!(
            m.check_stored_signature(&store),
            Err(Error::StorageNotFound(_))
        ));

        let saved = m
            .save_signature(&store, "bob", "bob@example.com", "hunter2")
            .unwrap();
        let loaded = m.load_signature(&store).unwrap().unwrap();
        assert_eq!(saved, loaded);
        assert!(loaded.verify());
        assert!(m.check_stored_signature(&store).unwrap());

        m.initialize_keys_with_user("bob", "not-hunter2").unwrap();
        assert!(!m.check_stored_signature(&store).unwrap());

        m.initialize_keys_with_user("eve", "pw").unwrap();
        assert!(m.persist_signature(&store, &loaded).is_err());
    }

    #[test]
    fn test_peer_encryption_between_managers() {
        let alice = manager();
        let bob = manager();
        alice.initialize_keys_with_user("alice", "pw-a").unwrap();
        bob.initialize_keys_with_user("bob", "pw-b").unwrap();

        let alice_kex = alice.get_kex_public().unwrap();
        let bob_kex = bob.get_kex_public().unwrap();

        let sealed = alice.encrypt_with_peer_public(b"request", &bob_kex, b"").unwrap();
        assert_eq!(bob.decrypt_from_peer_public(&sealed, &alice_kex, b"").unwrap(), b"request");

        let sealed = alice.seal_with_session(b"n-1", b"ephemeral", &bob_kex, b"").unwrap();
        assert_eq!(bob.open_sealed(&sealed, b"").unwrap(), b"ephemeral");
    }

    #[test]
    fn test_hash_password_is_deterministic() {
        let m = manager();
        let h = m.hash_password("hunter2", b"salt-1");

        assert_eq!(h, m.hash_password("hunter2", b"salt-1"));
        assert_ne!(h, m.hash_password("hunter2", b"salt-2"));
        assert_ne!(h, m.hash_password("hunter3", b"salt-1"));
        // Works without an identity and is not the credentials key
        assert!(!m.is_initialized());
    }

    #[test]
    fn test_safe_password_token_is_stable_hex() {
        let m = manager();
        let token = m.safe_password_token("bob", "hunter2");

        assert_eq!(token.len(), 64);
        assert_eq!(token, m.safe_password_token("bob", "hunter2"));
        assert_ne!(token, m.safe_password_token("eve", "hunter2"));
    }

    #[tokio::test]
    async fn test_initialize_in_background() {
        let m = Arc::new(manager());
        let session = m
            .initialize_in_background("bob".into(), Zeroizing::new("hunter2".into()))
            .await
            .unwrap();

        assert_eq!(session.username(), "bob");
        assert!(Arc::ptr_eq(&session, &m.session().unwrap()));
    }
}
