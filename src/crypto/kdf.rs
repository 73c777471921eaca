//! # Key Derivation Functions
//!
//! Turns `(username, password, app_id)` into every secret the crate uses.
//!
//! ## Key Derivation Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KEY DERIVATION HIERARCHY                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              STAGE 1: PASSWORD STRETCH (slow)                   │   │
//! │  │                                                                 │   │
//! │  │  salt = SHA-256("vault-core/salt/v1" ‖ len‖app_id ‖ len‖user)  │   │
//! │  │                                                                 │   │
//! │  │  Argon2id(                                                     │   │
//! │  │    password   = password,                                      │   │
//! │  │    salt       = salt,                                          │   │
//! │  │    t/m/p      = StretchParams,                                 │   │
//! │  │    output_len = 32                                             │   │
//! │  │  )                                                             │   │
//! │  │                                                                 │   │
//! │  │  → MasterSeed (32 bytes, never stored)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │                                ▼                                        │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              STAGE 2: HKDF-SHA256-Expand (fast)                 │   │
//! │  │                                                                 │   │
//! │  │   info = "local:<purpose>"  → PurposeKey (AES-256-GCM)         │   │
//! │  │   info = "id:sign"          → Ed25519 seed                     │   │
//! │  │   info = "id:kex"           → X25519 seed                      │   │
//! │  │   info = "session:<nonce>"  → short-lived X25519 scalar        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Considerations
//!
//! | Aspect | Design Choice | Rationale |
//! |--------|---------------|-----------|
//! | Stretch | Argon2id | Memory-hard, resists GPU brute force |
//! | Expansion | HKDF-Expand (SHA-256) | One-way, single call per label |
//! | Key Separation | Distinct `info` labels | Leaking one key reveals nothing else |
//! | App Separation | `app_id` in salt | Same credentials, different apps, different keys |

use argon2::{Algorithm, Argon2, Params, Version};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::config::StretchParams;
use crate::error::{Error, Result};
use crate::vault::Purpose;

/// Length of every derived value in bytes
pub const SEED_SIZE: usize = 32;

/// Domain separation labels
///
/// These ensure that keys derived for different purposes are cryptographically
/// independent, even when derived from the same master seed.
pub mod domain {
    /// Prefix mixed into the username/app salt
    pub const SALT: &[u8] = b"vault-core/salt/v1";

    /// Prefix for purpose-scoped vault keys
    pub const LOCAL_PREFIX: &str = "local:";

    /// Ed25519 identity seed
    pub const ID_SIGN: &[u8] = b"id:sign";

    /// X25519 identity seed
    pub const ID_KEX: &[u8] = b"id:kex";

    /// Prefix for per-nonce session scalars
    pub const SESSION_PREFIX: &[u8] = b"session:";

    /// Keyed check value a session uses to recognise its own password
    pub const CREDENTIAL_CHECK: &[u8] = b"check:credentials";

    /// Prefix for the externally visible password token
    pub const PASSWORD_TOKEN: &[u8] = b"vault-core/password-token/v1";
}

/// A 32-byte secret derived from a password
///
/// Output of the slow stretch. Recomputed every time the user
/// authenticates and dropped (zeroized) on sign-out.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSeed([u8; SEED_SIZE]);

impl MasterSeed {
    /// Wrap raw seed bytes (tests and pre-stretched material)
    pub fn from_bytes(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterSeed(..)")
    }
}

/// Salt for the password stretch
///
/// Fields are length-prefixed so `("ab", "c")` and `("a", "bc")` never collide.
pub fn derive_salt(username: &str, app_id: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain::SALT);
    hasher.update((app_id.len() as u64).to_be_bytes());
    hasher.update(app_id.as_bytes());
    hasher.update((username.len() as u64).to_be_bytes());
    hasher.update(username.as_bytes());
    hasher.finalize().into()
}

/// Stage 1: stretch a password into the master seed
///
/// Deterministic: identical inputs always yield the identical seed.
/// CPU and memory bound; run it off latency-sensitive threads.
pub fn master_seed(
    username: &str,
    password: &str,
    app_id: &str,
    params: &StretchParams,
) -> Result<MasterSeed> {
    params.validate()?;

    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(SEED_SIZE),
    )
    .map_err(|e| Error::KeyDerivationFailed(format!("Invalid stretch parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let salt = derive_salt(username, app_id);
    let mut seed = Zeroizing::new([0u8; SEED_SIZE]);
    argon2
        .hash_password_into(password.as_bytes(), &salt, &mut *seed)
        .map_err(|e| Error::KeyDerivationFailed(format!("Password stretch failed: {}", e)))?;

    Ok(MasterSeed(*seed))
}

/// Stage 2: HKDF-Expand the master seed under one label
fn expand(seed: &MasterSeed, info: &[&[u8]]) -> Result<Zeroizing<[u8; SEED_SIZE]>> {
    let hkdf = Hkdf::<Sha256>::from_prk(&seed.0)
        .map_err(|_| Error::KeyDerivationFailed("Master seed too short for HKDF".into()))?;

    let mut out = Zeroizing::new([0u8; SEED_SIZE]);
    hkdf.expand_multi_info(info, &mut *out)
        .map_err(|_| Error::KeyDerivationFailed("HKDF expansion failed".into()))?;
    Ok(out)
}

/// Derive the symmetric key for one vault purpose
pub fn purpose_key(seed: &MasterSeed, purpose: &Purpose) -> Result<super::EncryptionKey> {
    let bytes = expand(
        seed,
        &[domain::LOCAL_PREFIX.as_bytes(), purpose.as_str().as_bytes()],
    )?;
    Ok(super::EncryptionKey::from_bytes(*bytes))
}

/// Derive the Ed25519 identity seed
pub fn id_sign_seed(seed: &MasterSeed) -> Result<Zeroizing<[u8; SEED_SIZE]>> {
    expand(seed, &[domain::ID_SIGN])
}

/// Derive the X25519 identity seed
pub fn id_kex_seed(seed: &MasterSeed) -> Result<Zeroizing<[u8; SEED_SIZE]>> {
    expand(seed, &[domain::ID_KEX])
}

/// Derive a per-nonce scalar usable as a short-lived X25519 private key
///
/// Deterministic in `(seed, nonce)`; distinct nonces give independent values.
pub fn session_seed(seed: &MasterSeed, nonce: &[u8]) -> Result<Zeroizing<[u8; SEED_SIZE]>> {
    expand(seed, &[domain::SESSION_PREFIX, nonce])
}

/// Keyed value that recognises the password a seed was stretched from
///
/// Cheap to recompute given the seed, useless without it.
pub fn credential_check(seed: &MasterSeed, password: &str) -> Result<Zeroizing<[u8; SEED_SIZE]>> {
    expand(seed, &[domain::CREDENTIAL_CHECK, password.as_bytes()])
}

/// One-way password token
///
/// Independent of the derivation tree and deliberately not a key: it lets
/// the application check "did the user type the right password" without
/// persisting the password itself.
pub fn hash_password(password: &str, salt: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(domain::PASSWORD_TOKEN);
    hasher.update((salt.len() as u64).to_be_bytes());
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn params() -> StretchParams {
        StretchParams::testing()
    }

    #[test]
    fn test_master_seed_deterministic() {
        let seed1 = master_seed("alice", "Sup3r$ecret!", "app.example", &params()).unwrap();
        let seed2 = master_seed("alice", "Sup3r$ecret!", "app.example", &params()).unwrap();

        assert_eq!(seed1.as_bytes(), seed2.as_bytes());
    }

    #[test]
    fn test_master_seed_depends_on_every_input() {
        let base = master_seed("alice", "pw", "app.a", &params()).unwrap();
        let other_user = master_seed("bob", "pw", "app.a", &params()).unwrap();
        let other_pass = master_seed("alice", "pw2", "app.a", &params()).unwrap();
        let other_app = master_seed("alice", "pw", "app.b", &params()).unwrap();

        assert_ne!(base.as_bytes(), other_user.as_bytes());
        assert_ne!(base.as_bytes(), other_pass.as_bytes());
        assert_ne!(base.as_bytes(), other_app.as_bytes());
    }

    #[test]
    fn test_master_seed_depends_on_cost() {
        let cheap = master_seed("alice", "pw", "app", &params()).unwrap();
        let slower = StretchParams {
            iterations: 2,
            ..params()
        };
        let costly = master_seed("alice", "pw", "app", &slower).unwrap();

        assert_ne!(cheap.as_bytes(), costly.as_bytes());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad = StretchParams {
            iterations: 0,
            ..params()
        };
        assert!(master_seed("alice", "pw", "app", &bad).is_err());
    }

    #[test]
    fn test_credential_check_is_keyed() {
        let seed = MasterSeed::from_bytes([9u8; 32]);
        let other = MasterSeed::from_bytes([10u8; 32]);

        let check = credential_check(&seed, "pw").unwrap();
        assert_eq!(*check, *credential_check(&seed, "pw").unwrap());
        assert_ne!(*check, *credential_check(&seed, "pw2").unwrap());
        assert_ne!(*check, *credential_check(&other, "pw").unwrap());
        assert_ne!(*check, hash_password("pw", &[9u8; 32]));
    }

    #[test]
    fn test_salt_fields_are_unambiguous() {
        assert_ne!(derive_salt("bc", "a"), derive_salt("c", "ab"));
        assert_eq!(derive_salt("bob", "app.x"), derive_salt("bob", "app.x"));
    }

    #[test]
    fn test_purpose_keys_differ() {
        let seed = MasterSeed::from_bytes([42u8; 32]);

        let credentials = purpose_key(&seed, &Purpose::Credentials).unwrap();
        let field_value = purpose_key(&seed, &Purpose::FieldValue).unwrap();
        let again = purpose_key(&seed, &Purpose::Credentials).unwrap();

        assert_ne!(credentials.as_bytes(), field_value.as_bytes());
        assert_eq!(credentials.as_bytes(), again.as_bytes());
    }

    #[test]
    fn test_purpose_separation_over_random_seeds() {
        let mut rng = rand::rngs::OsRng;
        for _ in 0..1000 {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            let seed = MasterSeed::from_bytes(bytes);

            let a = purpose_key(&seed, &Purpose::Credentials).unwrap();
            let b = purpose_key(&seed, &Purpose::FieldValue).unwrap();
            assert_ne!(a.as_bytes(), b.as_bytes());
        }
    }

    #[test]
    fn test_identity_seeds_are_independent() {
        let seed = MasterSeed::from_bytes([7u8; 32]);

        let sign = id_sign_seed(&seed).unwrap();
        let kex = id_kex_seed(&seed).unwrap();
        let key = purpose_key(&seed, &Purpose::Key).unwrap();

        assert_ne!(*sign, *kex);
        assert_ne!(&*sign, key.as_bytes());
        assert_ne!(seed.as_bytes(), &*sign);
    }

    #[test]
    fn test_session_seeds_per_nonce() {
        let seed = MasterSeed::from_bytes([9u8; 32]);

        let a1 = session_seed(&seed, b"nonce-a").unwrap();
        let a2 = session_seed(&seed, b"nonce-a").unwrap();
        let b = session_seed(&seed, b"nonce-b").unwrap();

        assert_eq!(*a1, *a2);
        assert_ne!(*a1, *b);
    }

    #[test]
    fn test_custom_purpose_label_matches_builtin_projection() {
        let seed = MasterSeed::from_bytes([1u8; 32]);

        let builtin = purpose_key(&seed, &Purpose::FieldTag).unwrap();
        let parsed = purpose_key(&seed, &"field-tag".parse::<Purpose>().unwrap()).unwrap();

        assert_eq!(builtin.as_bytes(), parsed.as_bytes());
    }

    #[test]
    fn test_hash_password_deterministic_and_salted() {
        let h1 = hash_password("hunter2", b"bob");
        let h2 = hash_password("hunter2", b"bob");
        let h3 = hash_password("hunter2", b"eve");

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn test_hash_password_is_not_the_master_seed() {
        let seed = master_seed("bob", "hunter2", "app.x", &params()).unwrap();
        assert_ne!(&hash_password("hunter2", b"bob"), seed.as_bytes());
    }
}
