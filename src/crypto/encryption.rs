//! # Encryption Module
//!
//! AES-256-GCM with a detached authentication tag. This is the only place
//! in the crate that touches the cipher; purposes, identities and peers are
//! layered on top by the vault and sealed-box modules.
//!
//! ## Blob Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ENCRYPTED BLOB FORMAT                            │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │   ┌────────────┬──────────────────────────────┬────────────────┐       │
//! │   │  IV        │  Ciphertext                  │  Tag           │       │
//! │   │  12 bytes  │  N bytes (N = plaintext len) │  16 bytes      │       │
//! │   └────────────┴──────────────────────────────┴────────────────┘       │
//! │                                                                         │
//! │   Printable form: the same bytes, standard base64, no line wrapping.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Security Properties
//!
//! | Property | Guarantee |
//! |----------|-----------|
//! | Confidentiality | AES-256 in counter mode |
//! | Integrity | GHASH tag over ciphertext and AAD |
//! | Binding | AAD must match exactly at decryption |
//! | IV uniqueness | 96-bit IV from the OS CSPRNG per call |

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Nonce as AesNonce, Tag,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Size of the AES-GCM IV in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Size of the encryption key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// Smallest well-formed blob: IV and tag around an empty ciphertext
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// An IV (number used once) for AES-GCM encryption
///
/// ## Critical Security Requirement
///
/// **NEVER reuse an IV with the same key!**
///
/// Random 96-bit IVs are safe for up to 2^32 messages per key
/// (birthday bound).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Nonce(pub [u8; NONCE_SIZE]);

impl Nonce {
    /// Generate a cryptographically random IV
    pub fn random() -> Self {
        let mut bytes = [0u8; NONCE_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from existing bytes
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

/// An AES-256-GCM key
///
/// Zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the raw key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(..)")
    }
}

/// Output of one AEAD encryption: IV, ciphertext and detached tag
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedBlob {
    /// IV used for this encryption
    pub nonce: Nonce,
    /// Ciphertext, same length as the plaintext
    pub ciphertext: Vec<u8>,
    /// Authentication tag
    pub tag: [u8; TAG_SIZE],
}

impl EncryptedBlob {
    /// Pack as `IV ‖ Ciphertext ‖ Tag`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MIN_BLOB_SIZE + self.ciphertext.len());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Unpack `IV ‖ Ciphertext ‖ Tag`
    ///
    /// Fails with [`Error::Format`] when the input cannot hold an IV and a tag.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < MIN_BLOB_SIZE {
            return Err(Error::Format(format!(
                "Blob is {} bytes, need at least {}",
                bytes.len(),
                MIN_BLOB_SIZE
            )));
        }

        let (nonce, rest) = bytes.split_at(NONCE_SIZE);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce);
        let mut tag_bytes = [0u8; TAG_SIZE];
        tag_bytes.copy_from_slice(tag);

        Ok(Self {
            nonce: Nonce(nonce_bytes),
            ciphertext: ciphertext.to_vec(),
            tag: tag_bytes,
        })
    }

    /// Printable form: packed bytes as standard base64
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Parse the printable form
    pub fn from_base64(text: &str) -> Result<Self> {
        let bytes = STANDARD.decode(text.trim())?;
        Self::from_bytes(&bytes)
    }
}

/// Encrypt with AES-256-GCM under a fresh random IV
///
/// An empty `aad` is equivalent to no AAD.
///
/// ## Example
///
/// ```ignore
/// let key = EncryptionKey::from_bytes([0u8; 32]);
/// let blob = encrypt(&key, b"Hello", b"context")?;
/// assert_eq!(blob.ciphertext.len(), 5);
/// ```
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8], aad: &[u8]) -> Result<EncryptedBlob> {
    let nonce = Nonce::random();
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::EncryptionFailed(format!("Invalid key: {}", e)))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(AesNonce::from_slice(&nonce.0), aad, &mut buffer)
        .map_err(|e| Error::EncryptionFailed(format!("Encryption failed: {}", e)))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());

    Ok(EncryptedBlob {
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and verify an AES-256-GCM blob
///
/// ## Errors
///
/// Returns [`Error::AuthenticationFailed`] if:
/// - The ciphertext or tag was tampered with
/// - The AAD doesn't match
/// - The key is wrong
/// - The IV is wrong
///
/// No plaintext is returned on failure.
pub fn decrypt(key: &EncryptionKey, blob: &EncryptedBlob, aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(&key.0)
        .map_err(|e| Error::InvalidKey(format!("Invalid key: {}", e)))?;

    let mut buffer = blob.ciphertext.clone();
    match cipher.decrypt_in_place_detached(
        AesNonce::from_slice(&blob.nonce.0),
        aad,
        &mut buffer,
        Tag::from_slice(&blob.tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(Error::AuthenticationFailed)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_basic() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        let plaintext = b"Hello, World!";
        let aad = b"context";

        let blob = encrypt(&key, plaintext, aad).unwrap();
        let decrypted = decrypt(&key, &blob, aad).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_decrypt_empty() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let blob = encrypt(&key, b"", b"").unwrap();
        assert!(blob.ciphertext.is_empty());
        assert_eq!(blob.to_bytes().len(), MIN_BLOB_SIZE);

        let decrypted = decrypt(&key, &blob, b"").unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_ciphertext_length_matches_plaintext() {
        let key = EncryptionKey::from_bytes([7u8; 32]);
        let blob = encrypt(&key, &[0u8; 100], b"").unwrap();

        assert_eq!(blob.ciphertext.len(), 100);
        assert_eq!(blob.to_bytes().len(), 100 + MIN_BLOB_SIZE);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        let mut blob = encrypt(&key, b"Hello, World!", b"context").unwrap();

        blob.ciphertext[0] ^= 0x01;

        let result = decrypt(&key, &blob, b"context");
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_tampered_tag_fails() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        let mut blob = encrypt(&key, b"Hello, World!", b"").unwrap();

        blob.tag[TAG_SIZE - 1] ^= 0x80;

        assert!(matches!(
            decrypt(&key, &blob, b""),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let key = EncryptionKey::from_bytes([42u8; 32]);
        let blob = encrypt(&key, b"Hello, World!", b"context").unwrap();

        let result = decrypt(&key, &blob, b"wrong context");
        assert!(matches!(result, Err(Error::AuthenticationFailed)));
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = EncryptionKey::from_bytes([42u8; 32]);
        let key2 = EncryptionKey::from_bytes([99u8; 32]);
        let blob = encrypt(&key1, b"secret", b"").unwrap();

        assert!(matches!(
            decrypt(&key2, &blob, b""),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_different_nonces_produce_different_ciphertext() {
        let key = EncryptionKey::from_bytes([42u8; 32]);

        let blob1 = encrypt(&key, b"Hello, World!", b"context").unwrap();
        let blob2 = encrypt(&key, b"Hello, World!", b"context").unwrap();

        assert_ne!(blob1.nonce, blob2.nonce);
        assert_ne!(blob1.ciphertext, blob2.ciphertext);
    }

    #[test]
    fn test_pack_unpack_layout() {
        let key = EncryptionKey::from_bytes([3u8; 32]);
        let blob = encrypt(&key, b"layout", b"").unwrap();
        let packed = blob.to_bytes();

        assert_eq!(&packed[..NONCE_SIZE], blob.nonce.as_bytes());
        assert_eq!(&packed[NONCE_SIZE..NONCE_SIZE + 6], blob.ciphertext.as_slice());
        assert_eq!(&packed[packed.len() - TAG_SIZE..], &blob.tag);
        assert_eq!(EncryptedBlob::from_bytes(&packed).unwrap(), blob);
    }

    #[test]
    fn test_short_blob_is_format_error() {
        let result = EncryptedBlob::from_bytes(&[0u8; 10]);
        assert!(matches!(result, Err(Error::Format(_))));

        let result = EncryptedBlob::from_bytes(&[0u8; MIN_BLOB_SIZE - 1]);
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_base64_has_no_line_breaks() {
        let key = EncryptionKey::from_bytes([5u8; 32]);
        let blob = encrypt(&key, &[0xAB; 512], b"").unwrap();
        let text = blob.to_base64();

        assert!(!text.contains('\n'));
        assert_eq!(EncryptedBlob::from_base64(&text).unwrap(), blob);
    }

    #[test]
    fn test_invalid_base64_is_format_error() {
        assert!(matches!(
            EncryptedBlob::from_base64("not base64 at all!"),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_key_debug_hides_bytes() {
        let key = EncryptionKey::from_bytes([0xEE; 32]);
        assert!(!format!("{:?}", key).contains("238"));
    }
}
