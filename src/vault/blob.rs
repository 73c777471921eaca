//! Packing vault ciphertexts and recognising older blob layouts.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::crypto::encryption::{self, EncryptedBlob, EncryptionKey, MIN_BLOB_SIZE};
use crate::error::{Error, Result};

/// Encrypt and pack as `IV ‖ Ciphertext ‖ Tag`
pub(crate) fn seal(key: &EncryptionKey, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    Ok(encryption::encrypt(key, plaintext, aad)?.to_bytes())
}

/// Unpack and decrypt
///
/// [`Error::Format`] when too short, [`Error::AuthenticationFailed`] on any
/// tag mismatch.
pub(crate) fn open(key: &EncryptionKey, bytes: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let blob = EncryptedBlob::from_bytes(bytes)?;
    encryption::decrypt(key, &blob, aad)
}

/// Like [`open`], but reports blobs stored in the old text layout as
/// [`Error::UnsupportedLegacyFormat`] instead of an authentication failure.
pub(crate) fn open_canonical(key: &EncryptionKey, bytes: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    match open(key, bytes, aad) {
        Err(Error::AuthenticationFailed) if looks_legacy(bytes) => {
            Err(Error::UnsupportedLegacyFormat)
        }
        other => other,
    }
}

/// Whether `bytes` is the base64 text of a packed blob rather than the blob
/// itself.
///
/// Canonical blobs are raw cipher output; the chance that 28+ random bytes
/// all land in the base64 alphabet and decode to a full blob is negligible.
pub fn looks_legacy(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    match STANDARD.decode(text.trim()) {
        Ok(decoded) => decoded.len() >= MIN_BLOB_SIZE,
        Err(_) => false,
    }
}

/// Printable form of packed bytes
pub(crate) fn to_text(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode the printable form back to packed bytes
pub(crate) fn from_text(text: &str) -> Result<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}
