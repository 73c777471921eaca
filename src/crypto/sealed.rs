//! # Sealed Boxes
//!
//! Two-party encryption: X25519 agreement feeding AES-256-GCM.
//!
//! ```text
//! Sender                                             Receiver
//! ──────                                             ────────
//! shared = ECDH(sender_priv, receiver_pub)           shared = ECDH(receiver_priv, sender_pub)
//! box    = AEAD(shared, plaintext, aad)      ──────► plaintext = AEAD⁻¹(shared, box, aad)
//!          + sender_pub if sender_priv
//!            was ephemeral
//! ```
//!
//! Three ways to pick the sender scalar:
//!
//! | Function | Scalar | `sender_public` in box |
//! |----------|--------|------------------------|
//! | [`seal`] | caller's static Kex key | no (receiver already knows it) |
//! | [`seal_ephemeral`] | fresh random | yes |
//! | [`seal_from_seed`] | caller-supplied seed (e.g. a session seed) | yes |
//!
//! The raw shared secret is the AES key. Low-order peer keys are rejected
//! before any encryption happens.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::crypto::encryption::{self, EncryptedBlob, EncryptionKey, MIN_BLOB_SIZE};
use crate::crypto::keys::decode_public_key;
use crate::crypto::EncryptionKeyPair;
use crate::error::{Error, Result};

const FLAG_NO_SENDER: u8 = 0;
const FLAG_SENDER: u8 = 1;

/// A ciphertext package exchanged between two identities
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SealedBox {
    /// IV, ciphertext and tag
    pub blob: EncryptedBlob,
    /// Sender's X25519 public key when the sender scalar was not its
    /// long-lived identity key
    pub sender_public: Option<[u8; 32]>,
}

impl SealedBox {
    /// Pack as `flag(1) ‖ [sender_public(32)] ‖ IV ‖ Ciphertext ‖ Tag`
    pub fn to_bytes(&self) -> Vec<u8> {
        let packed = self.blob.to_bytes();
        let mut out = Vec::with_capacity(1 + 32 + packed.len());
        match &self.sender_public {
            Some(public) => {
                out.push(FLAG_SENDER);
                out.extend_from_slice(public);
            }
            None => out.push(FLAG_NO_SENDER),
        }
        out.extend_from_slice(&packed);
        out
    }

    /// Unpack the byte form produced by [`SealedBox::to_bytes`]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&flag, rest) = bytes
            .split_first()
            .ok_or_else(|| Error::Format("Sealed box is empty".into()))?;

        let (sender_public, rest) = match flag {
            FLAG_NO_SENDER => (None, rest),
            FLAG_SENDER => {
                if rest.len() < 32 + MIN_BLOB_SIZE {
                    return Err(Error::Format(format!(
                        "Sealed box is {} bytes, too short for a sender key",
                        bytes.len()
                    )));
                }
                let (public, rest) = rest.split_at(32);
                let mut key = [0u8; 32];
                key.copy_from_slice(public);
                (Some(key), rest)
            }
            other => {
                return Err(Error::Format(format!("Unknown sealed box flag {}", other)));
            }
        };

        Ok(Self {
            blob: EncryptedBlob::from_bytes(rest)?,
            sender_public,
        })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SealedBoxJson {
    iv: String,
    ciphertext: String,
    tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sender_public_key: Option<String>,
}

impl Serialize for SealedBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        SealedBoxJson {
            iv: STANDARD.encode(self.blob.nonce.as_bytes()),
            ciphertext: STANDARD.encode(&self.blob.ciphertext),
            tag: STANDARD.encode(self.blob.tag),
            sender_public_key: self.sender_public.map(|k| STANDARD.encode(k)),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SealedBox {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;

        let json = SealedBoxJson::deserialize(deserializer)?;
        let mut packed = STANDARD.decode(&json.iv).map_err(D::Error::custom)?;
        if packed.len() != encryption::NONCE_SIZE {
            return Err(D::Error::custom("iv must be 12 bytes"));
        }
        packed.extend(STANDARD.decode(&json.ciphertext).map_err(D::Error::custom)?);
        let tag = STANDARD.decode(&json.tag).map_err(D::Error::custom)?;
        if tag.len() != encryption::TAG_SIZE {
            return Err(D::Error::custom("tag must be 16 bytes"));
        }
        packed.extend(tag);

        let sender_public = json
            .sender_public_key
            .as_deref()
            .map(decode_public_key)
            .transpose()
            .map_err(D::Error::custom)?;

        Ok(Self {
            blob: EncryptedBlob::from_bytes(&packed).map_err(D::Error::custom)?,
            sender_public,
        })
    }
}

fn shared_key(my_keys: &EncryptionKeyPair, peer_public: &[u8; 32]) -> Result<EncryptionKey> {
    let shared = Zeroizing::new(my_keys.diffie_hellman(peer_public)?);
    Ok(EncryptionKey::from_bytes(*shared))
}

/// Seal with the caller's static Kex key; no sender key is embedded
pub fn seal(
    plaintext: &[u8],
    my_keys: &EncryptionKeyPair,
    peer_public: &[u8; 32],
    aad: &[u8],
) -> Result<SealedBox> {
    let key = shared_key(my_keys, peer_public)?;
    Ok(SealedBox {
        blob: encryption::encrypt(&key, plaintext, aad)?,
        sender_public: None,
    })
}

/// Seal under a fresh random scalar and embed its public half
pub fn seal_ephemeral(plaintext: &[u8], peer_public: &[u8; 32], aad: &[u8]) -> Result<SealedBox> {
    let ephemeral = EncryptionKeyPair::generate();
    let mut sealed = seal(plaintext, &ephemeral, peer_public, aad)?;
    sealed.sender_public = Some(ephemeral.public_bytes());
    Ok(sealed)
}

/// Seal under a scalar built from `seed` and embed its public half
///
/// Used with session seeds: deterministic per nonce, so no RNG is needed
/// for the scalar itself.
pub fn seal_from_seed(
    plaintext: &[u8],
    seed: &[u8; 32],
    peer_public: &[u8; 32],
    aad: &[u8],
) -> Result<SealedBox> {
    let sender = EncryptionKeyPair::from_seed(seed);
    let mut sealed = seal(plaintext, &sender, peer_public, aad)?;
    sealed.sender_public = Some(sender.public_bytes());
    Ok(sealed)
}

/// Open a sealed box
///
/// `peer_public` wins when given; otherwise the sender key carried in the
/// box is used. Fails with [`Error::InvalidKey`] when neither is available
/// and with [`Error::AuthenticationFailed`] on any tamper or key mismatch.
pub fn open(
    sealed: &SealedBox,
    my_keys: &EncryptionKeyPair,
    peer_public: Option<&[u8; 32]>,
    aad: &[u8],
) -> Result<Vec<u8>> {
    let peer = peer_public
        .or(sealed.sender_public.as_ref())
        .ok_or_else(|| Error::InvalidKey("No peer public key for sealed box".into()))?;

    let key = shared_key(my_keys, peer)?;
    encryption::decrypt(&key, &sealed.blob, aad)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_seal_open_between_two_identities() {
        let alice = EncryptionKeyPair::from_seed(&[1u8; 32]);
        let bob = EncryptionKeyPair::from_seed(&[2u8; 32]);

        let sealed = seal(b"ping", &alice, &bob.public_bytes(), b"").unwrap();
        assert!(sealed.sender_public.is_none());

        let opened = open(&sealed, &bob, Some(&alice.public_bytes()), b"").unwrap();
        assert_eq!(opened, b"ping");
    }

    #[test]
    fn test_ephemeral_seal_carries_sender_key() {
        let bob = EncryptionKeyPair::generate();

        let sealed = seal_ephemeral(b"hello bob", &bob.public_bytes(), b"ctx").unwrap();
        assert!(sealed.sender_public.is_some());

        let opened = open(&sealed, &bob, None, b"ctx").unwrap();
        assert_eq!(opened, b"hello bob");
    }

    #[test]
    fn test_seal_from_seed_is_reproducible_sender() {
        let bob = EncryptionKeyPair::generate();

        let a = seal_from_seed(b"x", &[4u8; 32], &bob.public_bytes(), b"").unwrap();
        let b = seal_from_seed(b"x", &[4u8; 32], &bob.public_bytes(), b"").unwrap();

        assert_eq!(a.sender_public, b.sender_public);
        assert_ne!(a.blob.nonce, b.blob.nonce);
        assert_eq!(open(&b, &bob, None, b"").unwrap(), b"x");
    }

    #[test]
    fn test_wrong_receiver_fails() {
        let bob = EncryptionKeyPair::generate();
        let carol = EncryptionKeyPair::generate();

        let sealed = seal_ephemeral(b"secret", &bob.public_bytes(), b"").unwrap();
        assert!(matches!(
            open(&sealed, &carol, None, b""),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_wrong_aad_fails() {
        let bob = EncryptionKeyPair::generate();
        let sealed = seal_ephemeral(b"secret", &bob.public_bytes(), b"a").unwrap();

        assert!(matches!(
            open(&sealed, &bob, None, b"b"),
            Err(Error::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_open_without_any_peer_key_fails() {
        let alice = EncryptionKeyPair::generate();
        let bob = EncryptionKeyPair::generate();
        let sealed = seal(b"x", &alice, &bob.public_bytes(), b"").unwrap();

        assert!(matches!(open(&sealed, &bob, None, b""), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn test_seal_to_low_order_point_rejected() {
        assert!(matches!(
            seal_ephemeral(b"x", &[0u8; 32], b""),
            Err(Error::KeyExchangeFailed(_))
        ));
    }

    #[test]
    fn test_bytes_form_roundtrip_and_truncation() {
        let bob = EncryptionKeyPair::generate();
        let sealed = seal_ephemeral(b"payload", &bob.public_bytes(), b"").unwrap();

        let bytes = sealed.to_bytes();
        assert_eq!(bytes.len(), 1 + 32 + MIN_BLOB_SIZE + 7);
        assert_eq!(SealedBox::from_bytes(&bytes).unwrap(), sealed);

        assert!(matches!(SealedBox::from_bytes(&bytes[..40]), Err(Error::Format(_))));
        assert!(matches!(SealedBox::from_bytes(&[]), Err(Error::Format(_))));
        assert!(matches!(SealedBox::from_bytes(&[9u8; 64]), Err(Error::Format(_))));
    }

    #[test]
    fn test_json_form_uses_base64_fields() {
        let bob = EncryptionKeyPair::generate();
        let sealed = seal_ephemeral(b"payload", &bob.public_bytes(), b"").unwrap();

        let json = serde_json::to_value(&sealed).unwrap();
        assert!(json["iv"].is_string());
        assert!(json["senderPublicKey"].is_string());

        let restored: SealedBox = serde_json::from_value(json).unwrap();
        assert_eq!(open(&restored, &bob, None, b"").unwrap(), b"payload");
    }
}
