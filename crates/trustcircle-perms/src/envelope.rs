//! Sealed circle keys.
//!
//! A circle's symmetric secret is sealed once per trustee under that
//! member's public key. The sealed form is CBOR-encoded into the trustee's
//! opaque `circle_key` field.

use serde::{Deserialize, Serialize};

use trustcircle_core::{CryptoKey, Error, PrivateKey, PublicKey, Result, SecretKey};

use crate::crypto::{EphemeralKeyPair, WrapNonce, X25519PublicKey, X25519Secret};

/// Version tag of the sealed-key layout.
pub const SEALED_KEY_VERSION: u8 = 1;

/// A circle secret encrypted for one recipient.
///
/// The key is encrypted using X25519 ECDH + ChaCha20-Poly1305.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedKey {
    /// Layout version.
    pub version: u8,

    /// Ephemeral X25519 public key (sender's side of ECDH).
    pub ephemeral_public: X25519PublicKey,

    /// Nonce used for encryption.
    pub nonce: WrapNonce,

    /// The circle secret, encrypted with the derived wrap key.
    pub encrypted_key: Vec<u8>,
}

impl SealedKey {
    /// Seal `secret` for `recipient`.
    ///
    /// `context` must be reproduced exactly when opening; it binds the
    /// sealed key to the grant it belongs to.
    pub fn seal(secret: &SecretKey, recipient: &PublicKey, context: &[u8]) -> Result<Self> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let shared = ephemeral.diffie_hellman(&X25519PublicKey::from_member(recipient));
        let wrap_key = shared.derive_wrap_key(context);

        let nonce = WrapNonce::generate();
        let encrypted_key = wrap_key.encrypt(secret.encoded(), &nonce)?;

        Ok(Self {
            version: SEALED_KEY_VERSION,
            ephemeral_public,
            nonce,
            encrypted_key,
        })
    }

    /// Open with the recipient's private key.
    pub fn open(&self, recipient: &PrivateKey, context: &[u8]) -> Result<SecretKey> {
        if self.version != SEALED_KEY_VERSION {
            return Err(Error::corrupted(format!(
                "unsupported sealed key version {}",
                self.version
            )));
        }

        let secret = X25519Secret::from_member(recipient);
        let shared = secret.diffie_hellman(&self.ephemeral_public);
        let wrap_key = shared.derive_wrap_key(context);

        let key_bytes = wrap_key.decrypt(&self.encrypted_key, &self.nonce)?;
        SecretKey::from_slice(&key_bytes)
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| Error::crypto("sealed key could not be encoded").with_source(e))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes)
            .map_err(|e| Error::corrupted("sealed key could not be decoded").with_source(e))
    }
}
