//! Key agreement and key wrapping for sealed circle keys.
//!
//! Member key pairs are Ed25519. For envelope encryption we use the
//! birationally equivalent X25519 keys: an ephemeral X25519 secret agrees
//! with the member's Montgomery public key, the shared secret is stretched
//! with BLAKE3 into a wrap key, and the wrap key encrypts the circle secret
//! with ChaCha20-Poly1305.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey as DalekPublic, StaticSecret};
use zeroize::Zeroizing;

use trustcircle_core::{Error, PrivateKey, PublicKey, Result};

const WRAP_CONTEXT: &str = "trustcircle v1 circle-key wrap";

/// An X25519 public key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct X25519PublicKey(pub [u8; 32]);

impl X25519PublicKey {
    /// The X25519 form of a member's public key.
    pub fn from_member(public: &PublicKey) -> Self {
        Self(public.to_montgomery_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn to_dalek(self) -> DalekPublic {
        DalekPublic::from(self.0)
    }
}

/// The X25519 form of a member's private key. Wiped on drop.
pub struct X25519Secret(StaticSecret);

impl X25519Secret {
    pub fn from_member(private: &PrivateKey) -> Self {
        let scalar = private.to_scalar_bytes();
        Self(StaticSecret::from(*scalar))
    }

    pub fn public_key(&self) -> X25519PublicKey {
        X25519PublicKey(*DalekPublic::from(&self.0).as_bytes())
    }

    pub fn diffie_hellman(&self, peer: &X25519PublicKey) -> SharedKey {
        let shared = self.0.diffie_hellman(&peer.to_dalek());
        SharedKey(Zeroizing::new(*shared.as_bytes()))
    }
}

/// Ephemeral key pair for one-time key agreement.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: X25519PublicKey,
}

impl EphemeralKeyPair {
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(OsRng);
        let public = X25519PublicKey(*DalekPublic::from(&secret).as_bytes());
        Self { secret, public }
    }

    pub fn public_key(&self) -> X25519PublicKey {
        self.public
    }

    /// Consumes the ephemeral secret (can only be used once).
    pub fn diffie_hellman(self, peer: &X25519PublicKey) -> SharedKey {
        let shared = self.secret.diffie_hellman(&peer.to_dalek());
        SharedKey(Zeroizing::new(*shared.as_bytes()))
    }
}

/// A shared secret derived from X25519 key agreement.
pub struct SharedKey(Zeroizing<[u8; 32]>);

impl SharedKey {
    /// Derive the wrap key for a particular grant.
    ///
    /// `context` binds the wrap key to the grant it was made for.
    pub fn derive_wrap_key(&self, context: &[u8]) -> WrapKey {
        let mut hasher = blake3::Hasher::new_derive_key(WRAP_CONTEXT);
        hasher.update(self.0.as_slice());
        hasher.update(context);
        WrapKey(Zeroizing::new(*hasher.finalize().as_bytes()))
    }
}

/// A 96-bit nonce for ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapNonce(pub [u8; 12]);

impl WrapNonce {
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// Symmetric key that wraps a circle secret for one recipient.
pub struct WrapKey(Zeroizing<[u8; 32]>);

impl WrapKey {
    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(self.0.as_slice()))
    }

    pub fn encrypt(&self, plaintext: &[u8], nonce: &WrapNonce) -> Result<Vec<u8>> {
        self.cipher()
            .encrypt(Nonce::from_slice(&nonce.0), plaintext)
            .map_err(|_| Error::crypto("circle key could not be sealed"))
    }

    /// Unwrap. Failure means the wrong recipient or a damaged envelope.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &WrapNonce) -> Result<Zeroizing<Vec<u8>>> {
        self.cipher()
            .decrypt(Nonce::from_slice(&nonce.0), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| Error::crypto("circle key could not be opened"))
    }
}
