//! Key abstraction layer.
//!
//! Wraps raw key material with the algorithm it belongs to. Symmetric keys
//! ([`SecretKey`]) encrypt circle data and unlock private keys; asymmetric
//! keys ([`KeyPair`]) sign content and receive sealed circle keys.

use std::fmt;

use ed25519_dalek::{Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::armor;
use crate::error::{Error, Result};
use crate::salt::Salt;

/// Length of every symmetric key in bytes.
pub const SECRET_KEY_LEN: usize = 32;

/// Algorithm identifier carried alongside key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// 256-bit key for XChaCha20-Poly1305.
    XChaCha20Poly1305,
    /// Ed25519 signing pair. Also usable for X25519 key agreement.
    Ed25519,
}

impl Algorithm {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Algorithm::XChaCha20Poly1305 => "XChaCha20Poly1305",
            Algorithm::Ed25519 => "Ed25519",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform view over key material.
pub trait CryptoKey {
    /// Raw key bytes. Deterministic for a given key.
    fn encoded(&self) -> &[u8];

    fn algorithm(&self) -> Algorithm;
}

/// A symmetric key, optionally paired with the salt it was made with.
///
/// Key bytes are wiped on drop.
#[derive(Clone)]
pub struct SecretKey {
    key: Zeroizing<[u8; SECRET_KEY_LEN]>,
    salt: Option<Salt>,
}

impl SecretKey {
    /// Generate a new random key with a fresh salt.
    pub fn generate() -> Self {
        let mut key = Zeroizing::new([0u8; SECRET_KEY_LEN]);
        OsRng.fill_bytes(key.as_mut_slice());
        Self {
            key,
            salt: Some(Salt::generate()),
        }
    }

    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; SECRET_KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(bytes),
            salt: None,
        }
    }

    /// Create from a slice, which must be exactly [`SECRET_KEY_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr = <[u8; SECRET_KEY_LEN]>::try_from(bytes).map_err(|_| {
            Error::crypto(format!(
                "invalid key length: expected {SECRET_KEY_LEN}, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self::from_bytes(arr))
    }

    /// Attach the salt associated with this key.
    pub fn with_salt(mut self, salt: Salt) -> Self {
        self.salt = Some(salt);
        self
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_LEN] {
        &self.key
    }

    pub fn salt(&self) -> Option<&Salt> {
        self.salt.as_ref()
    }
}

impl CryptoKey for SecretKey {
    fn encoded(&self) -> &[u8] {
        self.key.as_slice()
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::XChaCha20Poly1305
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey").field("salt", &self.salt).finish_non_exhaustive()
    }
}

/// The public half of a member's key pair.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parse from raw bytes. Fails if the bytes are not a curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self> {
        VerifyingKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| Error::crypto("public key could not be parsed"))
    }

    /// Parse from its Base64 armor.
    pub fn from_armored(text: &str) -> Result<Self> {
        let bytes = armor::decode_fixed::<32>(text)
            .map_err(|_| Error::crypto("public key could not be parsed"))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_armored(&self) -> String {
        armor::encode(self.0.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// The X25519 (Montgomery) form of this key, for key agreement.
    pub fn to_montgomery_bytes(&self) -> [u8; 32] {
        self.0.to_montgomery().to_bytes()
    }

    /// Verify a signature over a message.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        let sig = DalekSignature::from_bytes(&signature.0);
        self.0
            .verify(message, &sig)
            .map_err(|_| Error::signature())
    }
}

impl CryptoKey for PublicKey {
    fn encoded(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Ed25519
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &hex::encode(self.0.as_bytes())[..16])
    }
}

/// The private half of a member's key pair.
///
/// Never persisted in this form; see the member key protection in the
/// permissions crate. Key bytes are wiped on drop.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    /// Create from a slice, which must be a 32-byte seed.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let seed = Zeroizing::new(
            <[u8; 32]>::try_from(bytes)
                .map_err(|_| Error::crypto("private key has an invalid length"))?,
        );
        Ok(Self::from_seed(&seed))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }

    /// The X25519 scalar for this key, for key agreement.
    pub fn to_scalar_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.0.to_scalar_bytes())
    }
}

impl CryptoKey for PrivateKey {
    fn encoded(&self) -> &[u8] {
        self.0.as_bytes()
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Ed25519
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(for {:?})", self.public_key())
    }
}

/// A public/private pair sharing one algorithm.
#[derive(Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let private = PrivateKey(SigningKey::generate(&mut OsRng));
        Self::from_private(private)
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::from_private(PrivateKey::from_seed(seed))
    }

    pub fn from_private(private: PrivateKey) -> Self {
        Self {
            public: private.public_key(),
            private,
        }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    pub fn algorithm(&self) -> Algorithm {
        Algorithm::Ed25519
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyPair({:?})", self.public)
    }
}

/// A 64-byte Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature(#[serde(with = "armor::fixed")] pub [u8; 64]);

impl Signature {
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &hex::encode(self.0)[..16])
    }
}

/// A 32-byte BLAKE3 checksum of signed content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(#[serde(with = "armor::fixed")] pub [u8; 32]);

impl Checksum {
    /// Compute the checksum of the given content.
    pub fn of(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Checksum({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
