//! Data cipher: symmetric encryption of payloads under a circle key.
//!
//! XChaCha20-Poly1305 keyed by the circle secret. The 24-byte nonce is
//! derived from the object's 16-byte salt, so every encrypted object must
//! carry its own salt. Any decryption failure surfaces as an integrity
//! warning.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use serde::{Deserialize, Serialize};

use crate::armor;
use crate::crypto::SecretKey;
use crate::error::{Error, Result};
use crate::salt::Salt;

const NONCE_CONTEXT: &str = "trustcircle v1 data-cipher nonce";

/// Format identifier for encrypted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CipherFormat {
    /// XChaCha20-Poly1305, nonce derived from a 16-byte salt.
    XChaCha20Poly1305 = 1,
}

fn nonce_for(salt: &Salt) -> XNonce {
    let derived = blake3::derive_key(NONCE_CONTEXT, salt.raw_bytes());
    *XNonce::from_slice(&derived[..24])
}

fn cipher_for(key: &SecretKey) -> XChaCha20Poly1305 {
    XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()))
}

/// Encrypt `plaintext` under `key`, using `salt` as the IV.
///
/// Never reuse a salt for two plaintexts under the same key.
pub fn encrypt(key: &SecretKey, salt: &Salt, plaintext: &[u8]) -> Result<Vec<u8>> {
    cipher_for(key)
        .encrypt(&nonce_for(salt), plaintext)
        .map_err(|_| Error::crypto("encryption failed"))
}

/// Decrypt `ciphertext` under `key`, using `salt` as the IV.
///
/// A wrong key, a wrong salt and tampered data are indistinguishable and
/// all fail with [`ReturnCode::IntegrityWarning`](crate::ReturnCode).
pub fn decrypt(key: &SecretKey, salt: &Salt, ciphertext: &[u8]) -> Result<Vec<u8>> {
    cipher_for(key)
        .decrypt(&nonce_for(salt), ciphertext)
        .map_err(|_| Error::integrity())
}

/// An encrypted object with the salt it was encrypted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Encryption algorithm used.
    pub format: CipherFormat,

    /// Salt used as IV (unique per object).
    pub salt: Salt,

    /// The encrypted data, including the authentication tag.
    #[serde(with = "armor::bytes")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedData {
    /// Encrypt plaintext under `key` with a fresh salt.
    pub fn encrypt(plaintext: &[u8], key: &SecretKey) -> Result<Self> {
        let salt = Salt::generate();
        let ciphertext = encrypt(key, &salt, plaintext)?;

        Ok(Self {
            format: CipherFormat::XChaCha20Poly1305,
            salt,
            ciphertext,
        })
    }

    /// Decrypt with the given key.
    pub fn decrypt(&self, key: &SecretKey) -> Result<Vec<u8>> {
        match self.format {
            CipherFormat::XChaCha20Poly1305 => decrypt(key, &self.salt, &self.ciphertext),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ReturnCode;
    use proptest::prelude::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = SecretKey::generate();
        let salt = Salt::generate();
        let plaintext = b"hello, encrypted world!";

        let ciphertext = encrypt(&key, &salt, plaintext).unwrap();
        assert_ne!(ciphertext.as_slice(), plaintext.as_slice());

        let decrypted = decrypt(&key, &salt, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let key = SecretKey::generate();
        let salt = Salt::generate();

        let ciphertext = encrypt(&key, &salt, b"").unwrap();
        assert_eq!(decrypt(&key, &salt, &ciphertext).unwrap(), b"");
    }

    #[test]
    fn test_wrong_key_is_integrity_warning() {
        let salt = Salt::generate();
        let ciphertext = encrypt(&SecretKey::generate(), &salt, b"secret").unwrap();

        let err = decrypt(&SecretKey::generate(), &salt, &ciphertext).unwrap_err();
        assert_eq!(err.code(), ReturnCode::IntegrityWarning);
    }

    #[test]
    fn test_wrong_salt_fails() {
        let key = SecretKey::generate();
        let ciphertext = encrypt(&key, &Salt::generate(), b"secret").unwrap();

        let err = decrypt(&key, &Salt::generate(), &ciphertext).unwrap_err();
        assert_eq!(err.code(), ReturnCode::IntegrityWarning);
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SecretKey::generate();
        let salt = Salt::generate();
        let mut ciphertext = encrypt(&key, &salt, b"secret").unwrap();
        ciphertext[0] ^= 0x01;

        let err = decrypt(&key, &salt, &ciphertext).unwrap_err();
        assert_eq!(err.code(), ReturnCode::IntegrityWarning);
    }

    #[test]
    fn test_legacy_salt_works_as_iv() {
        let key = SecretKey::generate();
        let salt = Salt::from_text("0f8fad5b-d9cb-469f-a165-70867728950e");

        let ciphertext = encrypt(&key, &salt, b"old record").unwrap();
        let reparsed = Salt::from_text(salt.armored());
        assert_eq!(decrypt(&key, &reparsed, &ciphertext).unwrap(), b"old record");
    }

    #[test]
    fn test_encrypted_data_uses_fresh_salts() {
        let key = SecretKey::generate();
        let a = EncryptedData::encrypt(b"same", &key).unwrap();
        let b = EncryptedData::encrypt(b"same", &key).unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_eq!(a.decrypt(&key).unwrap(), b"same");
    }

    #[test]
    fn test_encrypted_data_json_is_armored() {
        let key = SecretKey::generate();
        let data = EncryptedData::encrypt(b"payload", &key).unwrap();

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains(&armor::encode(&data.ciphertext)));

        let back: EncryptedData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decrypt(&key).unwrap(), b"payload");
    }

    proptest! {
        #[test]
        fn prop_roundtrip(plaintext in prop::collection::vec(any::<u8>(), 0..512)) {
            let key = SecretKey::generate();
            let salt = Salt::generate();
            let ciphertext = encrypt(&key, &salt, &plaintext).unwrap();
            prop_assert_eq!(decrypt(&key, &salt, &ciphertext).unwrap(), plaintext);
        }
    }
}
