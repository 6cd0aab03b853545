//! Password-derived keys.
//!
//! Argon2id turns a member's passphrase and per-member salt into the
//! symmetric key that unlocks the member's private key. It is never used to
//! derive circle keys.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::Zeroizing;

use crate::crypto::{SecretKey, SECRET_KEY_LEN};
use crate::error::{Error, Result};
use crate::salt::Salt;
use crate::settings::KdfParams;

/// Output length of the KDF.
pub const DERIVED_KEY_LEN: usize = SECRET_KEY_LEN;

/// Derives symmetric keys from passphrases with fixed parameters.
#[derive(Debug, Clone)]
pub struct PasswordKdf {
    params: Params,
}

impl PasswordKdf {
    /// Build a KDF from settings. Fails if the parameters are unusable.
    pub fn new(params: &KdfParams) -> Result<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(DERIVED_KEY_LEN),
        )
        .map_err(|e| Error::settings_invalid(format!("invalid KDF parameters: {e}")))?;

        Ok(Self { params })
    }

    /// Derive the key for `passphrase` under `salt`. Deterministic.
    pub fn derive(&self, passphrase: &str, salt: &Salt) -> Result<SecretKey> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());

        let mut output = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
        argon2
            .hash_password_into(passphrase.as_bytes(), salt.raw_bytes(), output.as_mut_slice())
            .map_err(|e| Error::crypto(format!("key derivation failed: {e}")))?;

        Ok(SecretKey::from_bytes(*output).with_salt(salt.clone()))
    }
}
