//! Start-up checks for the cryptographic provider.
//!
//! Failing to initialize the secure RNG, the KDF or the cipher is the one
//! condition that should stop the process. Everything after start-up fails
//! per request.

use rand::{rngs::OsRng, RngCore};

use crate::cipher;
use crate::crypto::KeyPair;
use crate::error::{Error, Result};
use crate::kdf::PasswordKdf;
use crate::salt::Salt;
use crate::settings::Settings;

const SELF_TEST_PLAINTEXT: &[u8] = b"trustcircle provider self-test";

/// A validated set of settings with a working KDF.
#[derive(Debug, Clone)]
pub struct CryptoProvider {
    settings: Settings,
    kdf: PasswordKdf,
}

impl CryptoProvider {
    /// Validate settings and run the provider self-test.
    pub fn initialize(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let kdf = PasswordKdf::new(&settings.kdf)?;

        let mut probe = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut probe)
            .map_err(|e| Error::crypto("secure random source unavailable").with_source(e))?;

        let salt = Salt::generate();
        let derived = kdf.derive("self-test", &salt)?;
        let ciphertext = cipher::encrypt(&derived, &salt, SELF_TEST_PLAINTEXT)?;
        let roundtrip = cipher::decrypt(&derived, &salt, &ciphertext)
            .map_err(|_| Error::crypto("cipher self-test failed"))?;
        if roundtrip != SELF_TEST_PLAINTEXT {
            return Err(Error::crypto("cipher self-test failed"));
        }

        let keypair = KeyPair::generate();
        let signature = keypair.private_key().sign(SELF_TEST_PLAINTEXT);
        keypair
            .public_key()
            .verify(SELF_TEST_PLAINTEXT, &signature)
            .map_err(|_| Error::crypto("signature self-test failed"))?;

        tracing::info!(
            kdf_memory_kib = settings.kdf.memory_kib,
            kdf_iterations = settings.kdf.iterations,
            "crypto provider initialized"
        );

        Ok(Self { settings, kdf })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn kdf(&self) -> &PasswordKdf {
        &self.kdf
    }

    /// Parse a stored salt with the configured charset.
    pub fn salt_from_text(&self, text: &str) -> Salt {
        Salt::from_text_with(text, self.settings.salt_charset)
    }
}
