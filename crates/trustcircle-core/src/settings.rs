//! Process-wide cryptographic settings.
//!
//! Settings are an explicit value handed to the components that need them
//! (the salt codec and the password KDF). There is no global instance.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kdf::PasswordKdf;

/// Charset used to turn a legacy textual salt into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    #[default]
    Utf8,
    /// ISO-8859-1. Characters outside the charset become `?`.
    Latin1,
}

impl Charset {
    /// Encode text in this charset.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

/// Argon2id parameters for the password-derived key function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Cheap parameters for tests. Never use in production.
    pub const fn insecure_fast() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Cryptographic settings for a Trust Circle process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Password KDF parameters.
    pub kdf: KdfParams,
    /// Charset for legacy salts.
    pub salt_charset: Charset,
    /// Minimum accepted passphrase length, in characters.
    pub min_passphrase_len: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            salt_charset: Charset::Utf8,
            min_passphrase_len: 8,
        }
    }
}

impl Settings {
    /// Settings with fast KDF parameters, for tests.
    pub fn insecure_fast() -> Self {
        Self {
            kdf: KdfParams::insecure_fast(),
            ..Self::default()
        }
    }

    /// Load settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json).map_err(|e| {
            Error::settings_invalid("settings could not be parsed").with_source(e)
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject parameters the KDF cannot run with.
    pub fn validate(&self) -> Result<()> {
        PasswordKdf::new(&self.kdf)?;

        if self.min_passphrase_len == 0 {
            return Err(Error::settings_invalid(
                "minimum passphrase length must be at least 1",
            ));
        }

        Ok(())
    }

    /// Check a passphrase against the configured policy.
    pub fn check_passphrase(&self, passphrase: &str) -> Result<()> {
        if passphrase.chars().count() < self.min_passphrase_len {
            return Err(Error::setting(format!(
                "passphrase must be at least {} characters",
                self.min_passphrase_len
            )));
        }
        Ok(())
    }
}
