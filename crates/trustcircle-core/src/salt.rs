//! Salt and IV material.
//!
//! A [`Salt`] is 16 bytes of initialization material. It is armored as
//! standard Base64 (24 characters). Older records stored free-form text
//! (typically a UUID) instead; those are still accepted and mapped onto
//! 16 bytes through the configured charset.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::settings::Charset;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Length of the Base64 armor for [`SALT_LEN`] bytes.
pub const ARMORED_SALT_LEN: usize = 24;

/// 16 bytes of initialization material plus the text it was read from.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt {
    armored: String,
    bytes: [u8; SALT_LEN],
}

impl Salt {
    /// Draw a fresh salt from the operating system's secure RNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Wrap raw bytes, armoring them in the canonical form.
    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self {
            armored: STANDARD.encode(bytes),
            bytes,
        }
    }

    /// Parse a stored salt with the default (UTF-8) charset.
    pub fn from_text(text: &str) -> Self {
        Self::from_text_with(text, Charset::Utf8)
    }

    /// Parse a stored salt.
    ///
    /// Canonical Base64 is tried first when the length matches. Anything
    /// else is a legacy salt: its encoded bytes are copied into a zeroed
    /// 16-byte buffer, truncating or leaving the tail zero.
    pub fn from_text_with(text: &str, charset: Charset) -> Self {
        let bytes = decode_canonical(text).unwrap_or_else(|| decode_legacy(text, charset));
        Self {
            armored: text.to_string(),
            bytes,
        }
    }

    /// The textual form this salt is stored as.
    pub fn armored(&self) -> &str {
        &self.armored
    }

    /// Always exactly 16 bytes, whichever way the salt was built.
    pub fn raw_bytes(&self) -> &[u8; SALT_LEN] {
        &self.bytes
    }
}

fn decode_canonical(text: &str) -> Option<[u8; SALT_LEN]> {
    if text.len() != ARMORED_SALT_LEN {
        return None;
    }
    STANDARD
        .decode(text)
        .ok()
        .and_then(|decoded| <[u8; SALT_LEN]>::try_from(decoded.as_slice()).ok())
}

fn decode_legacy(text: &str, charset: Charset) -> [u8; SALT_LEN] {
    let encoded = charset.encode(text);
    let mut bytes = [0u8; SALT_LEN];
    let n = encoded.len().min(SALT_LEN);
    bytes[..n].copy_from_slice(&encoded[..n]);
    bytes
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.armored)
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.armored)
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Salt::from_text(&text))
    }
}
