//! Base64 armor for binary fields.
//!
//! Keys, ciphertexts and signatures cross textual boundaries as standard
//! Base64. The `bytes` and `fixed` submodules plug into serde's `with`.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{Error, Result};

/// Armor bytes as standard Base64.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard Base64.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|_| Error::verification("value is not valid Base64"))
}

/// Decode standard Base64 into exactly `N` bytes.
pub fn decode_fixed<const N: usize>(text: &str) -> Result<[u8; N]> {
    let decoded = decode(text)?;
    <[u8; N]>::try_from(decoded.as_slice()).map_err(|_| {
        Error::verification(format!(
            "expected {N} bytes, got {}",
            decoded.len()
        ))
    })
}

/// serde adapter for `Vec<u8>` fields.
pub mod bytes {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode(&text).map_err(D::Error::custom)
    }
}

/// serde adapter for `[u8; N]` fields.
pub mod fixed {
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_fixed(&text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::ReturnCode;

    #[test]
    fn test_encode_decode() {
        let text = encode(b"hello");
        assert_eq!(text, "aGVsbG8=");
        assert_eq!(decode(&text).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode("***").unwrap_err();
        assert_eq!(err.code(), ReturnCode::VerificationWarning);
    }

    #[test]
    fn test_decode_fixed_length_mismatch() {
        let err = decode_fixed::<32>(&encode([0u8; 16])).unwrap_err();
        assert_eq!(err.code(), ReturnCode::VerificationWarning);
        assert_eq!(decode_fixed::<16>(&encode([7u8; 16])).unwrap(), [7u8; 16]);
    }
}
