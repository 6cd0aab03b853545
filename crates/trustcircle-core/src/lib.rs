//! # Trust Circle Core
//!
//! Pure primitives for Trust Circles: trust levels, return codes, key
//! material, salts, password-derived keys and the data cipher.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over key material and the error model around it.
//!
//! ## Key Types
//!
//! - [`TrustLevel`] - Graded permission, `All < Read < Write < Admin < Sysop`
//! - [`ReturnCode`] - Closed catalogue of outcomes
//! - [`Error`] - The one error type, tagged with a [`ReturnCode`]
//! - [`SecretKey`], [`KeyPair`] - Key material behind the [`CryptoKey`] trait
//! - [`Salt`] - 16 bytes of IV/salt material with legacy decoding
//! - [`PasswordKdf`] - Argon2id passphrase-to-key derivation
//! - [`EncryptedData`] - Payloads encrypted under a circle key
//!
//! ## Settings
//!
//! Algorithm parameters live in [`Settings`], passed explicitly to the
//! components that need them. [`CryptoProvider::initialize`] validates them
//! and self-tests the provider at process start.

pub mod armor;
pub mod cipher;
pub mod code;
pub mod crypto;
pub mod error;
pub mod kdf;
pub mod provider;
pub mod salt;
pub mod settings;
pub mod trust;
pub mod types;

pub use cipher::{CipherFormat, EncryptedData};
pub use code::{Classification, ReturnCode};
pub use crypto::{
    Algorithm, Checksum, CryptoKey, KeyPair, PrivateKey, PublicKey, SecretKey, Signature,
    SECRET_KEY_LEN,
};
pub use error::{Error, Result};
pub use kdf::PasswordKdf;
pub use provider::CryptoProvider;
pub use salt::{Salt, ARMORED_SALT_LEN, SALT_LEN};
pub use settings::{Charset, KdfParams, Settings};
pub use trust::TrustLevel;
pub use types::{now_millis, CircleId, KeyId, MemberId, TrusteeId, DAY_MILLIS};
