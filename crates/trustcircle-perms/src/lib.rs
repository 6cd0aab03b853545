//! # Trust Circle Permissions
//!
//! Members, circles, trustees and signatures.
//!
//! ## Overview
//!
//! Every circle owns one symmetric secret. The secret is never stored in
//! the clear; instead it is sealed once per trustee under that member's
//! public key. A member recovers it by unlocking their own private key with
//! their passphrase and opening the sealed copy.
//!
//! ## Key Concepts
//!
//! - **Member**: An account with a passphrase-protected Ed25519 key pair
//! - **Circle**: A trust group with one active symmetric key
//! - **Trustee**: A grant binding a member to a circle at a [`TrustLevel`]
//! - **SignatureRecord**: A signature with expiry and usage accounting
//!
//! ## Envelope Model
//!
//! 1. **Circle Key**: XChaCha20-Poly1305 secret that encrypts circle data
//! 2. **Sealed Keys**: The circle key, wrapped per trustee via X25519 ECDH
//!
//! Revoking a trustee deletes their sealed key. The circle key itself is
//! not rotated.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trustcircle_core::{PasswordKdf, Settings, TrustLevel};
//! use trustcircle_perms::{add_trustee, unlock_circle_key, Member, NewCircle};
//!
//! let settings = Settings::default();
//! let kdf = PasswordKdf::new(&settings.kdf).unwrap();
//!
//! let alice = Member::register("alice", "correct horse", &settings, &kdf).unwrap();
//! let board = NewCircle::create("board").unwrap();
//!
//! let trustee = add_trustee(&board.secret, &board.key, &alice, TrustLevel::Sysop, &[]).unwrap();
//! let secret = unlock_circle_key(&alice, "correct horse", &trustee, &kdf).unwrap();
//! ```
//!
//! [`TrustLevel`]: trustcircle_core::TrustLevel

pub mod circle;
pub mod crypto;
pub mod envelope;
pub mod member;
pub mod signature;
pub mod trustee;

pub use circle::{Circle, KeyRecord, KeyStatus, NewCircle};
pub use crypto::{EphemeralKeyPair, SharedKey, WrapKey, WrapNonce, X25519PublicKey, X25519Secret};
pub use envelope::{SealedKey, SEALED_KEY_VERSION};
pub use member::Member;
pub use signature::{
    sign, verify, SignatureRecord, VerificationFailure, VerificationOutcome,
};
pub use trustee::{add_trustee, remove_trustee, unlock_circle_key, update_trust_level, Trustee};
