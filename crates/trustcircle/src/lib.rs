//! # Trust Circles
//!
//! The unified API for Trust Circles: groups of members that share
//! encrypted data without exposing a plaintext secret to storage or to
//! anyone outside the group.
//!
//! ## Overview
//!
//! - **Members**: Accounts holding a passphrase-protected key pair
//! - **Circles**: Trust groups, each with one symmetric secret
//! - **Trustees**: Grants sealing the circle secret for one member at a trust level
//! - **Signatures**: Signed documents with expiry and usage accounting
//!
//! ## Trust Levels
//!
//! `Sysop > Admin > Write > Read > All`. Granting, revoking and changing
//! levels requires `Admin`; encrypting requires `Write`; decrypting requires
//! `Read`. A circle's creator is its first `Sysop`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use trustcircle::{TrustCircle, TrustCircleConfig, TrustLevel};
//! use trustcircle::store::MemoryStore;
//!
//! async fn example() -> trustcircle::Result<()> {
//!     let tc = TrustCircle::new(MemoryStore::new(), TrustCircleConfig::default())?;
//!
//!     let alice = tc.register_member("alice", "correct horse").await?;
//!     let bob = tc.register_member("bob", "battery staple").await?;
//!
//!     let (board, _) = tc.create_circle(&alice.id, "board").await?;
//!     tc.add_trustee(&alice.id, "correct horse", &board.id, &bob.id, TrustLevel::Read)
//!         .await?;
//!
//!     let sealed = tc.encrypt(&alice.id, "correct horse", &board.id, b"minutes").await?;
//!     let plain = tc.decrypt(&bob.id, "battery staple", &board.id, &sealed).await?;
//!     assert_eq!(plain, b"minutes");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `trustcircle::core` - Trust levels, return codes, keys, salts, ciphers
//! - `trustcircle::perms` - Members, circles, trustees, signatures
//! - `trustcircle::store` - The persistence boundary

pub mod service;

// Re-export component crates
pub use trustcircle_core as core;
pub use trustcircle_perms as perms;
pub use trustcircle_store as store;

// Re-export main types for convenience
pub use service::{TrustCircle, TrustCircleConfig};

// Re-export commonly used types
pub use trustcircle_core::{
    Checksum, CircleId, EncryptedData, Error, MemberId, Result, ReturnCode, Settings, TrustLevel,
};
pub use trustcircle_perms::{
    Circle, Member, SignatureRecord, Trustee, VerificationFailure, VerificationOutcome,
};
