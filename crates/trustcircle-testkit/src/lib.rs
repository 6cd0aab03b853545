//! # Trust Circle Testkit
//!
//! Testing utilities for Trust Circles.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A service over a memory store with cheap KDF settings,
//!   members with known passphrases, and pre-populated circles
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use trustcircle_testkit::generators::{record_from_params, SignatureParams};
//!
//! proptest! {
//!     #[test]
//!     fn fresh_records_are_unverified(params: SignatureParams) {
//!         let record = record_from_params(&params);
//!         prop_assert_eq!(record.verifications, 0);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,no_run
//! use trustcircle::TrustLevel;
//! use trustcircle_testkit::fixtures::TestFixture;
//!
//! async fn example() -> trustcircle::Result<()> {
//!     let fixture = TestFixture::new();
//!     let alice = fixture.member("alice").await?;
//!     let bob = fixture.member("bob").await?;
//!     let board = fixture.circle("board", &alice, &[(&bob, TrustLevel::Read)]).await?;
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{fast_crypto, multi_member_fixture, TestFixture, TestMember};
pub use generators::{record_from_params, SignatureParams};
