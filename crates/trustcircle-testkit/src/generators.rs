//! Proptest generators for property-based testing.

use proptest::prelude::*;

use trustcircle_core::{
    Charset, KeyPair, Salt, SecretKey, TrustLevel, DAY_MILLIS, SALT_LEN, SECRET_KEY_LEN,
};
use trustcircle_perms::{sign, SignatureRecord};

/// Generate a TrustLevel.
pub fn trust_level() -> impl Strategy<Value = TrustLevel> {
    prop_oneof![
        Just(TrustLevel::All),
        Just(TrustLevel::Read),
        Just(TrustLevel::Write),
        Just(TrustLevel::Admin),
        Just(TrustLevel::Sysop),
    ]
}

/// Generate a deterministic key pair.
pub fn keypair() -> impl Strategy<Value = KeyPair> {
    any::<[u8; 32]>().prop_map(|seed| KeyPair::from_seed(&seed))
}

/// Generate a circle secret.
pub fn secret_key() -> impl Strategy<Value = SecretKey> {
    any::<[u8; SECRET_KEY_LEN]>().prop_map(SecretKey::from_bytes)
}

/// Generate a salt from raw bytes.
pub fn salt() -> impl Strategy<Value = Salt> {
    any::<[u8; SALT_LEN]>().prop_map(Salt::from_bytes)
}

/// Generate legacy salt text: printable, never a canonical armored salt.
pub fn legacy_salt_text() -> impl Strategy<Value = String> {
    "[ -~]{0,23}".prop_map(String::from)
}

pub fn charset() -> impl Strategy<Value = Charset> {
    prop_oneof![Just(Charset::Utf8), Just(Charset::Latin1)]
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a member or circle name.
pub fn name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,31}".prop_map(String::from)
}

/// Parameters for generating a signature record.
#[derive(Debug, Clone)]
pub struct SignatureParams {
    pub keypair: KeyPair,
    pub content: Vec<u8>,
    /// Signing time (Unix ms).
    pub now: i64,
    /// Expiry relative to `now`, if any.
    pub expires_in: Option<i64>,
}

impl Arbitrary for SignatureParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<[u8; 32]>(),
            payload(512),
            1_000_000_000_000i64..=2_000_000_000_000i64,
            prop::option::of(-DAY_MILLIS..=DAY_MILLIS),
        )
            .prop_map(|(seed, content, now, expires_in)| SignatureParams {
                keypair: KeyPair::from_seed(&seed),
                content,
                now,
                expires_in,
            })
            .boxed()
    }
}

/// Sign the parameters' content.
pub fn record_from_params(params: &SignatureParams) -> SignatureRecord {
    sign(
        params.keypair.private_key(),
        &params.content,
        params.expires_in.map(|offset| params.now + offset),
        params.now,
    )
}
