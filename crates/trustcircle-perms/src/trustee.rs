//! Trustees: envelope key distribution.
//!
//! A trustee binds a member to a circle's key at a trust level, carrying
//! the circle secret sealed under the member's public key. To recover the
//! secret a member derives their password key, unlocks their private key,
//! and opens the sealed key with it.
//!
//! Nothing here checks trust levels. Callers authorize with
//! [`TrustLevel::is_allowed`] before unlocking.

use serde::{Deserialize, Serialize};

use trustcircle_core::{
    armor, CircleId, Error, KeyId, MemberId, PasswordKdf, Result, SecretKey, TrustLevel,
    TrusteeId,
};

use crate::circle::KeyRecord;
use crate::envelope::SealedKey;
use crate::member::Member;

/// A (member, circle, trust level) grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trustee {
    pub id: TrusteeId,

    pub member_id: MemberId,

    pub circle_id: CircleId,

    /// The circle key this grant was sealed from.
    pub key_id: KeyId,

    pub trust_level: TrustLevel,

    /// CBOR-encoded [`SealedKey`] holding the circle secret.
    #[serde(with = "armor::bytes")]
    pub circle_key: Vec<u8>,

    /// Creation time (Unix ms), assigned by the store.
    pub added: i64,

    /// Last modification time (Unix ms), assigned by the store.
    pub altered: i64,
}

impl Trustee {
    /// Decode the sealed circle key.
    pub fn sealed_key(&self) -> Result<SealedKey> {
        SealedKey::from_bytes(&self.circle_key)
    }
}

/// Binds a sealed key to the member and key it was made for.
fn seal_context(member_id: &MemberId, key_id: &KeyId) -> Vec<u8> {
    let mut context = Vec::with_capacity(32);
    context.extend_from_slice(member_id.as_bytes());
    context.extend_from_slice(key_id.as_bytes());
    context
}

/// Grant `member` access to the circle behind `key` at `trust_level`.
///
/// `existing` are the circle's current trustees; a second grant for the
/// same member fails with `IllegalAction`. An unparsable member public key
/// fails with `CryptoError`.
pub fn add_trustee(
    secret: &SecretKey,
    key: &KeyRecord,
    member: &Member,
    trust_level: TrustLevel,
    existing: &[Trustee],
) -> Result<Trustee> {
    key.ensure_active()?;

    if existing
        .iter()
        .any(|t| t.member_id == member.id && t.circle_id == key.circle_id)
    {
        return Err(Error::illegal_action("member is already a trustee of this circle"));
    }

    let public_key = member.public_key()?;
    let sealed = SealedKey::seal(secret, &public_key, &seal_context(&member.id, &key.id))?;

    tracing::debug!(
        member = %member.id,
        circle = %key.circle_id,
        level = %trust_level,
        "sealed circle key for trustee"
    );

    Ok(Trustee {
        id: TrusteeId::generate(),
        member_id: member.id,
        circle_id: key.circle_id,
        key_id: key.id,
        trust_level,
        circle_key: sealed.to_bytes()?,
        added: 0,
        altered: 0,
    })
}

/// Recover the circle secret from a trustee record.
///
/// The member's private key is dropped before this function returns, on
/// every path. A wrong passphrase fails with `AuthenticationWarning`; a
/// sealed key that does not open fails with `CryptoError`.
pub fn unlock_circle_key(
    member: &Member,
    passphrase: &str,
    trustee: &Trustee,
    kdf: &PasswordKdf,
) -> Result<SecretKey> {
    if trustee.member_id != member.id {
        return Err(Error::illegal_action("trustee belongs to another member"));
    }

    let sealed = trustee.sealed_key()?;
    let private = member.unlock(passphrase, kdf)?;
    let opened = sealed.open(&private, &seal_context(&member.id, &trustee.key_id));
    drop(private);

    opened.map_err(|e| {
        tracing::warn!(trustee = %trustee.id, code = %e.code(), "circle key unlock failed");
        e
    })
}

/// Change a trustee's level in place. The sealed key is untouched.
pub fn update_trust_level(trustee: &mut Trustee, trust_level: TrustLevel) {
    trustee.trust_level = trust_level;
}

/// Remove `member`'s grant from `trustees`, returning it.
///
/// The circle secret is not rotated: a revoked member who kept a copy of
/// it can still read the circle's data.
pub fn remove_trustee(trustees: &mut Vec<Trustee>, member_id: &MemberId) -> Result<Trustee> {
    let index = trustees
        .iter()
        .position(|t| &t.member_id == member_id)
        .ok_or_else(|| Error::identification("member is not a trustee of this circle"))?;

    Ok(trustees.remove(index))
}
