//! Store trait: the persistence boundary for Trust Circles.
//!
//! The core never touches storage itself. It loads records through this
//! trait, transforms them, and hands them back for persistence.

use async_trait::async_trait;
use trustcircle_core::{Checksum, CircleId, KeyId, MemberId, TrusteeId};
use trustcircle_perms::{Circle, KeyRecord, Member, SignatureRecord, Trustee};

use crate::error::Result;

/// The Store trait: async interface for record persistence.
///
/// # Timestamps
///
/// Every insert assigns `added` and `altered`; every update refreshes
/// `altered` and keeps the stored `added`. The returned record carries the
/// assigned values.
///
/// # Uniqueness
///
/// - Member and circle names are unique.
/// - A circle has at most one active key.
/// - A member holds at most one trustee grant per circle.
///
/// Violations fail with [`StoreError::Constraint`](crate::StoreError::Constraint).
/// This is the storage-side guard for racing grants; the core rejects
/// duplicates it can see with `IllegalAction` before ever reaching here.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Members
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_member(&self, member: &Member) -> Result<Member>;

    async fn update_member(&self, member: &Member) -> Result<Member>;

    async fn get_member(&self, id: &MemberId) -> Result<Option<Member>>;

    async fn get_member_by_name(&self, name: &str) -> Result<Option<Member>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Circles
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_circle(&self, circle: &Circle) -> Result<Circle>;

    /// Store a new circle together with its first key and its owner's grant
    /// in one write. Either all three records are stored or none is.
    async fn create_circle(
        &self,
        circle: &Circle,
        key: &KeyRecord,
        owner: &Trustee,
    ) -> Result<(Circle, KeyRecord, Trustee)>;

    async fn get_circle(&self, id: &CircleId) -> Result<Option<Circle>>;

    async fn get_circle_by_name(&self, name: &str) -> Result<Option<Circle>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_key(&self, key: &KeyRecord) -> Result<KeyRecord>;

    /// Update key metadata, e.g. to deprecate it.
    async fn update_key(&self, key: &KeyRecord) -> Result<KeyRecord>;

    async fn get_key(&self, id: &KeyId) -> Result<Option<KeyRecord>>;

    /// The circle's active key, if any.
    async fn get_active_key(&self, circle_id: &CircleId) -> Result<Option<KeyRecord>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Trustees
    // ─────────────────────────────────────────────────────────────────────────

    async fn insert_trustee(&self, trustee: &Trustee) -> Result<Trustee>;

    async fn update_trustee(&self, trustee: &Trustee) -> Result<Trustee>;

    async fn delete_trustee(&self, id: &TrusteeId) -> Result<()>;

    /// The grant binding `member_id` to `circle_id`, if any.
    async fn get_trustee(
        &self,
        member_id: &MemberId,
        circle_id: &CircleId,
    ) -> Result<Option<Trustee>>;

    /// All grants in a circle, oldest first.
    async fn list_trustees_for_circle(&self, circle_id: &CircleId) -> Result<Vec<Trustee>>;

    /// All grants a member holds, oldest first.
    async fn list_trustees_for_member(&self, member_id: &MemberId) -> Result<Vec<Trustee>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Signatures
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert the record for (checksum, signer), or replace it with its
    /// next verification.
    ///
    /// A stored record may only be replaced by one exactly one verification
    /// ahead. A fresh record for content already signed by the same key, or
    /// a stale write that lost a concurrent verification, fails with
    /// `Constraint`. The counter therefore never goes back.
    async fn upsert_signature(&self, record: &SignatureRecord) -> Result<SignatureRecord>;

    /// The record for content `checksum` signed by `public_key` (armored).
    async fn get_signature(
        &self,
        checksum: &Checksum,
        public_key: &str,
    ) -> Result<Option<SignatureRecord>>;
}
