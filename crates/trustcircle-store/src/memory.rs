//! In-memory implementation of the Store trait.
//!
//! This is the reference implementation of the persistence contract. It
//! keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use trustcircle_core::{now_millis, Checksum, CircleId, KeyId, MemberId, TrusteeId};
use trustcircle_perms::{Circle, KeyRecord, Member, SignatureRecord, Trustee};

use crate::error::{Result, StoreError};
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock; each
/// write holds the lock across its uniqueness check and insert.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    members: HashMap<MemberId, Member>,
    circles: HashMap<CircleId, Circle>,
    keys: HashMap<KeyId, KeyRecord>,
    trustees: HashMap<TrusteeId, Trustee>,

    /// Signatures indexed by (checksum, armored signer key).
    signatures: HashMap<(Checksum, String), SignatureRecord>,

    /// Last timestamp handed out.
    clock: i64,
}

impl MemoryStoreInner {
    /// Wall-clock time, forced strictly increasing across writes.
    fn tick(&mut self) -> i64 {
        self.clock = now_millis().max(self.clock + 1);
        self.clock
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Database("store lock poisoned".into()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn oldest_first(mut trustees: Vec<Trustee>) -> Vec<Trustee> {
    trustees.sort_by_key(|t| t.added);
    trustees
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_member(&self, member: &Member) -> Result<Member> {
        let mut inner = self.write()?;

        if inner.members.contains_key(&member.id) {
            return Err(StoreError::Constraint(format!("member {} exists", member.id)));
        }
        if inner.members.values().any(|m| m.name == member.name) {
            return Err(StoreError::Constraint("member name taken".into()));
        }

        let now = inner.tick();
        let mut stored = member.clone();
        stored.added = now;
        stored.altered = now;
        inner.members.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_member(&self, member: &Member) -> Result<Member> {
        let mut inner = self.write()?;

        let added = match inner.members.get(&member.id) {
            Some(existing) => existing.added,
            None => return Err(StoreError::not_found("member", member.id)),
        };
        if inner
            .members
            .values()
            .any(|m| m.id != member.id && m.name == member.name)
        {
            return Err(StoreError::Constraint("member name taken".into()));
        }

        let now = inner.tick();
        let mut stored = member.clone();
        stored.added = added;
        stored.altered = now;
        inner.members.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn get_member(&self, id: &MemberId) -> Result<Option<Member>> {
        Ok(self.read()?.members.get(id).cloned())
    }

    async fn get_member_by_name(&self, name: &str) -> Result<Option<Member>> {
        Ok(self
            .read()?
            .members
            .values()
            .find(|m| m.name == name)
            .cloned())
    }

    async fn insert_circle(&self, circle: &Circle) -> Result<Circle> {
        let mut inner = self.write()?;

        if inner.circles.contains_key(&circle.id) {
            return Err(StoreError::Constraint(format!("circle {} exists", circle.id)));
        }
        if inner.circles.values().any(|c| c.name == circle.name) {
            return Err(StoreError::Constraint("circle name taken".into()));
        }

        let now = inner.tick();
        let mut stored = circle.clone();
        stored.added = now;
        stored.altered = now;
        inner.circles.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn create_circle(
        &self,
        circle: &Circle,
        key: &KeyRecord,
        owner: &Trustee,
    ) -> Result<(Circle, KeyRecord, Trustee)> {
        let mut inner = self.write()?;

        // Check everything before touching any map.
        if inner.circles.contains_key(&circle.id) {
            return Err(StoreError::Constraint(format!("circle {} exists", circle.id)));
        }
        if inner.circles.values().any(|c| c.name == circle.name) {
            return Err(StoreError::Constraint("circle name taken".into()));
        }
        if key.circle_id != circle.id || owner.circle_id != circle.id || owner.key_id != key.id {
            return Err(StoreError::Constraint(
                "key and owner must belong to the new circle".into(),
            ));
        }
        if inner.keys.contains_key(&key.id) {
            return Err(StoreError::Constraint(format!("key {} exists", key.id)));
        }
        if !inner.members.contains_key(&owner.member_id) {
            return Err(StoreError::not_found("member", owner.member_id));
        }
        if inner.trustees.contains_key(&owner.id) {
            return Err(StoreError::Constraint(format!("trustee {} exists", owner.id)));
        }

        let now = inner.tick();
        let mut stored_circle = circle.clone();
        stored_circle.added = now;
        stored_circle.altered = now;

        let mut stored_key = key.clone();
        stored_key.added = now;
        stored_key.altered = now;

        let mut stored_owner = owner.clone();
        stored_owner.added = now;
        stored_owner.altered = now;

        inner.circles.insert(stored_circle.id, stored_circle.clone());
        inner.keys.insert(stored_key.id, stored_key.clone());
        inner.trustees.insert(stored_owner.id, stored_owner.clone());

        Ok((stored_circle, stored_key, stored_owner))
    }

    async fn get_circle(&self, id: &CircleId) -> Result<Option<Circle>> {
        Ok(self.read()?.circles.get(id).cloned())
    }

    async fn get_circle_by_name(&self, name: &str) -> Result<Option<Circle>> {
        Ok(self
            .read()?
            .circles
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn insert_key(&self, key: &KeyRecord) -> Result<KeyRecord> {
        let mut inner = self.write()?;

        if !inner.circles.contains_key(&key.circle_id) {
            return Err(StoreError::not_found("circle", key.circle_id));
        }
        if inner.keys.contains_key(&key.id) {
            return Err(StoreError::Constraint(format!("key {} exists", key.id)));
        }
        if key.is_active()
            && inner
                .keys
                .values()
                .any(|k| k.circle_id == key.circle_id && k.is_active())
        {
            return Err(StoreError::Constraint("circle already has an active key".into()));
        }

        let now = inner.tick();
        let mut stored = key.clone();
        stored.added = now;
        stored.altered = now;
        inner.keys.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn update_key(&self, key: &KeyRecord) -> Result<KeyRecord> {
        let mut inner = self.write()?;

        let added = match inner.keys.get(&key.id) {
            Some(existing) => existing.added,
            None => return Err(StoreError::not_found("key", key.id)),
        };
        if key.is_active()
            && inner
                .keys
                .values()
                .any(|k| k.id != key.id && k.circle_id == key.circle_id && k.is_active())
        {
            return Err(StoreError::Constraint("circle already has an active key".into()));
        }

        let now = inner.tick();
        let mut stored = key.clone();
        stored.added = added;
        stored.altered = now;
        inner.keys.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn get_key(&self, id: &KeyId) -> Result<Option<KeyRecord>> {
        Ok(self.read()?.keys.get(id).cloned())
    }

    async fn get_active_key(&self, circle_id: &CircleId) -> Result<Option<KeyRecord>> {
        Ok(self
            .read()?
            .keys
            .values()
            .find(|k| &k.circle_id == circle_id && k.is_active())
            .cloned())
    }

    async fn insert_trustee(&self, trustee: &Trustee) -> Result<Trustee> {
        let mut inner = self.write()?;

        if !inner.members.contains_key(&trustee.member_id) {
            return Err(StoreError::not_found("member", trustee.member_id));
        }
        if !inner.circles.contains_key(&trustee.circle_id) {
            return Err(StoreError::not_found("circle", trustee.circle_id));
        }
        if inner.trustees.contains_key(&trustee.id)
            || inner
                .trustees
                .values()
                .any(|t| t.member_id == trustee.member_id && t.circle_id == trustee.circle_id)
        {
            return Err(StoreError::Constraint(
                "member is already a trustee of this circle".into(),
            ));
        }

        let now = inner.tick();
        let mut stored = trustee.clone();
        stored.added = now;
        stored.altered = now;
        inner.trustees.insert(stored.id, stored.clone());

        tracing::trace!(trustee = %stored.id, "inserted trustee");
        Ok(stored)
    }

    async fn update_trustee(&self, trustee: &Trustee) -> Result<Trustee> {
        let mut inner = self.write()?;

        let added = match inner.trustees.get(&trustee.id) {
            Some(existing)
                if existing.member_id == trustee.member_id
                    && existing.circle_id == trustee.circle_id =>
            {
                existing.added
            }
            Some(_) => {
                return Err(StoreError::Constraint(
                    "trustee member and circle are immutable".into(),
                ))
            }
            None => return Err(StoreError::not_found("trustee", trustee.id)),
        };

        let now = inner.tick();
        let mut stored = trustee.clone();
        stored.added = added;
        stored.altered = now;
        inner.trustees.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn delete_trustee(&self, id: &TrusteeId) -> Result<()> {
        let mut inner = self.write()?;
        match inner.trustees.remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found("trustee", id)),
        }
    }

    async fn get_trustee(
        &self,
        member_id: &MemberId,
        circle_id: &CircleId,
    ) -> Result<Option<Trustee>> {
        Ok(self
            .read()?
            .trustees
            .values()
            .find(|t| &t.member_id == member_id && &t.circle_id == circle_id)
            .cloned())
    }

    async fn list_trustees_for_circle(&self, circle_id: &CircleId) -> Result<Vec<Trustee>> {
        let inner = self.read()?;
        Ok(oldest_first(
            inner
                .trustees
                .values()
                .filter(|t| &t.circle_id == circle_id)
                .cloned()
                .collect(),
        ))
    }

    async fn list_trustees_for_member(&self, member_id: &MemberId) -> Result<Vec<Trustee>> {
        let inner = self.read()?;
        Ok(oldest_first(
            inner
                .trustees
                .values()
                .filter(|t| &t.member_id == member_id)
                .cloned()
                .collect(),
        ))
    }

    async fn upsert_signature(&self, record: &SignatureRecord) -> Result<SignatureRecord> {
        let mut inner = self.write()?;
        let key = (record.checksum, record.public_key.clone());

        let added = match inner.signatures.get(&key) {
            Some(existing) if record.verifications == existing.verifications + 1 => {
                existing.added
            }
            Some(existing) if record.verifications == 0 => {
                return Err(StoreError::Constraint(format!(
                    "content {} already signed by this key",
                    existing.checksum
                )))
            }
            Some(_) => {
                return Err(StoreError::Constraint("signature record is stale".into()))
            }
            None => record.added,
        };

        let now = inner.tick();
        let mut stored = record.clone();
        stored.added = added;
        stored.altered = now;
        inner.signatures.insert(key, stored.clone());

        Ok(stored)
    }

    async fn get_signature(
        &self,
        checksum: &Checksum,
        public_key: &str,
    ) -> Result<Option<SignatureRecord>> {
        Ok(self
            .read()?
            .signatures
            .get(&(*checksum, public_key.to_string()))
            .cloned())
    }
}
