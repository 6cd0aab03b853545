//! Circles and their key metadata.
//!
//! A circle's symmetric secret is generated exactly once, when the circle is
//! created. Only its metadata ([`KeyRecord`]) is persisted in the clear; the
//! secret itself lives on only inside sealed trustee envelopes.

use serde::{Deserialize, Serialize};

use trustcircle_core::{Algorithm, CircleId, CryptoKey, Error, KeyId, Result, SecretKey};

/// A trust group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circle {
    pub id: CircleId,

    /// Unique circle name.
    pub name: String,

    /// Creation time (Unix ms), assigned by the store.
    pub added: i64,

    /// Last modification time (Unix ms), assigned by the store.
    pub altered: i64,
}

/// Lifecycle status of a circle key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyStatus {
    Active,
    Deprecated,
}

/// Metadata for a circle's symmetric secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: KeyId,

    /// The circle this key belongs to.
    pub circle_id: CircleId,

    pub algorithm: Algorithm,

    pub status: KeyStatus,

    /// Creation time (Unix ms), assigned by the store.
    pub added: i64,

    /// Last modification time (Unix ms), assigned by the store.
    pub altered: i64,
}

impl KeyRecord {
    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active
    }

    /// Fail unless this key may receive new grants.
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(Error::illegal_action("circle key is not active"))
        }
    }
}

/// A freshly established circle: its record, its key metadata and its
/// secret. The secret must be sealed for at least one trustee before it is
/// dropped, or the circle's data becomes unreadable.
#[derive(Debug)]
pub struct NewCircle {
    pub circle: Circle,
    pub key: KeyRecord,
    pub secret: SecretKey,
}

impl NewCircle {
    /// Establish a circle and generate its secret.
    pub fn create(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::verification("circle name must not be empty"));
        }

        let circle = Circle {
            id: CircleId::generate(),
            name,
            added: 0,
            altered: 0,
        };

        let secret = SecretKey::generate();
        let key = KeyRecord {
            id: KeyId::generate(),
            circle_id: circle.id,
            algorithm: secret.algorithm(),
            status: KeyStatus::Active,
            added: 0,
            altered: 0,
        };

        tracing::debug!(circle = %circle.name, key = %key.id, "created circle");

        Ok(Self {
            circle,
            key,
            secret,
        })
    }
}
