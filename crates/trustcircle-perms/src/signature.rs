//! Signed documents with expiry and usage accounting.
//!
//! Verification is an explicit state transition. [`verify`] never mutates
//! its input; it returns the record as it should be persisted next. The
//! order of checks is fixed:
//!
//! 1. An expired record is rejected before any cryptography runs.
//! 2. The signature is checked against a fresh checksum of the content.
//! 3. Only a full success bumps `verifications` and `last_verification`.

use serde::{Deserialize, Serialize};

use trustcircle_core::{Checksum, PrivateKey, PublicKey, Result, Signature};

const SIGNATURE_DOMAIN: &[u8] = b"trustcircle/signature/v1";

/// A persisted signature over some content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// BLAKE3 checksum of the signed content.
    pub checksum: Checksum,

    /// Base64-armored public key of the signer.
    pub public_key: String,

    pub signature: Signature,

    /// Expiry time (Unix ms). `None` never expires.
    pub expires: Option<i64>,

    /// Number of successful verifications.
    pub verifications: u64,

    /// Time of the last successful verification (Unix ms).
    pub last_verification: Option<i64>,

    /// Creation time (Unix ms).
    pub added: i64,

    /// Last modification time (Unix ms), assigned by the store.
    pub altered: i64,
}

impl SignatureRecord {
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires, Some(expires) if expires < now)
    }

    pub fn signer(&self) -> Result<PublicKey> {
        PublicKey::from_armored(&self.public_key)
    }
}

/// Why a verification did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    Expired,
    InvalidSignature,
}

/// Result of [`verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    /// The record to persist. Unchanged unless verification succeeded.
    pub record: SignatureRecord,

    pub failure: Option<VerificationFailure>,
}

impl VerificationOutcome {
    pub fn verified(&self) -> bool {
        self.failure.is_none()
    }
}

fn signed_message(checksum: &Checksum) -> Vec<u8> {
    let mut message = Vec::with_capacity(SIGNATURE_DOMAIN.len() + 32);
    message.extend_from_slice(SIGNATURE_DOMAIN);
    message.extend_from_slice(checksum.as_bytes());
    message
}

/// Sign `content` at time `now`.
pub fn sign(
    private: &PrivateKey,
    content: &[u8],
    expires: Option<i64>,
    now: i64,
) -> SignatureRecord {
    let checksum = Checksum::of(content);
    let signature = private.sign(&signed_message(&checksum));

    SignatureRecord {
        checksum,
        public_key: private.public_key().to_armored(),
        signature,
        expires,
        verifications: 0,
        last_verification: None,
        added: now,
        altered: now,
    }
}

/// Verify `content` against `record` as signed by `public` at time `now`.
pub fn verify(
    public: &PublicKey,
    content: &[u8],
    record: &SignatureRecord,
    now: i64,
) -> VerificationOutcome {
    if record.is_expired(now) {
        tracing::debug!(checksum = %record.checksum, "signature expired");
        return VerificationOutcome {
            record: record.clone(),
            failure: Some(VerificationFailure::Expired),
        };
    }

    let checksum = Checksum::of(content);
    if public
        .verify(&signed_message(&checksum), &record.signature)
        .is_err()
    {
        tracing::debug!(checksum = %record.checksum, "signature mismatch");
        return VerificationOutcome {
            record: record.clone(),
            failure: Some(VerificationFailure::InvalidSignature),
        };
    }

    // Strictly increasing even when two verifications land in the same ms.
    let verified_at = match record.last_verification {
        Some(previous) => now.max(previous.saturating_add(1)),
        None => now,
    };

    let mut next = record.clone();
    next.verifications += 1;
    next.last_verification = Some(verified_at);

    VerificationOutcome {
        record: next,
        failure: None,
    }
}
