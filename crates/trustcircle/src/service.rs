//! TrustCircle: unified API over the engines and a store.
//!
//! Every operation loads the records it needs, authorizes the acting member
//! with [`TrustLevel::is_allowed`] before any key is unlocked, runs the
//! cryptographic transformation, and persists the result.

use std::sync::Arc;

use zeroize::Zeroizing;

use trustcircle_core::{
    now_millis, Checksum, CircleId, CryptoProvider, EncryptedData, Error, MemberId, Result,
    ReturnCode, SecretKey, Settings, TrustLevel,
};
use trustcircle_perms::{
    self as perms, Circle, KeyRecord, Member, NewCircle, SignatureRecord, Trustee,
    VerificationOutcome,
};
use trustcircle_store::Store;

/// Configuration for a [`TrustCircle`].
#[derive(Debug, Clone)]
pub struct TrustCircleConfig {
    /// Algorithm settings.
    pub settings: Settings,
    /// Run passphrase-based key derivation on the blocking thread pool.
    pub blocking_unlock: bool,
}

impl Default for TrustCircleConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            blocking_unlock: true,
        }
    }
}

impl TrustCircleConfig {
    /// Cheap KDF parameters. Never use outside tests.
    pub fn insecure_fast() -> Self {
        Self {
            settings: Settings::insecure_fast(),
            blocking_unlock: true,
        }
    }

    /// Load settings from JSON, keeping the other defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            settings: Settings::from_json(json)?,
            ..Self::default()
        })
    }
}

/// The main TrustCircle struct.
///
/// Provides a unified API for:
/// - Registering members and changing passphrases
/// - Creating circles and managing trustees
/// - Encrypting and decrypting circle data
/// - Signing and verifying documents
pub struct TrustCircle<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// Validated crypto settings and KDF.
    provider: Arc<CryptoProvider>,
    /// Configuration.
    config: TrustCircleConfig,
}

impl<S: Store> TrustCircle<S> {
    /// Create an instance, running the crypto provider self-test.
    ///
    /// A failed self-test is the one fatal condition; callers should stop.
    pub fn new(store: S, config: TrustCircleConfig) -> Result<Self> {
        let provider = CryptoProvider::initialize(config.settings.clone())?;
        Ok(Self {
            store: Arc::new(store),
            provider: Arc::new(provider),
            config,
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &CryptoProvider {
        &self.provider
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Members
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new member.
    pub async fn register_member(&self, name: &str, passphrase: &str) -> Result<Member> {
        if self.store.get_member_by_name(name).await?.is_some() {
            return Err(Error::illegal_action("member name taken"));
        }

        let name = name.to_owned();
        let passphrase = Zeroizing::new(passphrase.to_owned());
        let member = self
            .with_provider(move |provider| {
                Member::register(name, &passphrase, provider.settings(), provider.kdf())
            })
            .await?;
        let member = self.store.insert_member(&member).await?;

        tracing::info!(member = %member.id, "member registered");
        Ok(member)
    }

    /// Re-protect a member's private key under a new passphrase.
    pub async fn change_passphrase(
        &self,
        member_id: &MemberId,
        old: &str,
        new: &str,
    ) -> Result<Member> {
        let mut member = self.member(member_id).await?;
        let old = Zeroizing::new(old.to_owned());
        let new = Zeroizing::new(new.to_owned());
        let member = self
            .with_provider(move |provider| {
                member.change_passphrase(&old, &new, provider.settings(), provider.kdf())?;
                Ok(member)
            })
            .await?;
        let member = self.store.update_member(&member).await?;

        tracing::info!(member = %member.id, "passphrase changed");
        Ok(member)
    }

    /// Load a member, decoding its stored salts with the configured charset.
    pub async fn member(&self, id: &MemberId) -> Result<Member> {
        let mut member = self
            .store
            .get_member(id)
            .await?
            .ok_or_else(|| Error::identification("member not found"))?;

        member.salt = self.provider.salt_from_text(member.salt.armored());
        member.private_key.salt = self
            .provider
            .salt_from_text(member.private_key.salt.armored());
        Ok(member)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Circles
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a circle. The creator becomes its first trustee at `Sysop`.
    pub async fn create_circle(&self, creator: &MemberId, name: &str) -> Result<(Circle, Trustee)> {
        let member = self.member(creator).await?;
        if self.store.get_circle_by_name(name).await?.is_some() {
            return Err(Error::illegal_action("circle name taken"));
        }

        let created = NewCircle::create(name)?;
        let trustee = perms::add_trustee(
            &created.secret,
            &created.key,
            &member,
            TrustLevel::Sysop,
            &[],
        )?;

        let (circle, _, trustee) = self
            .store
            .create_circle(&created.circle, &created.key, &trustee)
            .await?;

        tracing::info!(circle = %circle.id, creator = %member.id, "circle created");
        Ok((circle, trustee))
    }

    pub async fn circle(&self, id: &CircleId) -> Result<Circle> {
        self.store
            .get_circle(id)
            .await?
            .ok_or_else(|| Error::identification("circle not found"))
    }

    /// The circles a member is a trustee of.
    pub async fn list_circles(&self, member_id: &MemberId) -> Result<Vec<Circle>> {
        let mut circles = Vec::new();
        for trustee in self.store.list_trustees_for_member(member_id).await? {
            circles.push(self.circle(&trustee.circle_id).await?);
        }
        Ok(circles)
    }

    /// The trustees of a circle, oldest first.
    pub async fn list_trustees(&self, circle_id: &CircleId) -> Result<Vec<Trustee>> {
        Ok(self.store.list_trustees_for_circle(circle_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Trustees
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `member_id` access to a circle at `level`.
    ///
    /// The actor needs `Admin` and may not grant above their own level. The
    /// actor's passphrase is needed to recover the circle secret for sealing.
    pub async fn add_trustee(
        &self,
        actor: &MemberId,
        passphrase: &str,
        circle_id: &CircleId,
        member_id: &MemberId,
        level: TrustLevel,
    ) -> Result<Trustee> {
        let granter = self.authorize(actor, circle_id, TrustLevel::Admin).await?;
        if !TrustLevel::is_allowed(granter.trust_level, level) {
            return Err(Error::authorization("cannot grant above own trust level"));
        }

        let member = self.member(member_id).await?;
        let key = self.circle_key(&granter).await?;
        let existing = self.store.list_trustees_for_circle(circle_id).await?;
        let secret = self.unlock(&granter, passphrase).await?;

        let trustee = perms::add_trustee(&secret, &key, &member, level, &existing)?;
        drop(secret);
        let trustee = self.store.insert_trustee(&trustee).await?;

        tracing::info!(
            circle = %circle_id,
            member = %member_id,
            level = %level,
            "trustee added"
        );
        Ok(trustee)
    }

    /// Revoke a member's grant.
    ///
    /// The circle secret is not rotated. Removing the last `Sysop` is
    /// rejected with `IllegalAction`.
    pub async fn remove_trustee(
        &self,
        actor: &MemberId,
        circle_id: &CircleId,
        member_id: &MemberId,
    ) -> Result<()> {
        let revoker = self.authorize(actor, circle_id, TrustLevel::Admin).await?;
        let mut trustees = self.store.list_trustees_for_circle(circle_id).await?;

        let removed = perms::remove_trustee(&mut trustees, member_id)?;
        if !TrustLevel::is_allowed(revoker.trust_level, removed.trust_level) {
            return Err(Error::authorization("cannot revoke a higher trust level"));
        }
        ensure_sysop_remains(&trustees)?;

        self.store.delete_trustee(&removed.id).await?;

        tracing::info!(circle = %circle_id, member = %member_id, "trustee removed");
        Ok(())
    }

    /// Change a trustee's level. The sealed circle key is untouched.
    pub async fn update_trust_level(
        &self,
        actor: &MemberId,
        circle_id: &CircleId,
        member_id: &MemberId,
        level: TrustLevel,
    ) -> Result<Trustee> {
        let updater = self.authorize(actor, circle_id, TrustLevel::Admin).await?;
        let mut trustees = self.store.list_trustees_for_circle(circle_id).await?;

        let target = trustees
            .iter_mut()
            .find(|t| &t.member_id == member_id)
            .ok_or_else(|| Error::identification("member is not a trustee of this circle"))?;

        if !TrustLevel::is_allowed(updater.trust_level, target.trust_level)
            || !TrustLevel::is_allowed(updater.trust_level, level)
        {
            return Err(Error::authorization("cannot change a level above own"));
        }

        perms::update_trust_level(target, level);
        let updated = target.clone();
        ensure_sysop_remains(&trustees)?;

        let updated = self.store.update_trustee(&updated).await?;

        tracing::info!(circle = %circle_id, member = %member_id, level = %level, "trust level updated");
        Ok(updated)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Data
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt `plaintext` for a circle. Requires `Write`.
    pub async fn encrypt(
        &self,
        actor: &MemberId,
        passphrase: &str,
        circle_id: &CircleId,
        plaintext: &[u8],
    ) -> Result<EncryptedData> {
        let trustee = self.authorize(actor, circle_id, TrustLevel::Write).await?;
        let secret = self.unlock(&trustee, passphrase).await?;
        EncryptedData::encrypt(plaintext, &secret)
    }

    /// Decrypt circle data. Requires `Read`.
    pub async fn decrypt(
        &self,
        actor: &MemberId,
        passphrase: &str,
        circle_id: &CircleId,
        data: &EncryptedData,
    ) -> Result<Vec<u8>> {
        let trustee = self.authorize(actor, circle_id, TrustLevel::Read).await?;
        let secret = self.unlock(&trustee, passphrase).await?;

        let mut data = data.clone();
        data.salt = self.provider.salt_from_text(data.salt.armored());
        data.decrypt(&secret)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signatures
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign `content` as `actor` and persist the record.
    ///
    /// The record's checksum identifies it for [`verify`](Self::verify).
    /// Content the actor already signed fails with `IllegalAction`; the
    /// existing record and its count are kept.
    pub async fn sign(
        &self,
        actor: &MemberId,
        passphrase: &str,
        content: &[u8],
        expires: Option<i64>,
    ) -> Result<SignatureRecord> {
        let member = self.member(actor).await?;
        if self
            .store
            .get_signature(&Checksum::of(content), &member.public_key)
            .await?
            .is_some()
        {
            return Err(Error::illegal_action("content already signed by this member"));
        }

        let passphrase = Zeroizing::new(passphrase.to_owned());
        let content = content.to_vec();
        let record = self
            .with_provider(move |provider| {
                let private = member.unlock(&passphrase, provider.kdf())?;
                Ok(perms::sign(&private, &content, expires, now_millis()))
            })
            .await?;

        let record = self.store.upsert_signature(&record).await?;

        tracing::info!(member = %actor, checksum = %record.checksum, "content signed");
        Ok(record)
    }

    /// Verify `content` against the record `signer` made for `signed`,
    /// persisting the updated count on success.
    ///
    /// Content that differs from what was signed is an unverified outcome
    /// with the count unchanged. A record that does not exist fails with
    /// `IdentificationWarning`.
    pub async fn verify(
        &self,
        signer: &MemberId,
        signed: &Checksum,
        content: &[u8],
    ) -> Result<VerificationOutcome> {
        let member = self.member(signer).await?;
        let public = member.public_key()?;

        let record = self
            .store
            .get_signature(signed, &member.public_key)
            .await?
            .ok_or_else(|| Error::identification("no signature record"))?;

        let mut outcome = perms::verify(&public, content, &record, now_millis());
        if outcome.verified() {
            outcome.record = self.store.upsert_signature(&outcome.record).await?;
        }

        tracing::info!(
            member = %signer,
            checksum = %signed,
            verified = outcome.verified(),
            failure = ?outcome.failure,
            "signature verification"
        );
        Ok(outcome)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal
    // ─────────────────────────────────────────────────────────────────────────

    /// Load `member_id`'s grant in `circle_id` and check it against `required`.
    async fn authorize(
        &self,
        member_id: &MemberId,
        circle_id: &CircleId,
        required: TrustLevel,
    ) -> Result<Trustee> {
        let trustee = self
            .store
            .get_trustee(member_id, circle_id)
            .await?
            .ok_or_else(|| Error::authorization("not a trustee of this circle"))?;

        if !TrustLevel::is_allowed(trustee.trust_level, required) {
            tracing::warn!(
                member = %member_id,
                circle = %circle_id,
                actual = %trustee.trust_level,
                required = %required,
                "authorization denied"
            );
            return Err(Error::authorization("trust level too low"));
        }

        Ok(trustee)
    }

    /// The active key the trustee's sealed secret belongs to.
    async fn circle_key(&self, trustee: &Trustee) -> Result<KeyRecord> {
        let key = self
            .store
            .get_key(&trustee.key_id)
            .await?
            .ok_or_else(|| Error::corrupted("trustee references a missing key"))?;
        key.ensure_active()?;
        Ok(key)
    }

    /// Recover the circle secret through `trustee`.
    async fn unlock(&self, trustee: &Trustee, passphrase: &str) -> Result<SecretKey> {
        let member = self.member(&trustee.member_id).await?;
        let trustee = trustee.clone();
        let passphrase = Zeroizing::new(passphrase.to_owned());

        self.with_provider(move |provider| {
            perms::unlock_circle_key(&member, &passphrase, &trustee, provider.kdf())
        })
        .await
    }

    /// Run passphrase work, on the blocking pool when configured.
    async fn with_provider<T, F>(&self, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CryptoProvider) -> Result<T> + Send + 'static,
    {
        if !self.config.blocking_unlock {
            return work(&self.provider);
        }

        let provider = Arc::clone(&self.provider);
        tokio::task::spawn_blocking(move || work(&provider))
            .await
            .map_err(|e| Error::new(ReturnCode::Error, "passphrase task failed").with_source(e))?
    }
}

/// Fail unless at least one `Sysop` remains.
fn ensure_sysop_remains(trustees: &[Trustee]) -> Result<()> {
    if trustees.iter().any(|t| t.trust_level == TrustLevel::Sysop) {
        Ok(())
    } else {
        Err(Error::illegal_action("circle must keep a sysop"))
    }
}
