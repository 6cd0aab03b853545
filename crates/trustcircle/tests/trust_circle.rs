//! Facade behaviour: authorization, envelope distribution, data and
//! signatures through a store.

use trustcircle::core::{
    cipher, now_millis, Charset, CipherFormat, CryptoKey, KeyPair, Salt, DAY_MILLIS,
};
use trustcircle::store::{MemoryStore, Store};
use trustcircle::{
    EncryptedData, Member, MemberId, ReturnCode, TrustCircle, TrustCircleConfig, TrustLevel,
    VerificationFailure,
};

const ALICE_PASS: &str = "correct horse";
const BOB_PASS: &str = "battery staple";
const CAROL_PASS: &str = "purple monkey";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn service() -> TrustCircle<MemoryStore> {
    init_tracing();
    TrustCircle::new(MemoryStore::new(), TrustCircleConfig::insecure_fast()).unwrap()
}

struct Board {
    tc: TrustCircle<MemoryStore>,
    alice: Member,
    bob: Member,
    carol: Member,
    circle: trustcircle::CircleId,
}

/// alice: Sysop (creator), bob: Read, carol: not a trustee.
async fn board() -> anyhow::Result<Board> {
    let tc = service();
    let alice = tc.register_member("alice", ALICE_PASS).await?;
    let bob = tc.register_member("bob", BOB_PASS).await?;
    let carol = tc.register_member("carol", CAROL_PASS).await?;

    let (circle, _) = tc.create_circle(&alice.id, "board").await?;
    tc.add_trustee(&alice.id, ALICE_PASS, &circle.id, &bob.id, TrustLevel::Read)
        .await?;

    Ok(Board {
        tc,
        alice,
        bob,
        carol,
        circle: circle.id,
    })
}

#[tokio::test]
async fn creator_is_sysop() -> anyhow::Result<()> {
    let tc = service();
    let alice = tc.register_member("alice", ALICE_PASS).await?;

    let (circle, trustee) = tc.create_circle(&alice.id, "board").await?;

    assert_eq!(trustee.trust_level, TrustLevel::Sysop);
    assert_eq!(trustee.member_id, alice.id);
    assert!(circle.added > 0);
    assert_eq!(tc.list_circles(&alice.id).await?, vec![circle.clone()]);
    assert_eq!(tc.list_trustees(&circle.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn trustees_share_data() -> anyhow::Result<()> {
    let b = board().await?;

    let sealed = b
        .tc
        .encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"minutes of the meeting")
        .await?;
    let plain = b.tc.decrypt(&b.bob.id, BOB_PASS, &b.circle, &sealed).await?;

    assert_eq!(plain, b"minutes of the meeting");
    Ok(())
}

#[tokio::test]
async fn each_encryption_uses_a_fresh_salt() -> anyhow::Result<()> {
    let b = board().await?;

    let one = b.tc.encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"same").await?;
    let two = b.tc.encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"same").await?;

    assert_ne!(one.salt, two.salt);
    assert_ne!(one.ciphertext, two.ciphertext);
    Ok(())
}

#[tokio::test]
async fn reader_cannot_write() -> anyhow::Result<()> {
    let b = board().await?;

    let err = b
        .tc
        .encrypt(&b.bob.id, BOB_PASS, &b.circle, b"graffiti")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthorizationWarning);
    Ok(())
}

#[tokio::test]
async fn outsider_cannot_read() -> anyhow::Result<()> {
    let b = board().await?;
    let sealed = b.tc.encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"secret").await?;

    let err = b
        .tc
        .decrypt(&b.carol.id, CAROL_PASS, &b.circle, &sealed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthorizationWarning);
    Ok(())
}

#[tokio::test]
async fn wrong_passphrase_is_authentication_warning() -> anyhow::Result<()> {
    let b = board().await?;

    let err = b
        .tc
        .encrypt(&b.alice.id, "not my passphrase", &b.circle, b"x")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthenticationWarning);
    assert!(!err.message().contains("not my passphrase"));
    Ok(())
}

#[tokio::test]
async fn tampered_data_is_integrity_warning() -> anyhow::Result<()> {
    let b = board().await?;
    let mut sealed = b.tc.encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"ledger").await?;
    sealed.ciphertext[0] ^= 0x01;

    let err = b
        .tc
        .decrypt(&b.bob.id, BOB_PASS, &b.circle, &sealed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IntegrityWarning);
    Ok(())
}

#[tokio::test]
async fn only_admins_grant() -> anyhow::Result<()> {
    let b = board().await?;

    let err = b
        .tc
        .add_trustee(&b.bob.id, BOB_PASS, &b.circle, &b.carol.id, TrustLevel::Read)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthorizationWarning);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_grant_above_own_level() -> anyhow::Result<()> {
    let b = board().await?;
    b.tc
        .update_trust_level(&b.alice.id, &b.circle, &b.bob.id, TrustLevel::Admin)
        .await?;

    let err = b
        .tc
        .add_trustee(&b.bob.id, BOB_PASS, &b.circle, &b.carol.id, TrustLevel::Sysop)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthorizationWarning);

    let carol = b
        .tc
        .add_trustee(&b.bob.id, BOB_PASS, &b.circle, &b.carol.id, TrustLevel::Write)
        .await?;
    assert_eq!(carol.trust_level, TrustLevel::Write);
    Ok(())
}

#[tokio::test]
async fn duplicate_grant_is_illegal() -> anyhow::Result<()> {
    let b = board().await?;

    let err = b
        .tc
        .add_trustee(&b.alice.id, ALICE_PASS, &b.circle, &b.bob.id, TrustLevel::Write)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IllegalAction);
    Ok(())
}

#[tokio::test]
async fn revoked_member_loses_access() -> anyhow::Result<()> {
    let b = board().await?;
    let sealed = b.tc.encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"before").await?;

    b.tc.remove_trustee(&b.alice.id, &b.circle, &b.bob.id).await?;

    let err = b
        .tc
        .decrypt(&b.bob.id, BOB_PASS, &b.circle, &sealed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthorizationWarning);

    let err = b
        .tc
        .remove_trustee(&b.alice.id, &b.circle, &b.bob.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IdentificationWarning);
    Ok(())
}

#[tokio::test]
async fn last_sysop_stays() -> anyhow::Result<()> {
    let b = board().await?;

    let err = b
        .tc
        .remove_trustee(&b.alice.id, &b.circle, &b.alice.id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IllegalAction);

    let err = b
        .tc
        .update_trust_level(&b.alice.id, &b.circle, &b.alice.id, TrustLevel::Admin)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IllegalAction);

    // With a second sysop the first may step down.
    b.tc
        .update_trust_level(&b.alice.id, &b.circle, &b.bob.id, TrustLevel::Sysop)
        .await?;
    b.tc.remove_trustee(&b.alice.id, &b.circle, &b.alice.id).await?;
    assert_eq!(b.tc.list_trustees(&b.circle).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn level_update_keeps_envelope() -> anyhow::Result<()> {
    let b = board().await?;

    let updated = b
        .tc
        .update_trust_level(&b.alice.id, &b.circle, &b.bob.id, TrustLevel::Write)
        .await?;
    assert_eq!(updated.trust_level, TrustLevel::Write);
    assert!(updated.altered > updated.added);

    let sealed = b.tc.encrypt(&b.bob.id, BOB_PASS, &b.circle, b"now allowed").await?;
    let plain = b.tc.decrypt(&b.alice.id, ALICE_PASS, &b.circle, &sealed).await?;
    assert_eq!(plain, b"now allowed");
    Ok(())
}

#[tokio::test]
async fn passphrase_change_keeps_grants() -> anyhow::Result<()> {
    let b = board().await?;
    let sealed = b.tc.encrypt(&b.alice.id, ALICE_PASS, &b.circle, b"kept").await?;

    b.tc.change_passphrase(&b.bob.id, BOB_PASS, "new passphrase").await?;

    let plain = b
        .tc
        .decrypt(&b.bob.id, "new passphrase", &b.circle, &sealed)
        .await?;
    assert_eq!(plain, b"kept");

    let err = b
        .tc
        .decrypt(&b.bob.id, BOB_PASS, &b.circle, &sealed)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::AuthenticationWarning);
    Ok(())
}

#[tokio::test]
async fn duplicate_names_are_illegal() -> anyhow::Result<()> {
    let b = board().await?;

    let err = b.tc.register_member("alice", "another pass").await.unwrap_err();
    assert_eq!(err.code(), ReturnCode::IllegalAction);

    let err = b.tc.create_circle(&b.bob.id, "board").await.unwrap_err();
    assert_eq!(err.code(), ReturnCode::IllegalAction);
    Ok(())
}

#[tokio::test]
async fn sign_and_verify_counts() -> anyhow::Result<()> {
    let b = board().await?;
    let signed = b.tc.sign(&b.alice.id, ALICE_PASS, b"hello world", None).await?;

    let first = b.tc.verify(&b.alice.id, &signed.checksum, b"hello world").await?;
    assert!(first.verified());
    assert_eq!(first.record.verifications, 1);

    let second = b.tc.verify(&b.alice.id, &signed.checksum, b"hello world").await?;
    assert_eq!(second.record.verifications, 2);
    assert!(second.record.last_verification > first.record.last_verification);
    Ok(())
}

#[tokio::test]
async fn expired_signature_is_not_counted() -> anyhow::Result<()> {
    let b = board().await?;
    let expires = now_millis() - DAY_MILLIS;
    let signed = b
        .tc
        .sign(&b.alice.id, ALICE_PASS, b"hello world", Some(expires))
        .await?;

    let outcome = b.tc.verify(&b.alice.id, &signed.checksum, b"hello world").await?;
    assert_eq!(outcome.failure, Some(VerificationFailure::Expired));
    assert_eq!(outcome.record.verifications, 0);
    Ok(())
}

#[tokio::test]
async fn tampered_content_is_not_verified() -> anyhow::Result<()> {
    let b = board().await?;
    let signed = b.tc.sign(&b.alice.id, ALICE_PASS, b"hello world", None).await?;

    let outcome = b.tc.verify(&b.alice.id, &signed.checksum, b"hello worle").await?;
    assert!(!outcome.verified());
    assert_eq!(outcome.failure, Some(VerificationFailure::InvalidSignature));
    assert_eq!(outcome.record.verifications, 0);

    let stored = b
        .tc
        .store()
        .get_signature(&signed.checksum, &signed.public_key)
        .await?
        .unwrap();
    assert_eq!(stored.verifications, 0);
    assert_eq!(stored.last_verification, None);

    let outcome = b.tc.verify(&b.alice.id, &signed.checksum, b"hello world").await?;
    assert_eq!(outcome.record.verifications, 1);
    Ok(())
}

#[tokio::test]
async fn signature_of_another_member_is_unidentified() -> anyhow::Result<()> {
    let b = board().await?;
    let signed = b.tc.sign(&b.alice.id, ALICE_PASS, b"hello world", None).await?;

    let err = b
        .tc
        .verify(&b.bob.id, &signed.checksum, b"hello world")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IdentificationWarning);
    Ok(())
}

#[tokio::test]
async fn signing_again_keeps_the_count() -> anyhow::Result<()> {
    let b = board().await?;
    let signed = b.tc.sign(&b.alice.id, ALICE_PASS, b"doc", None).await?;
    b.tc.verify(&b.alice.id, &signed.checksum, b"doc").await?;
    let second = b.tc.verify(&b.alice.id, &signed.checksum, b"doc").await?;
    assert_eq!(second.record.verifications, 2);

    let err = b
        .tc
        .sign(&b.alice.id, ALICE_PASS, b"doc", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ReturnCode::IllegalAction);

    let stored = b
        .tc
        .store()
        .get_signature(&signed.checksum, &signed.public_key)
        .await?
        .unwrap();
    assert_eq!(stored.verifications, 2);
    assert_eq!(stored.last_verification, second.record.last_verification);

    // Another member may still sign the same content.
    let bobs = b.tc.sign(&b.bob.id, BOB_PASS, b"doc", None).await?;
    assert_eq!(bobs.checksum, signed.checksum);
    assert_eq!(bobs.verifications, 0);
    Ok(())
}

#[tokio::test]
async fn legacy_salts_use_the_configured_charset() -> anyhow::Result<()> {
    init_tracing();
    let mut config = TrustCircleConfig::insecure_fast();
    config.settings.salt_charset = Charset::Latin1;
    let tc = TrustCircle::new(MemoryStore::new(), config)?;

    // A member written before salts were armored.
    let keypair = KeyPair::generate();
    let salt = Salt::from_text_with("sél-legacy", Charset::Latin1);
    let iv = Salt::from_text_with("iv-légacy", Charset::Latin1);
    let password_key = tc.provider().kdf().derive(ALICE_PASS, &salt)?;
    let ciphertext = cipher::encrypt(&password_key, &iv, keypair.private_key().encoded())?;
    let legacy = Member {
        id: MemberId::generate(),
        name: "alice".into(),
        salt,
        private_key: EncryptedData {
            format: CipherFormat::XChaCha20Poly1305,
            salt: iv,
            ciphertext,
        },
        public_key: keypair.public_key().to_armored(),
        added: 0,
        altered: 0,
    };

    let loaded: Member = serde_json::from_str(&serde_json::to_string(&legacy)?)?;
    assert_ne!(loaded.salt.raw_bytes(), legacy.salt.raw_bytes());
    tc.store().insert_member(&loaded).await?;

    let member = tc.member(&loaded.id).await?;
    assert_eq!(member.salt.raw_bytes(), legacy.salt.raw_bytes());

    let signed = tc.sign(&loaded.id, ALICE_PASS, b"legacy", None).await?;
    assert_eq!(signed.public_key, legacy.public_key);

    // Circle data stored under a legacy salt.
    let (circle, owner) = tc.create_circle(&loaded.id, "board").await?;
    let secret =
        trustcircle::perms::unlock_circle_key(&legacy, ALICE_PASS, &owner, tc.provider().kdf())?;
    let data_salt = Salt::from_text_with("données", Charset::Latin1);
    let sealed = EncryptedData {
        format: CipherFormat::XChaCha20Poly1305,
        ciphertext: cipher::encrypt(&secret, &data_salt, b"old minutes")?,
        salt: data_salt,
    };
    let stored: EncryptedData = serde_json::from_str(&serde_json::to_string(&sealed)?)?;

    let plain = tc.decrypt(&loaded.id, ALICE_PASS, &circle.id, &stored).await?;
    assert_eq!(plain, b"old minutes");
    Ok(())
}

#[tokio::test]
async fn inline_unlock_path() -> anyhow::Result<()> {
    init_tracing();
    let config = TrustCircleConfig {
        blocking_unlock: false,
        ..TrustCircleConfig::insecure_fast()
    };
    let tc = TrustCircle::new(MemoryStore::new(), config)?;
    let alice = tc.register_member("alice", ALICE_PASS).await?;
    let (circle, _) = tc.create_circle(&alice.id, "board").await?;

    let sealed = tc.encrypt(&alice.id, ALICE_PASS, &circle.id, b"inline").await?;
    assert_eq!(tc.decrypt(&alice.id, ALICE_PASS, &circle.id, &sealed).await?, b"inline");
    Ok(())
}

#[test]
fn invalid_settings_json_is_setting_error() {
    let json = r#"{"kdf": {"memory_kib": 0, "iterations": 0, "parallelism": 0}}"#;
    let err = TrustCircleConfig::from_json(json).unwrap_err();
    assert_eq!(err.code(), ReturnCode::SettingError);

    let err = TrustCircleConfig::from_json("not json").unwrap_err();
    assert_eq!(err.code(), ReturnCode::SettingError);
}
